//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use metabreed_sim::prelude::*;
//!
//! let mut patch = Patch::new("p0", 20);
//! patch.add_adult(Individual::new("f0", Sex::Female, 0.0));
//! assert_eq!(patch.size(Sex::Female, AgeClass::Adult), 1);
//! ```

pub use crate::base::{AgeClass, FitnessValue, Sex};
pub use crate::errors::{BreedingError, BuilderError, ConfigError, FitnessError};
pub use crate::evolution::{
    FitnessModel, FitnessOracle, FitnessSortMode, MatingSystem, OffspringCountModel,
};
pub use crate::genome::{Individual, Inheritance, MidParent};
pub use crate::simulation::{
    BreedModel, Breeder, BreederBuilder, BreedingConfig, BreedingStats, LifeCycleEvent,
    Metapopulation, Patch, SelectionTarget,
};
