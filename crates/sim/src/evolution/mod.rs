//! Breeding strategies.
//!
//! Each concern of the breeding stage is an interchangeable strategy bound
//! once from the configuration:
//! - **Fecundity**: how many offspring a patch produces
//! - **Sex ratio**: how offspring sexes are assigned
//! - **Mating**: how mothers and fathers are chosen, including monogamous pairing
//! - **Selection**: fitness queries and fitness-weighted sampling and culling

pub mod fecundity;
pub mod mating;
pub mod pairing;
pub mod selection;
pub mod sex_ratio;
pub mod weighting;

pub use fecundity::{beverton_holt, FecundityModel, OffspringCountModel};
pub use mating::{MatingContext, MatingSystem, MatingTopology, ParentChoice};
pub use pairing::{MatingPair, PairingCache};
pub use selection::{FitnessModel, FitnessOracle, NeutralFitness, StabilizingFitness};
pub use sex_ratio::{male_proportion, SexAssignment};
pub use weighting::{hard_survivors, metapop_target, soft_survivors, FitnessSortMode, FitnessTable};
