//! Breeding engine and metapopulation management.
//!
//! Re-exports
//!
//! The most commonly used types are re-exported here so consumers can import
//! them from `metabreed_sim::simulation`.
//!
//! - `Breeder`: the breeding stage that fills the offspring buckets of every
//!   patch.
//! - `Metapopulation` / `Patch`: in-memory containers for individuals.
//! - `BreederBuilder`: fluent builder for constructing `Breeder` instances
//!   with validation.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod population;

pub use builder::BreederBuilder;
pub use configs::{BreedModel, BreedingConfig, SelectionTarget, Strategies};
pub use engine::{Breeder, LifeCycleEvent};
pub use population::{BreedingStats, Metapopulation, Patch};
