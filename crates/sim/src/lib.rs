//! # Simulation Crate
//!
//! The `sim` crate provides the reproduction stage of an individual-based
//! metapopulation simulation. It includes modules for individuals and
//! inheritance, patches and the metapopulation, interchangeable breeding
//! strategies (fecundity, sex assignment, mating, selection), and the
//! breeding engine that composes them.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;

pub use base::{AgeClass, FitnessValue, Sex};
