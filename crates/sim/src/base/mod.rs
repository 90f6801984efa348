//! Base types shared by every part of the breeding stage.
//!
//! This module provides sexes and age classes, the fitness weight type, and
//! the random-draw helpers used in place of a global generator.

pub mod fitness;
pub mod random;
mod sex;

pub use fitness::FitnessValue;
pub use sex::{AgeClass, Sex};
