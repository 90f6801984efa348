//! Individuals and the inheritance seam used when creating offspring.

mod individual;
pub mod inheritance;

pub use individual::{Individual, Parents};
pub use inheritance::{Inheritance, MidParent};
