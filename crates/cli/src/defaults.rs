//! Shared default values for scenarios.
//! These values are used by both the `init` command and scenario parsing.

pub const SCENARIO_FILE: &str = "scenario.json";

pub const GENERATIONS: usize = 10;
pub const SEED: u64 = 42;

pub const PATCHES: usize = 4;
pub const CAPACITY: usize = 100;

pub const MEAN_FECUNDITY: f64 = 2.0;
pub const GROWTH_RATE: f64 = 1.5;
pub const FITNESS_WIDTH: f64 = 2.0;
