//! Fitness functions queried by the breeding stage.
//!
//! The breeder never computes fitness itself; it asks a [`FitnessOracle`]
//! for the fitness of an individual in the context of its patch and then
//! works with the resulting weights through a [`FitnessTable`].
//!
//! ## Provided oracles
//! - **Neutral**: every individual has fitness 1.0 (no selection).
//! - **Stabilizing**: Gaussian fitness around the patch optimum,
//!   `w = exp(-(z - θ)² / (2ω²))`, the classic model of stabilizing selection
//!   in a heterogeneous habitat where each patch has its own optimum θ.

use crate::base::FitnessValue;
use crate::errors::FitnessError;
use crate::evolution::FitnessTable;
use crate::genome::Individual;
use crate::simulation::Patch;
use serde::{Deserialize, Serialize};

/// Query contract for fitness evaluation.
///
/// Implementors provide `fitness_of`; ranked and weighted queries over a
/// pool of individuals go through the [`FitnessTable`] returned by `table`.
pub trait FitnessOracle: Send + Sync {
    /// Fitness of `individual` living in `patch`. Must be non-negative.
    fn fitness_of(&self, individual: &Individual, patch: &Patch) -> FitnessValue;

    /// Build a weight table for `pool`, reusing cached fitness values.
    fn table(&self, pool: &[Individual], patch: &Patch) -> FitnessTable {
        FitnessTable::new(
            pool.iter()
                .map(|ind| {
                    ind.cached_fitness()
                        .unwrap_or_else(|| self.fitness_of(ind, patch))
                })
                .collect(),
        )
    }

    /// True if every individual is guaranteed the same fitness.
    fn is_neutral(&self) -> bool {
        false
    }
}

/// Every individual has neutral fitness.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NeutralFitness;

impl FitnessOracle for NeutralFitness {
    fn fitness_of(&self, _individual: &Individual, _patch: &Patch) -> FitnessValue {
        FitnessValue::NEUTRAL_FITNESS
    }

    fn is_neutral(&self) -> bool {
        true
    }
}

/// Gaussian stabilizing selection around the local optimum of each patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilizingFitness {
    /// Width ω of the fitness function (larger = weaker selection)
    pub width: f64,
}

impl StabilizingFitness {
    /// Create a stabilizing-selection fitness function.
    ///
    /// # Arguments
    /// * `width` - ω, must be finite and > 0.0
    ///   - 0.5 = strong selection (one ω away keeps ~60% fitness)
    ///   - 5.0+ = very weak selection
    ///
    /// # Errors
    /// Returns an error if `width` is not positive.
    pub fn new(width: f64) -> Result<Self, FitnessError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(FitnessError::InvalidParameter(
                "width must be finite and greater than 0.0".into(),
            ));
        }
        Ok(Self { width })
    }
}

impl FitnessOracle for StabilizingFitness {
    fn fitness_of(&self, individual: &Individual, patch: &Patch) -> FitnessValue {
        let deviation = individual.phenotype() - patch.optimum();
        FitnessValue::new((-(deviation * deviation) / (2.0 * self.width * self.width)).exp())
    }
}

/// Serializable choice of fitness function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FitnessModel {
    #[default]
    Neutral,
    Stabilizing { width: f64 },
}

impl FitnessModel {
    /// Validate parameters and produce the oracle.
    pub fn build(&self) -> Result<Box<dyn FitnessOracle>, FitnessError> {
        Ok(match *self {
            Self::Neutral => Box::new(NeutralFitness),
            Self::Stabilizing { width } => Box::new(StabilizingFitness::new(width)?),
        })
    }
}
