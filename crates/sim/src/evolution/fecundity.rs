//! Number of offspring produced by a patch in one cycle.

use crate::base::random::{poisson, round_count};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rule for the candidate offspring count of a patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OffspringCountModel {
    /// As many offspring as adults.
    KeepNumber,
    /// Exactly the carrying capacity.
    #[default]
    CarryingCapacity,
    /// round(females × mean fecundity).
    Fecundity,
    /// Poisson(females × mean fecundity).
    FecundityStochastic,
    /// round(Beverton-Holt recruitment of the adults).
    Logistic,
    /// Poisson(Beverton-Holt recruitment of the adults).
    LogisticStochastic,
}

impl OffspringCountModel {
    /// True for the two models that need a growth rate.
    pub fn is_logistic(self) -> bool {
        matches!(self, Self::Logistic | Self::LogisticStochastic)
    }
}

/// Beverton-Holt recruitment `r·N / (1 + (r − 1)·N / K)`.
///
/// Returns 0 for `n == 0` or `capacity == 0`, and 0 when the denominator is
/// not positive (only possible with `r < 1`). Equals `n` for `r == 1` and
/// tends to `capacity` as `n` grows when `r > 1`.
pub fn beverton_holt(growth_rate: f64, capacity: usize, n: usize) -> f64 {
    if n == 0 || capacity == 0 {
        return 0.0;
    }
    let n = n as f64;
    let denom = 1.0 + (growth_rate - 1.0) * n / capacity as f64;
    if denom <= 0.0 {
        return 0.0;
    }
    growth_rate * n / denom
}

/// An offspring-count model bound to its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FecundityModel {
    model: OffspringCountModel,
    mean_fecundity: f64,
    growth_rate: f64,
}

impl FecundityModel {
    pub fn new(model: OffspringCountModel, mean_fecundity: f64, growth_rate: f64) -> Self {
        Self {
            model,
            mean_fecundity,
            growth_rate,
        }
    }

    pub fn model(&self) -> OffspringCountModel {
        self.model
    }

    /// Candidate offspring count for `males` and `females` adults in a patch
    /// of carrying capacity `capacity`. May exceed `capacity`.
    pub fn offspring_count<R: Rng + ?Sized>(
        &self,
        males: usize,
        females: usize,
        capacity: usize,
        rng: &mut R,
    ) -> usize {
        match self.model {
            OffspringCountModel::KeepNumber => males + females,
            OffspringCountModel::CarryingCapacity => capacity,
            OffspringCountModel::Fecundity => round_count(females as f64 * self.mean_fecundity),
            OffspringCountModel::FecundityStochastic => {
                poisson(rng, females as f64 * self.mean_fecundity)
            }
            OffspringCountModel::Logistic => {
                round_count(beverton_holt(self.growth_rate, capacity, males + females))
            }
            OffspringCountModel::LogisticStochastic => {
                poisson(rng, beverton_holt(self.growth_rate, capacity, males + females))
            }
        }
    }
}
