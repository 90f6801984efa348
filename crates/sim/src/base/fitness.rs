use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, MulAssign};

use serde::{Deserialize, Serialize};

/// A finite, non-negative fitness weight.
///
/// Soft selection only uses fitness relative to other individuals, so values
/// above 1.0 are allowed up to [`FitnessValue::MAX_FITNESS`]. Hard selection
/// reads the value as an absolute survival probability through
/// [`FitnessValue::survival_probability`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct FitnessValue(f64);

impl FitnessValue {
    /// Fitness of an individual unaffected by selection.
    pub const NEUTRAL_FITNESS: Self = Self(1.0);

    /// Fitness of an individual that cannot survive or reproduce.
    pub const LETHAL_FITNESS: Self = Self(0.0);

    /// Largest representable fitness. Sums over any realistic pool stay finite.
    pub const MAX_FITNESS: Self = Self(1e150);

    /// Creates a new FitnessValue. Negative and NaN inputs become lethal,
    /// values above [`Self::MAX_FITNESS`] (including infinity) are capped.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::LETHAL_FITNESS;
        }
        Self(value.clamp(0.0, Self::MAX_FITNESS.0))
    }

    /// Returns the inner f64 value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Fitness read as an absolute probability of surviving, clamped to [0, 1].
    #[inline]
    pub fn survival_probability(self) -> f64 {
        self.0.min(1.0)
    }

    /// True if this fitness can never be drawn by weighted sampling.
    #[inline]
    pub fn is_lethal(self) -> bool {
        self.0 == 0.0
    }

}

impl From<FitnessValue> for f64 {
    fn from(fitness: FitnessValue) -> Self {
        fitness.0
    }
}

impl From<f64> for FitnessValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self::NEUTRAL_FITNESS
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for FitnessValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.0 + rhs.0)
    }
}

impl Mul for FitnessValue {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.0 * rhs.0)
    }
}

impl MulAssign for FitnessValue {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Sum for FitnessValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::LETHAL_FITNESS, Add::add)
    }
}
