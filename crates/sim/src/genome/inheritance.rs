//! How an offspring's phenotype derives from its parents.
//!
//! Genome representation is outside the breeding stage; the breeder only
//! needs a phenotype for each new individual so that fitness can be
//! evaluated. The [`Inheritance`] trait is the seam where a genetic model
//! plugs in.

use crate::errors::FitnessError;
use crate::genome::Individual;
use rand::RngCore;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Produces the phenotype of one offspring from its parents.
pub trait Inheritance: Send + Sync {
    /// Phenotype of an offspring of `mother` and `father`. Selfed offspring
    /// receive the same individual twice.
    fn offspring_phenotype(
        &self,
        mother: &Individual,
        father: &Individual,
        rng: &mut dyn RngCore,
    ) -> f64;
}

/// Mid-parent inheritance with optional Gaussian segregation noise.
///
/// The offspring phenotype is the mean of the parental phenotypes plus a
/// normal deviate with standard deviation `segregation_sd`. With
/// `segregation_sd == 0` no random draw is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidParent {
    pub segregation_sd: f64,
}

impl MidParent {
    /// Create a mid-parent model.
    ///
    /// # Errors
    /// Returns an error if `segregation_sd` is negative or not finite.
    pub fn new(segregation_sd: f64) -> Result<Self, FitnessError> {
        if !segregation_sd.is_finite() || segregation_sd < 0.0 {
            return Err(FitnessError::InvalidParameter(
                "segregation_sd must be finite and >= 0.0".into(),
            ));
        }
        Ok(Self { segregation_sd })
    }

    /// Deterministic mid-parent model.
    pub fn exact() -> Self {
        Self {
            segregation_sd: 0.0,
        }
    }
}

impl Default for MidParent {
    fn default() -> Self {
        Self::exact()
    }
}

impl Inheritance for MidParent {
    fn offspring_phenotype(
        &self,
        mother: &Individual,
        father: &Individual,
        rng: &mut dyn RngCore,
    ) -> f64 {
        let mid = 0.5 * (mother.phenotype() + father.phenotype());
        if self.segregation_sd == 0.0 {
            return mid;
        }
        match Normal::new(mid, self.segregation_sd) {
            Ok(dist) => dist.sample(rng),
            Err(_) => mid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Sex;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_mid_parent_exact() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mother = Individual::new("m", Sex::Female, 1.0);
        let father = Individual::new("f", Sex::Male, 3.0);
        let z = MidParent::exact().offspring_phenotype(&mother, &father, &mut rng);
        assert_eq!(z, 2.0);
    }

    #[test]
    fn test_mid_parent_noise_centred() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let model = MidParent::new(0.5).unwrap();
        let mother = Individual::new("m", Sex::Female, -1.0);
        let father = Individual::new("f", Sex::Male, 1.0);
        let n = 5_000;
        let mean: f64 = (0..n)
            .map(|_| model.offspring_phenotype(&mother, &father, &mut rng))
            .sum::<f64>()
            / n as f64;
        assert!(mean.abs() < 0.05, "mean was {mean}");
    }

    #[test]
    fn test_mid_parent_invalid_sd() {
        assert!(MidParent::new(-0.1).is_err());
        assert!(MidParent::new(f64::INFINITY).is_err());
    }
}
