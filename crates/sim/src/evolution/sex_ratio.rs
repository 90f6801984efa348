//! Assigning sexes to offspring.

use crate::base::random::{binomial, round_count};
use crate::base::Sex;
use crate::errors::{BreedingError, ConfigError};
use rand::Rng;

/// Convert a sex ratio given as males per female into the proportion of
/// males, `r / (1 + r)`.
pub fn male_proportion(males_per_female: f64) -> Result<f64, ConfigError> {
    if !males_per_female.is_finite() || males_per_female < 0.0 {
        return Err(ConfigError::InvalidSexRatio(males_per_female));
    }
    let p = males_per_female / (1.0 + males_per_female);
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::InvalidSexRatio(males_per_female));
    }
    Ok(p)
}

/// How offspring sexes are determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SexAssignment {
    /// Every offspring is female (hermaphrodites live in the female bucket).
    Selfing,
    /// Sons with a fixed probability `male_ratio`.
    Fixed { male_ratio: f64 },
    /// Sons in proportion to the adult males of the patch.
    ProportionalToAdults,
}

impl SexAssignment {
    /// Split `total` offspring into `(sons, daughters)`.
    ///
    /// `males` and `females` are the adult counts of the patch.
    pub fn split<R: Rng + ?Sized>(
        &self,
        total: usize,
        males: usize,
        females: usize,
        rng: &mut R,
    ) -> Result<(usize, usize), BreedingError> {
        let sons = match *self {
            Self::Selfing => 0,
            Self::Fixed { male_ratio } => binomial(rng, total, male_ratio),
            Self::ProportionalToAdults => {
                round_count(total as f64 * adult_male_proportion(males, females)).min(total)
            }
        };
        let daughters = total - sons;
        if sons + daughters != total {
            return Err(BreedingError::SexSplitMismatch {
                sons,
                daughters,
                total,
            });
        }
        Ok((sons, daughters))
    }

    /// Sex of a single offspring.
    pub fn draw<R: Rng + ?Sized>(&self, males: usize, females: usize, rng: &mut R) -> Sex {
        let p = match *self {
            Self::Selfing => return Sex::Female,
            Self::Fixed { male_ratio } => male_ratio,
            Self::ProportionalToAdults => adult_male_proportion(males, females),
        };
        if rng.random::<f64>() < p {
            Sex::Male
        } else {
            Sex::Female
        }
    }
}

fn adult_male_proportion(males: usize, females: usize) -> f64 {
    let n = males + females;
    if n == 0 {
        0.0
    } else {
        males as f64 / n as f64
    }
}
