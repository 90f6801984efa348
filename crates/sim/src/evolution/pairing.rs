//! Exclusive monogamous pairs, built once per patch per cycle.

use crate::errors::BreedingError;
use crate::evolution::FitnessTable;
use rand::seq::SliceRandom;
use rand::Rng;

/// One monogamous pair, as indices into the adult male and female buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatingPair {
    pub male: usize,
    pub female: usize,
}

/// The disjoint pairs of one patch for the current cycle.
///
/// Holds `min(males, females)` pairs; surplus adults stay unpaired and do not
/// reproduce.
#[derive(Debug, Clone, Default)]
pub struct PairingCache {
    pairs: Vec<MatingPair>,
}

impl PairingCache {
    /// Pair adults by drawing without replacement from both sexes.
    ///
    /// Draws are proportional to the weights in `males` and `females`; pass
    /// uniform tables for random pairing.
    pub fn build<R: Rng + ?Sized>(
        males: &FitnessTable,
        females: &FitnessTable,
        rng: &mut R,
    ) -> Result<Self, BreedingError> {
        let n = males.len().min(females.len());
        let mut male_idx = males.sample_without_replacement(n, rng);
        let female_idx = females.sample_without_replacement(n, rng);
        // full draws come back in index order
        male_idx.shuffle(rng);

        let pairs: Vec<MatingPair> = male_idx
            .into_iter()
            .zip(female_idx)
            .map(|(male, female)| MatingPair { male, female })
            .collect();

        check_disjoint(&pairs, males.len(), females.len())?;
        Ok(Self { pairs })
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[MatingPair] {
        &self.pairs
    }

    /// A pair drawn uniformly at random.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MatingPair> {
        if self.pairs.is_empty() {
            return None;
        }
        Some(self.pairs[rng.random_range(0..self.pairs.len())])
    }
}

fn check_disjoint(pairs: &[MatingPair], males: usize, females: usize) -> Result<(), BreedingError> {
    let mut male_used = vec![false; males];
    let mut female_used = vec![false; females];
    for pair in pairs {
        if std::mem::replace(&mut male_used[pair.male], true) {
            return Err(BreedingError::PairReuse {
                sex: "male",
                index: pair.male,
            });
        }
        if std::mem::replace(&mut female_used[pair.female], true) {
            return Err(BreedingError::PairReuse {
                sex: "female",
                index: pair.female,
            });
        }
    }
    Ok(())
}
