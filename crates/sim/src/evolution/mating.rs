//! Choosing the mother and father of each offspring.
//!
//! A [`MatingTopology`] is bound once from the configuration. Each cycle the
//! breeder opens a [`MatingContext`] per patch, which fixes everything that
//! must stay constant within that cycle: the weight tables of both sexes,
//! the designated polygynous males and the monogamous pairs.
//!
//! In one-sex systems every adult lives in the female bucket, so both
//! parents are drawn from it and [`ParentChoice::father_sex`] is female.

use crate::base::Sex;
use crate::errors::BreedingError;
use crate::evolution::{FitnessSortMode, FitnessTable, PairingCache};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mating system named in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatingSystem {
    /// Hermaphrodites mating at random; selfing happens by chance.
    RandomHermaphrodite,
    /// Hermaphrodites self with a fixed probability.
    Selfing,
    /// Random mating between the sexes.
    #[default]
    Promiscuity,
    /// Designated males sire all or part of the offspring.
    Polygyny,
    /// Exclusive pairs.
    Monogamy,
}

impl MatingSystem {
    /// True for the hermaphrodite systems, which have no males.
    pub fn is_one_sex(self) -> bool {
        matches!(self, Self::RandomHermaphrodite | Self::Selfing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RandomHermaphrodite => "random-hermaphrodite",
            Self::Selfing => "selfing",
            Self::Promiscuity => "promiscuity",
            Self::Polygyny => "polygyny",
            Self::Monogamy => "monogamy",
        }
    }
}

impl fmt::Display for MatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parent-choice mechanism bound for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatingTopology {
    RandomHermaphrodite,
    /// Father is the mother with probability `selfing_rate`, otherwise
    /// another hermaphrodite.
    PartialSelfing { selfing_rate: f64 },
    Promiscuity,
    /// `proportion == 1` is full polygyny.
    Polygyny {
        proportion: f64,
        males: usize,
        sort_mode: FitnessSortMode,
        subset_size: usize,
    },
    Monogamy,
}

impl MatingTopology {
    pub fn new(
        system: MatingSystem,
        proportion: f64,
        mating_males: usize,
        sort_mode: FitnessSortMode,
        subset_size: usize,
    ) -> Self {
        match system {
            MatingSystem::RandomHermaphrodite => Self::RandomHermaphrodite,
            MatingSystem::Selfing => Self::PartialSelfing {
                selfing_rate: proportion,
            },
            MatingSystem::Promiscuity => Self::Promiscuity,
            MatingSystem::Polygyny => Self::Polygyny {
                proportion,
                males: mating_males,
                sort_mode,
                subset_size,
            },
            MatingSystem::Monogamy => Self::Monogamy,
        }
    }

    pub fn is_one_sex(&self) -> bool {
        matches!(self, Self::RandomHermaphrodite | Self::PartialSelfing { .. })
    }

    /// Bucket fathers are drawn from.
    pub fn father_sex(&self) -> Sex {
        if self.is_one_sex() {
            Sex::Female
        } else {
            Sex::Male
        }
    }
}

/// Indices of the parents of one offspring. `mother` indexes the adult
/// female bucket, `father` the bucket given by `father_sex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentChoice {
    pub mother: usize,
    pub father: usize,
    pub father_sex: Sex,
}

/// Per-patch, per-cycle mating state.
#[derive(Debug)]
pub struct MatingContext {
    topology: MatingTopology,
    males: FitnessTable,
    females: FitnessTable,
    /// Designated polygynous males, fixed for the cycle.
    designated: Vec<usize>,
    pairs: PairingCache,
}

impl MatingContext {
    /// Open the mating state of one patch.
    ///
    /// `males` and `females` weight the adults of each sex; uniform tables
    /// give unweighted mating. `weighted` selects how polygynous males are
    /// designated: by `sort_mode` when true, uniformly at random otherwise.
    pub fn new<R: Rng + ?Sized>(
        topology: MatingTopology,
        males: FitnessTable,
        females: FitnessTable,
        weighted: bool,
        rng: &mut R,
    ) -> Result<Self, BreedingError> {
        let designated = match topology {
            MatingTopology::Polygyny {
                males: k,
                sort_mode,
                subset_size,
                ..
            } => {
                if weighted {
                    males.select_by_mode(sort_mode, k, subset_size, rng)
                } else {
                    FitnessTable::uniform(males.len()).sample_without_replacement(k, rng)
                }
            }
            _ => Vec::new(),
        };
        let pairs = match topology {
            MatingTopology::Monogamy => PairingCache::build(&males, &females, rng)?,
            _ => PairingCache::default(),
        };
        Ok(Self {
            topology,
            males,
            females,
            designated,
            pairs,
        })
    }

    pub fn designated_males(&self) -> &[usize] {
        &self.designated
    }

    pub fn pairs(&self) -> &PairingCache {
        &self.pairs
    }

    /// Choose the parents of one offspring, `None` if the required adults
    /// are missing.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ParentChoice> {
        let father_sex = self.topology.father_sex();
        match self.topology {
            MatingTopology::RandomHermaphrodite => {
                let mother = self.females.sample(rng)?;
                let father = self.females.sample(rng)?;
                Some(ParentChoice {
                    mother,
                    father,
                    father_sex,
                })
            }
            MatingTopology::PartialSelfing { selfing_rate } => {
                let mother = self.females.sample(rng)?;
                let father = if rng.random::<f64>() < selfing_rate {
                    mother
                } else {
                    self.females.sample_excluding(mother, rng).unwrap_or(mother)
                };
                Some(ParentChoice {
                    mother,
                    father,
                    father_sex,
                })
            }
            MatingTopology::Promiscuity => {
                let mother = self.females.sample(rng)?;
                let father = self.males.sample(rng)?;
                Some(ParentChoice {
                    mother,
                    father,
                    father_sex,
                })
            }
            MatingTopology::Polygyny { proportion, .. } => {
                let mother = self.females.sample(rng)?;
                let father = if proportion >= 1.0 || rng.random::<f64>() < proportion {
                    self.polygynous_father(mother)?
                } else {
                    self.males.sample(rng)?
                };
                Some(ParentChoice {
                    mother,
                    father,
                    father_sex,
                })
            }
            MatingTopology::Monogamy => {
                let pair = self.pairs.draw(rng)?;
                Some(ParentChoice {
                    mother: pair.female,
                    father: pair.male,
                    father_sex,
                })
            }
        }
    }

    /// Females are partitioned across the designated males by index.
    fn polygynous_father(&self, mother: usize) -> Option<usize> {
        match self.designated.len() {
            0 => None,
            1 => Some(self.designated[0]),
            n => Some(self.designated[mother % n]),
        }
    }
}
