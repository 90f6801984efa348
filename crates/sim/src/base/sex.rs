use core::fmt;

use serde::{Deserialize, Serialize};

/// Biological sex of an individual.
///
/// The mapping of variants to integers is stable and used to index the
/// per-sex buckets of a patch (Male=0, Female=1). Hermaphrodites of one-sex
/// mating systems are stored as `Female`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Sex {
    Male = 0,
    Female = 1,
}

impl Sex {
    /// Both sexes in bucket order.
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Convert to the bucket index (0-1).
    #[inline(always)]
    pub const fn to_index(self) -> usize {
        self as usize
    }

    /// Lowercase name, used in log and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age class of an individual within a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AgeClass {
    Offspring = 0,
    Adult = 1,
}

impl AgeClass {
    #[inline(always)]
    pub const fn to_index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offspring => f.write_str("offspring"),
            Self::Adult => f.write_str("adult"),
        }
    }
}
