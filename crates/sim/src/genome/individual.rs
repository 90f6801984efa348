use crate::base::{FitnessValue, Sex};
use std::sync::Arc;

/// Identifiers of the two parents of an individual.
///
/// Parents are referenced by id only; breeding never owns or mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parents {
    pub mother: Arc<str>,
    pub father: Arc<str>,
}

impl Parents {
    /// True if the individual was produced by self-fertilization.
    pub fn is_selfed(&self) -> bool {
        self.mother == self.father
    }
}

/// An individual organism as seen by the breeding stage.
///
/// `Individual` carries a sex, a scalar phenotype that fitness functions and
/// the sex reset read, the ids of its parents, and a cached fitness value.
/// The `id` is stored in an `Arc<str>` so cloning individuals is cheap for
/// the identifier field.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Unique identifier
    id: Arc<str>,
    sex: Sex,
    phenotype: f64,
    /// `None` for founders.
    parents: Option<Parents>,
    /// Cached fitness value. `None` indicates that the fitness has not
    /// been computed/memoized yet.
    fitness: Option<FitnessValue>,
}

impl Individual {
    /// Create a founder individual (no recorded parents).
    pub fn new(id: impl Into<Arc<str>>, sex: Sex, phenotype: f64) -> Self {
        Self {
            id: id.into(),
            sex,
            phenotype,
            parents: None,
            fitness: None,
        }
    }

    /// Create an offspring of `mother` and `father`.
    pub fn offspring(
        id: impl Into<Arc<str>>,
        sex: Sex,
        phenotype: f64,
        mother: &Individual,
        father: &Individual,
    ) -> Self {
        Self {
            id: id.into(),
            sex,
            phenotype,
            parents: Some(Parents {
                mother: Arc::clone(&mother.id),
                father: Arc::clone(&father.id),
            }),
            fitness: None,
        }
    }

    /// Return the individual's identifier as a `&str`.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Change the sex. Only the patch may do this, since it moves the
    /// individual between buckets.
    #[inline]
    pub(crate) fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
    }

    #[inline]
    pub fn phenotype(&self) -> f64 {
        self.phenotype
    }

    #[inline]
    pub fn parents(&self) -> Option<&Parents> {
        self.parents.as_ref()
    }

    /// Return the cached fitness value for this individual.
    ///
    /// Returns `None` if the fitness has not yet been computed.
    #[inline]
    pub fn cached_fitness(&self) -> Option<FitnessValue> {
        self.fitness
    }

    /// Set the cached fitness value for this individual.
    #[inline]
    pub fn set_cached_fitness(&mut self, fitness: impl Into<FitnessValue>) {
        self.fitness = Some(fitness.into());
    }

    /// Clear the cached fitness value, indicating it needs to be recomputed.
    #[inline]
    pub fn clear_cached_fitness(&mut self) {
        self.fitness = None;
    }
}
