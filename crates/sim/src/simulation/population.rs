//! Patches and the metapopulation that holds them.
//!
//! A [`Patch`] buckets its individuals by age class and sex. Breeding reads
//! the adult buckets and writes the offspring buckets; nothing else about a
//! patch is touched during a cycle.

use crate::base::{AgeClass, Sex};
use crate::genome::Individual;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-patch counters updated by each breeding cycle.
///
/// Counted over the matings performed, before any culling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BreedingStats {
    /// Distinct (mother, father) pairs that produced offspring.
    pub matings: usize,
    /// Distinct mothers that produced offspring.
    pub mothers: usize,
    /// Offspring produced, including those culled afterwards.
    pub offspring: usize,
    /// Offspring per mating female (0 when no female mated).
    pub realized_fecundity: f64,
}

impl BreedingStats {
    pub fn new(matings: usize, mothers: usize, offspring: usize) -> Self {
        let realized_fecundity = if mothers == 0 {
            0.0
        } else {
            offspring as f64 / mothers as f64
        };
        Self {
            matings,
            mothers,
            offspring,
            realized_fecundity,
        }
    }
}

/// A spatially distinct subpopulation with its own carrying capacity.
#[derive(Debug, Clone)]
pub struct Patch {
    id: Arc<str>,
    capacity: usize,
    /// Local phenotypic optimum, read by fitness functions.
    optimum: f64,
    /// Indexed by `[AgeClass::to_index()][Sex::to_index()]`.
    buckets: [[Vec<Individual>; 2]; 2],
    stats: BreedingStats,
}

impl Patch {
    /// Create an empty patch.
    pub fn new(id: impl Into<Arc<str>>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            capacity,
            optimum: 0.0,
            buckets: Default::default(),
            stats: BreedingStats::default(),
        }
    }

    /// Set the local phenotypic optimum.
    pub fn with_optimum(mut self, optimum: f64) -> Self {
        self.optimum = optimum;
        self
    }

    /// Get patch ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Carrying capacity K.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn optimum(&self) -> f64 {
        self.optimum
    }

    /// Number of individuals of `sex` in age class `age`.
    #[inline]
    pub fn size(&self, sex: Sex, age: AgeClass) -> usize {
        self.buckets[age.to_index()][sex.to_index()].len()
    }

    /// Number of individuals of both sexes in age class `age`.
    pub fn size_of_age(&self, age: AgeClass) -> usize {
        self.size(Sex::Male, age) + self.size(Sex::Female, age)
    }

    /// Individuals of one sex and age class as a slice.
    #[inline]
    pub fn individuals(&self, sex: Sex, age: AgeClass) -> &[Individual] {
        &self.buckets[age.to_index()][sex.to_index()]
    }

    /// Get a specific individual by bucket and index.
    #[inline]
    pub fn get(&self, sex: Sex, age: AgeClass, index: usize) -> Option<&Individual> {
        self.buckets[age.to_index()][sex.to_index()].get(index)
    }

    /// Add an individual to age class `age`, bucketed by its sex.
    pub fn add(&mut self, age: AgeClass, individual: Individual) {
        self.buckets[age.to_index()][individual.sex().to_index()].push(individual);
    }

    /// Add a founder or surviving adult.
    pub fn add_adult(&mut self, individual: Individual) {
        self.add(AgeClass::Adult, individual);
    }

    /// Insert a newly bred offspring.
    pub fn add_offspring(&mut self, individual: Individual) {
        self.add(AgeClass::Offspring, individual);
    }

    /// Remove every individual of age class `age`.
    pub fn flush(&mut self, age: AgeClass) {
        for bucket in &mut self.buckets[age.to_index()] {
            bucket.clear();
        }
    }

    /// Remove and return all individuals of age class `age`, females first.
    pub fn take(&mut self, age: AgeClass) -> Vec<Individual> {
        let [males, females] = std::mem::take(&mut self.buckets[age.to_index()]);
        let mut all = females;
        all.extend(males);
        all
    }

    /// Offspring become the adults of the next generation; the old adults
    /// are discarded.
    pub fn replace_adults_with_offspring(&mut self) {
        let offspring = std::mem::take(&mut self.buckets[AgeClass::Offspring.to_index()]);
        self.buckets[AgeClass::Adult.to_index()] = offspring;
    }

    /// Reassign the sex of every individual of age class `age` from its
    /// phenotype: strictly above `threshold` is male, otherwise female.
    ///
    /// Returns the number of individuals whose sex changed.
    pub fn reset_sex_from_phenotype(&mut self, age: AgeClass, threshold: f64) -> usize {
        let all = self.take(age);
        let mut changed = 0;
        for mut ind in all {
            let sex = if ind.phenotype() > threshold {
                Sex::Male
            } else {
                Sex::Female
            };
            if sex != ind.sex() {
                ind.set_sex(sex);
                changed += 1;
            }
            self.add(age, ind);
        }
        changed
    }

    /// Counters from the most recent feasible breeding cycle.
    pub fn stats(&self) -> BreedingStats {
        self.stats
    }

    pub fn set_stats(&mut self, stats: BreedingStats) {
        self.stats = stats;
    }
}

/// The ordered set of patches plus the generation counter.
#[derive(Debug, Clone, Default)]
pub struct Metapopulation {
    patches: Vec<Patch>,
    generation: usize,
}

impl Metapopulation {
    pub fn new(patches: Vec<Patch>) -> Self {
        Self {
            patches,
            generation: 0,
        }
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut [Patch] {
        &mut self.patches
    }

    pub fn patch(&self, index: usize) -> Option<&Patch> {
        self.patches.get(index)
    }

    pub fn num_patches(&self) -> usize {
        self.patches.len()
    }

    /// Get the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Increment the generation counter.
    pub fn increment_generation(&mut self) {
        self.generation += 1;
    }

    /// Total number of individuals of age class `age` across all patches.
    pub fn size_of_age(&self, age: AgeClass) -> usize {
        self.patches.iter().map(|p| p.size_of_age(age)).sum()
    }

    /// Move offspring into the adult buckets of every patch.
    pub fn replace_adults_with_offspring(&mut self) {
        for patch in &mut self.patches {
            patch.replace_adults_with_offspring();
        }
    }
}
