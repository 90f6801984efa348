//! Breeding engine.
//!
//! [`Breeder`] runs the reproduction stage of a generation. For every patch
//! it checks that mating is possible, draws the number of offspring, picks
//! parents through the bound mating topology and fills the offspring bucket.
//! Fitness enters in one of two ways:
//!
//! - **selection on offspring**: offspring are produced without regard to
//!   fitness and then culled by it;
//! - **selection on parentage**: fitter adults are more likely to be chosen as
//!   parents and nothing is culled.
//!
//! Patches breed in parallel. Each patch gets its own generator seeded from
//! the master generator in patch order, so a run is reproducible regardless
//! of the number of threads.

use crate::base::random::{binomial, patch_rng, patch_seeds};
use crate::base::{AgeClass, FitnessValue, Sex};
use crate::errors::{BreedingError, ConfigError};
use crate::evolution::{
    hard_survivors, metapop_target, soft_survivors, FitnessOracle, FitnessTable, MatingContext,
    ParentChoice,
};
use crate::genome::{Individual, Inheritance};
use crate::simulation::{
    BreedModel, BreedingConfig, BreedingStats, Metapopulation, Patch, SelectionTarget, Strategies,
};
use log::{debug, info, warn};
use rand::RngCore;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::collections::HashSet;

/// A stage of the life cycle acting on the whole metapopulation.
pub trait LifeCycleEvent {
    fn name(&self) -> &'static str;

    /// Age class the event reads.
    fn required_age_class(&self) -> AgeClass;

    /// Age class the event fills.
    fn added_age_class(&self) -> AgeClass;

    /// Check the metapopulation against the event's configuration before the
    /// first generation.
    fn init(&mut self, metapop: &Metapopulation) -> Result<(), ConfigError>;

    /// Hook run at the start of `generation`, before any event executes.
    fn before_generation(&mut self, metapop: &mut Metapopulation, generation: usize);

    /// Apply the event once.
    fn execute(
        &mut self,
        metapop: &mut Metapopulation,
        rng: &mut dyn RngCore,
    ) -> Result<(), BreedingError>;
}

/// Result of breeding one patch, before any cross-patch culling.
#[derive(Debug, Clone, Copy)]
struct PatchOutcome {
    /// Counters over the matings performed; `None` when mating was impossible.
    stats: Option<BreedingStats>,
    /// Sum and count of offspring fitness, for metapopulation culling.
    offspring_fitness: (f64, usize),
}

impl PatchOutcome {
    fn skipped() -> Self {
        Self {
            stats: None,
            offspring_fitness: (0.0, 0),
        }
    }

    fn bred(offspring: &[Individual], offspring_fitness: (f64, usize)) -> Self {
        Self {
            stats: Some(stats_from_offspring(offspring)),
            offspring_fitness,
        }
    }

    fn feasible(&self) -> bool {
        self.stats.is_some()
    }
}

/// The breeding stage.
pub struct Breeder {
    config: BreedingConfig,
    strategies: Strategies,
    fitness: Box<dyn FitnessOracle>,
    inheritance: Box<dyn Inheritance>,
    sex_reset_done: bool,
}

impl std::fmt::Debug for Breeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Breeder")
            .field("strategies", &self.strategies)
            .field("sex_reset_done", &self.sex_reset_done)
            .finish_non_exhaustive()
    }
}

impl Breeder {
    /// Validate `config` and bind its strategies.
    ///
    /// See also [`BreederBuilder`](crate::simulation::BreederBuilder).
    pub fn new(
        config: BreedingConfig,
        fitness: Box<dyn FitnessOracle>,
        inheritance: Box<dyn Inheritance>,
    ) -> Result<Self, ConfigError> {
        let strategies = config.bind()?;
        Ok(Self {
            config,
            strategies,
            fitness,
            inheritance,
            sex_reset_done: false,
        })
    }

    pub fn config(&self) -> &BreedingConfig {
        &self.config
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    /// Whether the one-time sex reset has already happened.
    pub fn sex_reset_done(&self) -> bool {
        self.sex_reset_done
    }

    /// One full generation: the pre-generation hook, breeding, then the
    /// offspring replace the adults.
    pub fn step(
        &mut self,
        metapop: &mut Metapopulation,
        rng: &mut dyn RngCore,
    ) -> Result<(), BreedingError> {
        let generation = metapop.generation() + 1;
        self.before_generation(metapop, generation);
        self.execute(metapop, rng)?;
        metapop.replace_adults_with_offspring();
        metapop.increment_generation();
        Ok(())
    }

    /// Run `generations` consecutive steps.
    pub fn run_for(
        &mut self,
        metapop: &mut Metapopulation,
        generations: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(), BreedingError> {
        for _ in 0..generations {
            self.step(metapop, rng)?;
        }
        Ok(())
    }

    /// Fill the offspring bucket of every patch.
    pub fn breed(
        &self,
        metapop: &mut Metapopulation,
        rng: &mut dyn RngCore,
    ) -> Result<(), BreedingError> {
        let n = metapop.num_patches();
        let seeds = patch_seeds(rng, n);
        let cull_seeds = patch_seeds(rng, n);
        // offspring belong to the next generation
        let generation = metapop.generation() + 1;

        let adult_means = self.adult_fitness_means(metapop);

        let outcomes: Vec<PatchOutcome> = metapop
            .patches_mut()
            .par_iter_mut()
            .zip(seeds.par_iter())
            .zip(adult_means.par_iter())
            .map(|((patch, &seed), &means)| {
                let mut rng = patch_rng(seed);
                self.breed_patch(patch, generation, means, &mut rng)
            })
            .collect::<Result<Vec<_>, BreedingError>>()?;

        if self.strategies.culls_offspring() && self.strategies.breed_model == BreedModel::SoftMetapop
        {
            self.cull_metapop(metapop, &outcomes, &cull_seeds);
        }

        for (patch, outcome) in metapop.patches_mut().iter_mut().zip(&outcomes) {
            if let Some(stats) = outcome.stats {
                patch.set_stats(stats);
            }
        }

        let bred = outcomes.iter().filter(|o| o.feasible()).count();
        info!(
            "Generation {generation}: {offspring} offspring in {bred}/{n} breeding patches",
            offspring = metapop.size_of_age(AgeClass::Offspring),
        );
        Ok(())
    }

    /// Mean adult fitness per patch and over the metapopulation, needed when
    /// fitness scales the offspring count before parents are drawn.
    fn adult_fitness_means(&self, metapop: &Metapopulation) -> Vec<(f64, f64)> {
        let n = metapop.num_patches();
        let needed = self.strategies.weights_parents()
            && matches!(
                self.strategies.breed_model,
                BreedModel::SoftMetapop | BreedModel::Hard
            );
        if !needed || self.fitness.is_neutral() {
            return vec![(1.0, 1.0); n];
        }

        let sums: Vec<(f64, usize)> = metapop
            .patches()
            .par_iter()
            .map(|patch| {
                Sex::ALL.into_iter().fold((0.0, 0), |(sum, count), sex| {
                    let pool = patch.individuals(sex, AgeClass::Adult);
                    let table = self.fitness.table(pool, patch);
                    (sum + table.total(), count + table.len())
                })
            })
            .collect();

        let (total, count) = sums
            .iter()
            .fold((0.0, 0), |(s, c), &(ps, pc)| (s + ps, c + pc));
        let metapop_mean = if count == 0 { 0.0 } else { total / count as f64 };

        sums.into_iter()
            .map(|(sum, count)| {
                let patch_mean = if count == 0 { 0.0 } else { sum / count as f64 };
                (patch_mean, metapop_mean)
            })
            .collect()
    }

    /// Adult counts if mating is possible in `patch`, `None` otherwise.
    ///
    /// Always empties the offspring bucket.
    fn check_mating(&self, patch: &mut Patch) -> Result<Option<(usize, usize)>, BreedingError> {
        patch.flush(AgeClass::Offspring);
        let males = patch.size(Sex::Male, AgeClass::Adult);
        let females = patch.size(Sex::Female, AgeClass::Adult);

        if self.strategies.topology.is_one_sex() {
            if males != 0 {
                return Err(BreedingError::MalesInOneSexSystem {
                    patch: patch.id().to_string(),
                    males,
                });
            }
            if females == 0 {
                return Ok(None);
            }
        } else if females == 0 || males == 0 {
            return Ok(None);
        }
        Ok(Some((males, females)))
    }

    fn breed_patch(
        &self,
        patch: &mut Patch,
        generation: usize,
        (patch_mean, metapop_mean): (f64, f64),
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<PatchOutcome, BreedingError> {
        let Some((males, females)) = self.check_mating(patch)? else {
            debug!("Patch {}: mating not possible, skipped", patch.id());
            return Ok(PatchOutcome::skipped());
        };

        let total = self
            .strategies
            .fecundity
            .offspring_count(males, females, patch.capacity(), rng);

        let outcome = if self.strategies.selection_target == SelectionTarget::Parentage {
            self.breed_on_parentage(patch, generation, total, (patch_mean, metapop_mean), rng)?
        } else {
            self.breed_then_cull(patch, generation, total, rng)?
        };

        debug!(
            "Patch {}: {males} males, {females} females, {total} drawn, {kept} kept",
            patch.id(),
            kept = patch.size_of_age(AgeClass::Offspring),
        );
        Ok(outcome)
    }

    /// Selection on parentage: fitter adults are drawn more often as parents
    /// and each offspring's sex is drawn on its own.
    fn breed_on_parentage(
        &self,
        patch: &mut Patch,
        generation: usize,
        total: usize,
        (patch_mean, metapop_mean): (f64, f64),
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<PatchOutcome, BreedingError> {
        let weighted = self.strategies.weights_parents();
        let total = match self.strategies.breed_model {
            BreedModel::SoftMetapop if weighted => {
                metapop_target(total, patch.capacity(), patch_mean, metapop_mean)
            }
            BreedModel::Hard if weighted => binomial(rng, total, patch_mean),
            _ => total,
        };

        let ctx = self.mating_context(patch, weighted, rng)?;
        let males = patch.size(Sex::Male, AgeClass::Adult);
        let females = patch.size(Sex::Female, AgeClass::Adult);

        let mut offspring = Vec::with_capacity(total);
        for i in 0..total {
            let Some(choice) = ctx.choose(rng) else {
                break;
            };
            let sex = self.strategies.sex_assignment.draw(males, females, rng);
            offspring.push(self.make_offspring(patch, generation, i, sex, choice, rng)?);
        }
        let outcome = PatchOutcome::bred(&offspring, (0.0, 0));
        for child in offspring {
            patch.add_offspring(child);
        }
        Ok(outcome)
    }

    /// Selection on offspring: produce `total` offspring at random, daughters
    /// first, then cull them by fitness.
    fn breed_then_cull(
        &self,
        patch: &mut Patch,
        generation: usize,
        total: usize,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<PatchOutcome, BreedingError> {
        let males = patch.size(Sex::Male, AgeClass::Adult);
        let females = patch.size(Sex::Female, AgeClass::Adult);
        let (_sons, daughters) = self
            .strategies
            .sex_assignment
            .split(total, males, females, rng)?;

        let ctx = self.mating_context(patch, false, rng)?;
        let mut offspring = Vec::with_capacity(total);
        for i in 0..total {
            let Some(choice) = ctx.choose(rng) else {
                break;
            };
            let sex = if i < daughters { Sex::Female } else { Sex::Male };
            offspring.push(self.make_offspring(patch, generation, i, sex, choice, rng)?);
        }

        if !self.strategies.culls_offspring() {
            let outcome = PatchOutcome::bred(&offspring, (0.0, 0));
            for child in offspring {
                patch.add_offspring(child);
            }
            return Ok(outcome);
        }

        for child in &mut offspring {
            let w = self.fitness.fitness_of(child, patch);
            child.set_cached_fitness(w);
        }
        let fitness_sum: f64 = offspring
            .iter()
            .filter_map(|c| c.cached_fitness())
            .map(FitnessValue::get)
            .sum();
        let produced = offspring.len();
        let outcome = PatchOutcome::bred(&offspring, (fitness_sum, produced));
        for child in offspring {
            patch.add_offspring(child);
        }

        let capacity = patch.capacity();
        match self.strategies.breed_model {
            BreedModel::SoftPatch => {
                self.cull(patch, rng, |table, rng| {
                    soft_survivors(table, produced.min(capacity), rng)
                });
            }
            BreedModel::Hard => {
                self.cull(patch, rng, |table, rng| hard_survivors(table, capacity, rng));
            }
            // metapopulation culling runs once every patch has bred
            BreedModel::SoftMetapop | BreedModel::Neutral => {}
        }

        Ok(outcome)
    }

    /// Soft culling relative to the metapopulation mean offspring fitness.
    fn cull_metapop(&self, metapop: &mut Metapopulation, outcomes: &[PatchOutcome], seeds: &[u64]) {
        let (sum, count) = outcomes
            .iter()
            .fold((0.0, 0), |(s, c), o| (s + o.offspring_fitness.0, c + o.offspring_fitness.1));
        if count == 0 {
            return;
        }
        let metapop_mean = sum / count as f64;

        metapop
            .patches_mut()
            .par_iter_mut()
            .zip(outcomes.par_iter())
            .zip(seeds.par_iter())
            .filter(|((_, outcome), _)| outcome.feasible() && outcome.offspring_fitness.1 > 0)
            .for_each(|((patch, outcome), &seed)| {
                let mut rng = patch_rng(seed);
                let (patch_sum, n) = outcome.offspring_fitness;
                let target = metapop_target(n, patch.capacity(), patch_sum / n as f64, metapop_mean);
                self.cull(patch, &mut rng, |table, rng| soft_survivors(table, target, rng));
            });
    }

    /// Keep the offspring of `patch` chosen by `survivors`.
    fn cull<F>(&self, patch: &mut Patch, rng: &mut Xoshiro256PlusPlus, survivors: F)
    where
        F: FnOnce(&FitnessTable, &mut Xoshiro256PlusPlus) -> Vec<usize>,
    {
        let pool = patch.take(AgeClass::Offspring);
        let table = self.fitness.table(&pool, patch);
        if !table.is_empty() && table.total() <= 0.0 {
            warn!(
                "Patch {}: all {} offspring have zero fitness, culling at random",
                patch.id(),
                table.len()
            );
        }
        let mut keep = survivors(&table, rng);
        keep.sort_unstable();

        let mut keep = keep.into_iter().peekable();
        for (i, child) in pool.into_iter().enumerate() {
            if keep.peek() == Some(&i) {
                keep.next();
                patch.add_offspring(child);
            }
        }
    }

    fn mating_context(
        &self,
        patch: &Patch,
        weighted: bool,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<MatingContext, BreedingError> {
        let evaluate = weighted && !self.fitness.is_neutral();
        let table = |sex: Sex| {
            let pool = patch.individuals(sex, AgeClass::Adult);
            if evaluate {
                self.fitness.table(pool, patch)
            } else {
                FitnessTable::uniform(pool.len())
            }
        };
        MatingContext::new(
            self.strategies.topology,
            table(Sex::Male),
            table(Sex::Female),
            weighted,
            rng,
        )
    }

    fn make_offspring(
        &self,
        patch: &Patch,
        generation: usize,
        index: usize,
        sex: Sex,
        choice: ParentChoice,
        rng: &mut Xoshiro256PlusPlus,
    ) -> Result<Individual, BreedingError> {
        let mother = patch
            .get(Sex::Female, AgeClass::Adult, choice.mother)
            .ok_or_else(|| {
                BreedingError::InvariantViolation(format!(
                    "mother index {} out of range in patch '{}'",
                    choice.mother,
                    patch.id()
                ))
            })?;
        let father = patch
            .get(choice.father_sex, AgeClass::Adult, choice.father)
            .ok_or_else(|| {
                BreedingError::InvariantViolation(format!(
                    "father index {} out of range in patch '{}'",
                    choice.father,
                    patch.id()
                ))
            })?;
        let phenotype = self.inheritance.offspring_phenotype(mother, father, rng);
        let id = format!("{}_g{}_{}", patch.id(), generation, index);
        Ok(Individual::offspring(id, sex, phenotype, mother, father))
    }
}

/// Counters over the matings that produced `offspring`, taken before culling.
fn stats_from_offspring(offspring: &[Individual]) -> BreedingStats {
    let mut matings: HashSet<(&str, &str)> = HashSet::new();
    let mut mothers: HashSet<&str> = HashSet::new();
    for parents in offspring.iter().filter_map(Individual::parents) {
        matings.insert((&*parents.mother, &*parents.father));
        mothers.insert(&*parents.mother);
    }
    BreedingStats::new(matings.len(), mothers.len(), offspring.len())
}

impl LifeCycleEvent for Breeder {
    fn name(&self) -> &'static str {
        "breed"
    }

    fn required_age_class(&self) -> AgeClass {
        AgeClass::Adult
    }

    fn added_age_class(&self) -> AgeClass {
        AgeClass::Offspring
    }

    fn init(&mut self, metapop: &Metapopulation) -> Result<(), ConfigError> {
        self.sex_reset_done = false;
        if self.strategies.topology.is_one_sex() {
            if let Some(patch) = metapop
                .patches()
                .iter()
                .find(|p| p.size(Sex::Male, AgeClass::Adult) > 0)
            {
                return Err(ConfigError::Incompatible(format!(
                    "mating system '{}' has a single sex but patch '{}' holds {} adult males",
                    self.strategies.mating_system,
                    patch.id(),
                    patch.size(Sex::Male, AgeClass::Adult)
                )));
            }
        }
        info!(
            "Breeding initialised: {} mating, {:?} selection on {:?}, {} patches",
            self.strategies.mating_system,
            self.strategies.breed_model,
            self.strategies.selection_target,
            metapop.num_patches()
        );
        Ok(())
    }

    fn before_generation(&mut self, metapop: &mut Metapopulation, generation: usize) {
        let Some(threshold) = self.strategies.sex_threshold else {
            return;
        };
        if self.sex_reset_done || generation != self.strategies.sex_reset_generation {
            return;
        }
        let changed: usize = metapop
            .patches_mut()
            .iter_mut()
            .map(|p| p.reset_sex_from_phenotype(AgeClass::Adult, threshold))
            .sum();
        self.sex_reset_done = true;
        info!("Generation {generation}: sexes reset from phenotype (threshold {threshold}), {changed} changed");
    }

    fn execute(
        &mut self,
        metapop: &mut Metapopulation,
        rng: &mut dyn RngCore,
    ) -> Result<(), BreedingError> {
        self.breed(metapop, rng)
    }
}
