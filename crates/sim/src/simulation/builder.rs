//! Builder pattern for creating breeders.
//!
//! Provides a fluent API for assembling a [`Breeder`] from its configuration,
//! fitness function and inheritance model, with validation on `build()`.

pub use crate::errors::BuilderError;
use crate::evolution::{
    FitnessModel, FitnessOracle, FitnessSortMode, MatingSystem, OffspringCountModel,
};
use crate::genome::{Inheritance, MidParent};
use crate::simulation::{BreedModel, Breeder, BreedingConfig, SelectionTarget};

/// Builder for constructing [`Breeder`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use metabreed_sim::evolution::{MatingSystem, OffspringCountModel};
/// use metabreed_sim::simulation::BreederBuilder;
///
/// let breeder = BreederBuilder::new()
///     .mating_system(MatingSystem::Selfing)
///     .offspring_count(OffspringCountModel::Fecundity)
///     .mean_fecundity(3.0)
///     .build()
///     .unwrap();
/// ```
pub struct BreederBuilder {
    mating_system: Option<MatingSystem>,
    config: BreedingConfig,
    fitness: FitnessModel,
    oracle: Option<Box<dyn FitnessOracle>>,
    inheritance: Box<dyn Inheritance>,
}

impl Default for BreederBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BreederBuilder {
    pub fn new() -> Self {
        Self {
            mating_system: None,
            config: BreedingConfig::default(),
            fitness: FitnessModel::Neutral,
            oracle: None,
            inheritance: Box::new(MidParent::exact()),
        }
    }

    /// Start from a full configuration; its mating system counts as set.
    pub fn from_config(config: BreedingConfig) -> Self {
        Self {
            mating_system: Some(config.mating_system),
            config,
            ..Self::new()
        }
    }

    /// Set the mating system (required).
    pub fn mating_system(mut self, system: MatingSystem) -> Self {
        self.mating_system = Some(system);
        self
    }

    pub fn mating_proportion(mut self, proportion: f64) -> Self {
        self.config.mating_proportion = proportion;
        self
    }

    pub fn mating_males(mut self, males: usize) -> Self {
        self.config.mating_males = males;
        self
    }

    pub fn offspring_count(mut self, model: OffspringCountModel) -> Self {
        self.config.offspring_count_model = model;
        self
    }

    pub fn mean_fecundity(mut self, fecundity: f64) -> Self {
        self.config.mean_fecundity = fecundity;
        self
    }

    pub fn growth_rate(mut self, rate: f64) -> Self {
        self.config.growth_rate = Some(rate);
        self
    }

    /// Sex ratio as males per female.
    pub fn sex_ratio(mut self, males_per_female: f64) -> Self {
        self.config.sex_ratio = males_per_female;
        self
    }

    pub fn keep_sex_ratio(mut self, keep: bool) -> Self {
        self.config.keep_sex_ratio = keep;
        self
    }

    /// Set the selection scope and the life stage it acts on.
    pub fn selection(mut self, model: BreedModel, target: SelectionTarget) -> Self {
        self.config.breed_model = model;
        self.config.selection_target = target;
        self
    }

    pub fn fitness_sort(mut self, mode: FitnessSortMode, subset_size: usize) -> Self {
        self.config.fitness_sort_mode = mode;
        self.config.fitness_subset_size = subset_size;
        self
    }

    /// Reset adult sexes from phenotype at `generation`.
    pub fn sex_threshold(mut self, threshold: f64, generation: usize) -> Self {
        self.config.sex_threshold = Some(threshold);
        self.config.sex_reset_generation = generation;
        self
    }

    /// Fitness function from its serializable description.
    pub fn fitness(mut self, model: FitnessModel) -> Self {
        self.fitness = model;
        self.oracle = None;
        self
    }

    /// Custom fitness function; takes precedence over [`Self::fitness`].
    pub fn fitness_oracle(mut self, oracle: Box<dyn FitnessOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn inheritance(mut self, inheritance: Box<dyn Inheritance>) -> Self {
        self.inheritance = inheritance;
        self
    }

    /// Build and validate the breeder.
    pub fn build(self) -> Result<Breeder, BuilderError> {
        let mating_system = self
            .mating_system
            .ok_or(BuilderError::MissingRequired("mating_system"))?;
        let config = BreedingConfig {
            mating_system,
            ..self.config
        };
        let oracle = match self.oracle {
            Some(oracle) => oracle,
            None => self.fitness.build()?,
        };
        Ok(Breeder::new(config, oracle, self.inheritance)?)
    }
}
