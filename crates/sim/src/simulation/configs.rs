//! Breeding configuration.
//!
//! [`BreedingConfig`] is the serializable parameter set of the breeding stage.
//! It is validated and turned into a [`Strategies`] value exactly once, when a
//! [`Breeder`](crate::simulation::Breeder) is built; nothing is re-read during
//! a run.

use crate::errors::ConfigError;
use crate::evolution::{
    male_proportion, FecundityModel, FitnessSortMode, MatingSystem, MatingTopology,
    OffspringCountModel, SexAssignment,
};
use serde::{Deserialize, Serialize};

/// Scope at which fitness acts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreedModel {
    /// Soft selection within each patch.
    SoftPatch,
    /// Soft selection relative to the whole metapopulation.
    SoftMetapop,
    /// Hard selection: fitness is an absolute survival probability.
    Hard,
    /// No selection.
    #[default]
    Neutral,
}

impl BreedModel {
    pub fn is_neutral(self) -> bool {
        self == Self::Neutral
    }
}

/// Life stage on which fitness acts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionTarget {
    /// Offspring are produced at random, then culled by fitness.
    #[default]
    Offspring,
    /// Fitter adults are more likely to become parents; no culling.
    Parentage,
}

/// Parameters of the breeding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreedingConfig {
    pub mating_system: MatingSystem,
    /// Selfing rate for `selfing`, share of polygynous matings for `polygyny`.
    pub mating_proportion: f64,
    /// Number of designated males under polygyny.
    pub mating_males: usize,
    pub mean_fecundity: f64,
    /// Only read by the logistic offspring-count models.
    pub growth_rate: Option<f64>,
    /// Males per female.
    pub sex_ratio: f64,
    /// Assign offspring sexes in proportion to the adults instead of
    /// `sex_ratio`.
    pub keep_sex_ratio: bool,
    pub breed_model: BreedModel,
    pub selection_target: SelectionTarget,
    pub offspring_count_model: OffspringCountModel,
    pub fitness_sort_mode: FitnessSortMode,
    pub fitness_subset_size: usize,
    /// Reset adult sexes from phenotype once, at `sex_reset_generation`.
    pub sex_threshold: Option<f64>,
    pub sex_reset_generation: usize,
}

impl Default for BreedingConfig {
    fn default() -> Self {
        Self {
            mating_system: MatingSystem::default(),
            mating_proportion: 1.0,
            mating_males: 1,
            mean_fecundity: 1.0,
            growth_rate: None,
            sex_ratio: 1.0,
            keep_sex_ratio: false,
            breed_model: BreedModel::default(),
            selection_target: SelectionTarget::default(),
            offspring_count_model: OffspringCountModel::default(),
            fitness_sort_mode: FitnessSortMode::default(),
            fitness_subset_size: 1,
            sex_threshold: None,
            sex_reset_generation: 1,
        }
    }
}

/// The strategy set bound from a validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategies {
    pub mating_system: MatingSystem,
    pub topology: MatingTopology,
    pub fecundity: FecundityModel,
    pub sex_assignment: SexAssignment,
    pub breed_model: BreedModel,
    pub selection_target: SelectionTarget,
    pub sex_threshold: Option<f64>,
    pub sex_reset_generation: usize,
}

impl Strategies {
    /// Fitness biases parent choice.
    pub fn weights_parents(&self) -> bool {
        self.selection_target == SelectionTarget::Parentage && !self.breed_model.is_neutral()
    }

    /// Offspring are culled by fitness after generation.
    pub fn culls_offspring(&self) -> bool {
        self.selection_target == SelectionTarget::Offspring && !self.breed_model.is_neutral()
    }
}

impl BreedingConfig {
    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mating_proportion) {
            return Err(ConfigError::InvalidProportion(
                "mating_proportion",
                self.mating_proportion,
            ));
        }
        if self.mating_system == MatingSystem::Polygyny && self.mating_males == 0 {
            return Err(ConfigError::NoMatingMales);
        }
        if !self.mean_fecundity.is_finite() || self.mean_fecundity < 0.0 {
            return Err(ConfigError::InvalidFecundity(self.mean_fecundity));
        }
        if self.offspring_count_model.is_logistic() {
            match self.growth_rate {
                Some(r) if r.is_finite() && r > 0.0 => {}
                Some(r) => return Err(ConfigError::InvalidGrowthRate(r)),
                None => return Err(ConfigError::InvalidGrowthRate(f64::NAN)),
            }
        }
        male_proportion(self.sex_ratio)?;
        if self.fitness_subset_size == 0 {
            return Err(ConfigError::EmptyFitnessSubset);
        }
        if self.sex_threshold.is_some() && self.mating_system.is_one_sex() {
            return Err(ConfigError::SexThresholdWithoutSexes(
                self.mating_system.as_str(),
            ));
        }
        Ok(())
    }

    /// Validate and bind the strategy set.
    pub fn bind(&self) -> Result<Strategies, ConfigError> {
        self.validate()?;

        let topology = MatingTopology::new(
            self.mating_system,
            self.mating_proportion,
            self.mating_males,
            self.fitness_sort_mode,
            self.fitness_subset_size,
        );
        let sex_assignment = if self.mating_system.is_one_sex() {
            SexAssignment::Selfing
        } else if self.keep_sex_ratio {
            SexAssignment::ProportionalToAdults
        } else {
            SexAssignment::Fixed {
                male_ratio: male_proportion(self.sex_ratio)?,
            }
        };
        let fecundity = FecundityModel::new(
            self.offspring_count_model,
            self.mean_fecundity,
            self.growth_rate.unwrap_or(1.0),
        );

        Ok(Strategies {
            mating_system: self.mating_system,
            topology,
            fecundity,
            sex_assignment,
            breed_model: self.breed_model,
            selection_target: self.selection_target,
            sex_threshold: self.sex_threshold,
            sex_reset_generation: self.sex_reset_generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BreedingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mating_males, 1);
        assert_eq!(config.sex_reset_generation, 1);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = BreedingConfig::from_json_str(
            r#"{"mating_system":"selfing","mean_fecundity":3.0,"offspring_count_model":"fecundity"}"#,
        )
        .unwrap();
        assert_eq!(config.mating_system, MatingSystem::Selfing);
        assert_eq!(config.offspring_count_model, OffspringCountModel::Fecundity);
        assert_eq!(config.breed_model, BreedModel::Neutral);
    }

    #[test]
    fn test_unknown_variant_is_a_parse_error() {
        let err = BreedingConfig::from_json_str(r#"{"mating_system":"polyandry"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_values() {
        let bad = |f: fn(&mut BreedingConfig)| {
            let mut c = BreedingConfig::default();
            f(&mut c);
            c.validate().unwrap_err()
        };
        assert!(matches!(
            bad(|c| c.mating_proportion = 1.5),
            ConfigError::InvalidProportion("mating_proportion", _)
        ));
        assert!(matches!(
            bad(|c| c.mean_fecundity = -1.0),
            ConfigError::InvalidFecundity(_)
        ));
        assert!(matches!(
            bad(|c| c.sex_ratio = -0.5),
            ConfigError::InvalidSexRatio(_)
        ));
        assert_eq!(
            bad(|c| {
                c.mating_system = MatingSystem::Polygyny;
                c.mating_males = 0;
            }),
            ConfigError::NoMatingMales
        );
        assert_eq!(
            bad(|c| c.fitness_subset_size = 0),
            ConfigError::EmptyFitnessSubset
        );
    }

    #[test]
    fn test_logistic_requires_growth_rate() {
        let mut config = BreedingConfig {
            offspring_count_model: OffspringCountModel::Logistic,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGrowthRate(_))
        ));
        config.growth_rate = Some(0.0);
        assert!(config.validate().is_err());
        config.growth_rate = Some(1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sex_threshold_needs_two_sexes() {
        let config = BreedingConfig {
            mating_system: MatingSystem::RandomHermaphrodite,
            sex_threshold: Some(0.0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SexThresholdWithoutSexes("random-hermaphrodite"))
        );
    }

    #[test]
    fn test_bind_sex_assignment() {
        let one_sex = BreedingConfig {
            mating_system: MatingSystem::Selfing,
            ..Default::default()
        };
        assert_eq!(one_sex.bind().unwrap().sex_assignment, SexAssignment::Selfing);

        let fixed = BreedingConfig::default();
        assert_eq!(
            fixed.bind().unwrap().sex_assignment,
            SexAssignment::Fixed { male_ratio: 0.5 }
        );

        let keep = BreedingConfig {
            keep_sex_ratio: true,
            ..Default::default()
        };
        assert_eq!(
            keep.bind().unwrap().sex_assignment,
            SexAssignment::ProportionalToAdults
        );
    }

    #[test]
    fn test_selection_flags() {
        let mut config = BreedingConfig {
            breed_model: BreedModel::SoftPatch,
            selection_target: SelectionTarget::Parentage,
            ..Default::default()
        };
        let s = config.bind().unwrap();
        assert!(s.weights_parents());
        assert!(!s.culls_offspring());

        config.breed_model = BreedModel::Neutral;
        let s = config.bind().unwrap();
        assert!(!s.weights_parents());
        assert!(!s.culls_offspring());
    }
}
