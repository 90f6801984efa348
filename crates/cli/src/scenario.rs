use anyhow::{Context, Result};
use metabreed_sim::evolution::FitnessModel;
use metabreed_sim::genome::MidParent;
use metabreed_sim::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::defaults;

/// A runnable scenario: breeding parameters, founders and run length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub breeding: BreedingConfig,
    pub patches: Vec<PatchSpec>,
    #[serde(default)]
    pub fitness: FitnessModel,
    /// Standard deviation of offspring phenotypes around the mid-parent value.
    #[serde(default)]
    pub segregation_sd: f64,
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_generations() -> usize {
    defaults::GENERATIONS
}

/// Founders of one patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchSpec {
    #[serde(default)]
    pub id: Option<String>,
    pub capacity: usize,
    pub males: usize,
    pub females: usize,
    #[serde(default)]
    pub optimum: f64,
    #[serde(default)]
    pub phenotype_mean: f64,
    #[serde(default)]
    pub phenotype_sd: f64,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scenario file {}", path.display()))?;
        Ok(scenario)
    }

    /// Default scenario written by `metabreed init`.
    pub fn template() -> Self {
        Self {
            breeding: BreedingConfig {
                offspring_count_model: OffspringCountModel::LogisticStochastic,
                growth_rate: Some(defaults::GROWTH_RATE),
                mean_fecundity: defaults::MEAN_FECUNDITY,
                breed_model: BreedModel::SoftPatch,
                ..Default::default()
            },
            patches: (0..defaults::PATCHES)
                .map(|i| PatchSpec {
                    id: Some(format!("patch{i}")),
                    capacity: defaults::CAPACITY,
                    males: defaults::CAPACITY / 2,
                    females: defaults::CAPACITY / 2,
                    optimum: i as f64 * 0.5,
                    phenotype_mean: 0.0,
                    phenotype_sd: 1.0,
                })
                .collect(),
            fitness: FitnessModel::Stabilizing {
                width: defaults::FITNESS_WIDTH,
            },
            segregation_sd: 0.5,
            generations: defaults::GENERATIONS,
            seed: Some(defaults::SEED),
        }
    }

    /// Validate every part of the scenario and assemble the breeder.
    pub fn breeder(&self) -> Result<Breeder> {
        if self.patches.is_empty() {
            anyhow::bail!("Scenario defines no patches");
        }
        for (i, entry) in self.patches.iter().enumerate() {
            if !entry.phenotype_sd.is_finite() || entry.phenotype_sd < 0.0 {
                anyhow::bail!(
                    "Patch {i}: phenotype_sd must be finite and >= 0.0 (got {})",
                    entry.phenotype_sd
                );
            }
        }
        let inheritance =
            MidParent::new(self.segregation_sd).context("Invalid segregation_sd")?;
        let breeder = BreederBuilder::from_config(self.breeding.clone())
            .fitness(self.fitness.clone())
            .inheritance(Box::new(inheritance))
            .build()
            .context("Invalid breeding configuration")?;
        Ok(breeder)
    }

    /// Create the founder metapopulation. Phenotypes are drawn from
    /// Normal(`phenotype_mean`, `phenotype_sd`) per patch.
    pub fn metapopulation<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Metapopulation> {
        let mut patches = Vec::with_capacity(self.patches.len());
        for (i, entry) in self.patches.iter().enumerate() {
            let id = entry.id.clone().unwrap_or_else(|| format!("patch{i}"));
            let dist = Normal::new(entry.phenotype_mean, entry.phenotype_sd)
                .with_context(|| format!("Patch {id}: invalid phenotype distribution"))?;
            let mut patch = Patch::new(id.as_str(), entry.capacity).with_optimum(entry.optimum);
            for (sex, count) in [(Sex::Male, entry.males), (Sex::Female, entry.females)] {
                for j in 0..count {
                    let name = format!("{id}_{}{j}", &sex.as_str()[..1]);
                    patch.add_adult(Individual::new(name, sex, dist.sample(rng)));
                }
            }
            patches.push(patch);
        }
        Ok(Metapopulation::new(patches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_minimal_scenario_uses_defaults() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"patches":[{"capacity":10,"males":2,"females":3}]}"#)
                .unwrap();
        assert_eq!(scenario.generations, defaults::GENERATIONS);
        assert!(scenario.seed.is_none());
        assert!(scenario.breeder().is_ok());

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let metapop = scenario.metapopulation(&mut rng).unwrap();
        let patch = metapop.patch(0).unwrap();
        assert_eq!(patch.id(), "patch0");
        assert_eq!(patch.size(Sex::Male, AgeClass::Adult), 2);
        assert_eq!(patch.size(Sex::Female, AgeClass::Adult), 3);
    }

    #[test]
    fn test_template_is_valid() {
        let scenario = Scenario::template();
        assert!(scenario.breeder().is_ok());
        let json = serde_json::to_string(&scenario).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(back.patches.len(), defaults::PATCHES);
    }

    #[test]
    fn test_empty_scenario_rejected() {
        let scenario: Scenario = serde_json::from_str(r#"{"patches":[]}"#).unwrap();
        assert!(scenario.breeder().is_err());
    }
}
