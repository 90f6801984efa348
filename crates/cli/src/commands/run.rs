use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use metabreed_sim::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::Path;

use crate::printing::{print_parameters, print_patch_table, summarize};
use crate::scenario::Scenario;

pub fn run_scenario(
    config: &Path,
    generations_override: Option<usize>,
    seed_override: Option<u64>,
    show_progress: bool,
    json: bool,
) -> Result<()> {
    let mut scenario = Scenario::load(config)?;
    if let Some(generations) = generations_override {
        scenario.generations = generations;
    }
    if seed_override.is_some() {
        scenario.seed = seed_override;
    }
    // always report the seed actually used
    let seed = scenario.seed.unwrap_or_else(|| rand::rng().random());
    scenario.seed = Some(seed);

    if !json {
        println!("🧬 metabreed - Running Scenario");
        println!("============================================");
        print_parameters(&scenario);
    }

    let mut breeder = scenario.breeder()?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut metapop = scenario.metapopulation(&mut rng)?;
    breeder
        .init(&metapop)
        .context("Scenario is incompatible with the breeding configuration")?;

    let pb = if show_progress && !json {
        let pb = ProgressBar::new(scenario.generations as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    for _ in 0..scenario.generations {
        let generation = metapop.generation() + 1;
        breeder
            .step(&mut metapop, &mut rng)
            .with_context(|| format!("Generation {generation} failed"))?;
        info!(
            "Generation {generation}: {} adults",
            metapop.size_of_age(AgeClass::Adult)
        );
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    if json {
        let out = serde_json::to_string_pretty(&summarize(&metapop))
            .context("Failed to serialize summary")?;
        println!("{out}");
    } else {
        println!("\n✓ Scenario complete!");
        println!("  Final generation: {}", metapop.generation());
        println!("  Adults: {}\n", metapop.size_of_age(AgeClass::Adult));
        print_patch_table(&metapop);
    }

    Ok(())
}
