use anyhow::Result;
use metabreed_sim::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::Path;

use crate::scenario::Scenario;

pub fn validate_scenario(config: &Path) -> Result<()> {
    println!("🔍 Validating scenario: {}", config.display());

    let scenario = Scenario::load(config)?;
    println!("✓ Parse: OK");

    let mut breeder = scenario.breeder()?;
    println!("✓ Breeding configuration: OK ({} mating)", scenario.breeding.mating_system);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(scenario.seed.unwrap_or_default());
    let metapop = scenario.metapopulation(&mut rng)?;
    breeder.init(&metapop)?;
    println!(
        "✓ Founders: OK ({} patches, {} adults)",
        metapop.num_patches(),
        metapop.size_of_age(AgeClass::Adult)
    );

    let one_sex = scenario.breeding.mating_system.is_one_sex();
    let idle: Vec<&str> = metapop
        .patches()
        .iter()
        .filter(|p| {
            p.size(Sex::Female, AgeClass::Adult) == 0
                || (!one_sex && p.size(Sex::Male, AgeClass::Adult) == 0)
        })
        .map(|p| p.id())
        .collect();
    if idle.is_empty() {
        println!("✓ Mating: possible in every patch");
    } else {
        println!("⚠️  No mating possible in: {}", idle.join(", "));
    }

    println!("\n✓ Validation complete");
    Ok(())
}
