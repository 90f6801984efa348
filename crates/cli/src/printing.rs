use metabreed_sim::prelude::*;
use serde::Serialize;

use crate::scenario::Scenario;

pub fn print_parameters(scenario: &Scenario) {
    let b = &scenario.breeding;
    println!("\n📋 Scenario");
    println!("  • Patches: {}", scenario.patches.len());
    println!("  • Generations: {} [--generations]", scenario.generations);
    match scenario.seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }

    println!("\n💞 Mating");
    println!("  • Mating System: {}", b.mating_system);
    match b.mating_system {
        MatingSystem::Selfing => println!("  • Selfing Rate: {}", b.mating_proportion),
        MatingSystem::Polygyny => {
            println!("  • Polygynous Share: {}", b.mating_proportion);
            println!("  • Designated Males: {}", b.mating_males);
        }
        _ => {}
    }
    if b.mating_system.is_one_sex() {
        println!("  • Offspring Sex: hermaphrodite");
    } else if b.keep_sex_ratio {
        println!("  • Offspring Sex: proportional to adults");
    } else {
        println!("  • Sex Ratio: {} males per female", b.sex_ratio);
    }

    println!("\n🥚 Offspring Count");
    println!("  • Model: {:?}", b.offspring_count_model);
    println!("  • Mean Fecundity: {}", b.mean_fecundity);
    if let Some(r) = b.growth_rate {
        println!("  • Growth Rate: {r}");
    }

    println!("\n⚖️  Selection");
    println!("  • Breed Model: {:?}", b.breed_model);
    println!("  • Acts On: {:?}", b.selection_target);
    println!("  • Fitness: {:?}", scenario.fitness);
    if let Some(threshold) = b.sex_threshold {
        println!(
            "  • Sex Reset: phenotype > {threshold} is male, at generation {}",
            b.sex_reset_generation
        );
    }
    println!();
}

/// Row of the per-patch summary.
#[derive(Debug, Serialize)]
pub struct PatchSummary<'a> {
    pub patch: &'a str,
    pub capacity: usize,
    pub males: usize,
    pub females: usize,
    #[serde(flatten)]
    pub stats: BreedingStats,
}

pub fn summarize(metapop: &Metapopulation) -> Vec<PatchSummary<'_>> {
    metapop
        .patches()
        .iter()
        .map(|p| PatchSummary {
            patch: p.id(),
            capacity: p.capacity(),
            males: p.size(Sex::Male, AgeClass::Adult),
            females: p.size(Sex::Female, AgeClass::Adult),
            stats: p.stats(),
        })
        .collect()
}

pub fn print_patch_table(metapop: &Metapopulation) {
    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>9} {:>8} {:>10} {:>10}",
        "patch", "K", "males", "females", "matings", "mothers", "offspring", "fecundity"
    );
    for row in summarize(metapop) {
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>9} {:>8} {:>10} {:>10.2}",
            row.patch,
            row.capacity,
            row.males,
            row.females,
            row.stats.matings,
            row.stats.mothers,
            row.stats.offspring,
            row.stats.realized_fecundity
        );
    }
}
