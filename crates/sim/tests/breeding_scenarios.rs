//! Integration tests for complete breeding cycles.

use metabreed_sim::evolution::MatingSystem;
use metabreed_sim::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashSet;

/// Helper to build a patch with `males` and `females` founders whose
/// phenotypes spread evenly around zero.
fn patch(id: &str, capacity: usize, males: usize, females: usize) -> Patch {
    let mut patch = Patch::new(id, capacity);
    for i in 0..males {
        patch.add_adult(Individual::new(format!("{id}_m{i}"), Sex::Male, i as f64 * 0.1));
    }
    for i in 0..females {
        patch.add_adult(Individual::new(format!("{id}_f{i}"), Sex::Female, -(i as f64) * 0.1));
    }
    patch
}

fn offspring(patch: &Patch) -> Vec<&Individual> {
    Sex::ALL
        .into_iter()
        .flat_map(|sex| patch.individuals(sex, AgeClass::Offspring))
        .collect()
}

fn rng(seed: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

#[test]
fn test_selfing_deterministic_fecundity() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Selfing)
        .offspring_count(OffspringCountModel::Fecundity)
        .mean_fecundity(3.0)
        .build()
        .unwrap();
    let mut metapop = Metapopulation::new(vec![patch("p", 100, 0, 10)]);
    breeder.breed(&mut metapop, &mut rng(1)).unwrap();

    let p = metapop.patch(0).unwrap();
    assert_eq!(p.size(Sex::Female, AgeClass::Offspring), 30);
    assert_eq!(p.size(Sex::Male, AgeClass::Offspring), 0);
    assert!(offspring(p)
        .iter()
        .all(|c| c.parents().is_some_and(|pa| pa.is_selfed())));
}

#[test]
fn test_promiscuity_carrying_capacity() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .build()
        .unwrap();
    let mut metapop = Metapopulation::new(vec![patch("p", 20, 4, 6)]);
    breeder.breed(&mut metapop, &mut rng(2)).unwrap();
    assert_eq!(metapop.size_of_age(AgeClass::Offspring), 20);
}

#[test]
fn test_keep_number_conserves_sexes() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::KeepNumber)
        .sex_ratio(1.0)
        .build()
        .unwrap();
    for seed in 0..50 {
        let mut metapop = Metapopulation::new(vec![patch("p", 20, 3, 5)]);
        breeder.breed(&mut metapop, &mut rng(seed)).unwrap();
        let p = metapop.patch(0).unwrap();
        assert_eq!(
            p.size(Sex::Male, AgeClass::Offspring) + p.size(Sex::Female, AgeClass::Offspring),
            8
        );
    }
}

#[test]
fn test_monogamy_only_paired_females_reproduce() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Monogamy)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .build()
        .unwrap();
    let mut metapop = Metapopulation::new(vec![patch("p", 50, 2, 5)]);
    breeder.breed(&mut metapop, &mut rng(3)).unwrap();

    let p = metapop.patch(0).unwrap();
    let mothers: HashSet<&str> = offspring(p)
        .iter()
        .filter_map(|c| c.parents().map(|pa| &*pa.mother))
        .collect();
    let fathers: HashSet<&str> = offspring(p)
        .iter()
        .filter_map(|c| c.parents().map(|pa| &*pa.father))
        .collect();
    assert_eq!(mothers.len(), 2);
    assert_eq!(fathers.len(), 2);
    assert_eq!(p.stats().mothers, 2);
    assert_eq!(p.stats().matings, 2);
}

#[test]
fn test_no_females_no_offspring_for_every_system() {
    for system in [
        MatingSystem::RandomHermaphrodite,
        MatingSystem::Selfing,
        MatingSystem::Promiscuity,
        MatingSystem::Polygyny,
        MatingSystem::Monogamy,
    ] {
        let males = if system.is_one_sex() { 0 } else { 5 };
        let breeder = BreederBuilder::new()
            .mating_system(system)
            .offspring_count(OffspringCountModel::CarryingCapacity)
            .build()
            .unwrap();
        let mut p = patch("p", 20, males, 0);
        p.add_offspring(Individual::new("leftover", Sex::Female, 0.0));
        let mut metapop = Metapopulation::new(vec![p]);
        breeder.breed(&mut metapop, &mut rng(4)).unwrap();
        assert_eq!(metapop.size_of_age(AgeClass::Offspring), 0, "{system}");
        assert_eq!(metapop.size_of_age(AgeClass::Adult), males, "{system}");
    }
}

#[test]
fn test_offspring_and_parentage_families_agree_when_neutral() {
    let build = |target| {
        BreederBuilder::new()
            .mating_system(MatingSystem::Promiscuity)
            .offspring_count(OffspringCountModel::FecundityStochastic)
            .mean_fecundity(2.5)
            .selection(BreedModel::Neutral, target)
            .build()
            .unwrap()
    };
    let family_a = build(SelectionTarget::Offspring);
    let family_b = build(SelectionTarget::Parentage);

    let runs = 400;
    let mean_count = |breeder: &Breeder, seed_base: u64| {
        let total: usize = (0..runs)
            .map(|r| {
                let mut metapop = Metapopulation::new(vec![patch("p", 100, 4, 8)]);
                breeder.breed(&mut metapop, &mut rng(seed_base + r)).unwrap();
                metapop.size_of_age(AgeClass::Offspring)
            })
            .sum();
        total as f64 / runs as f64
    };
    let a = mean_count(&family_a, 0);
    let b = mean_count(&family_b, 10_000);
    // expected 20, Poisson sd of the mean ~ 0.22
    assert!((a - 20.0).abs() < 1.0, "family A mean {a}");
    assert!((b - 20.0).abs() < 1.0, "family B mean {b}");
}

#[test]
fn test_same_seed_same_result_across_thread_counts() {
    let run = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut breeder = BreederBuilder::new()
                .mating_system(MatingSystem::Polygyny)
                .mating_proportion(0.5)
                .mating_males(2)
                .offspring_count(OffspringCountModel::LogisticStochastic)
                .growth_rate(1.8)
                .selection(BreedModel::SoftMetapop, SelectionTarget::Offspring)
                .fitness(FitnessModel::Stabilizing { width: 1.0 })
                .inheritance(Box::new(MidParent::new(0.2).unwrap()))
                .build()
                .unwrap();
            let patches = (0..8).map(|i| patch(&format!("p{i}"), 40, 10, 10)).collect();
            let mut metapop = Metapopulation::new(patches);
            let mut rng = rng(99);
            breeder.run_for(&mut metapop, 3, &mut rng).unwrap();
            metapop
                .patches()
                .iter()
                .flat_map(|p| {
                    Sex::ALL
                        .into_iter()
                        .flat_map(move |s| p.individuals(s, AgeClass::Adult))
                        .map(|ind| (ind.id().to_string(), ind.phenotype().to_bits()))
                })
                .collect::<Vec<_>>()
        })
    };
    let single = run(1);
    assert!(!single.is_empty());
    assert_eq!(single, run(4));
}

#[test]
fn test_sex_reset_happens_once() {
    let mut breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .sex_threshold(0.0, 1)
        .build()
        .unwrap();
    let mut p = Patch::new("p", 10);
    p.add_adult(Individual::new("a", Sex::Female, 1.0));
    p.add_adult(Individual::new("b", Sex::Male, -1.0));
    let mut metapop = Metapopulation::new(vec![p]);
    breeder.init(&metapop).unwrap();

    // not the reset generation
    breeder.before_generation(&mut metapop, 0);
    assert!(!breeder.sex_reset_done());

    breeder.before_generation(&mut metapop, 1);
    assert!(breeder.sex_reset_done());
    let p = metapop.patch(0).unwrap();
    assert_eq!(p.get(Sex::Male, AgeClass::Adult, 0).unwrap().id(), "a");
    assert_eq!(p.get(Sex::Female, AgeClass::Adult, 0).unwrap().id(), "b");

    metapop.patches_mut()[0].add_adult(Individual::new("c", Sex::Male, -5.0));
    breeder.before_generation(&mut metapop, 1);
    assert_eq!(metapop.patch(0).unwrap().size(Sex::Male, AgeClass::Adult), 2);
}

#[test]
fn test_fixed_sex_ratio_statistics() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .sex_ratio(1.0)
        .build()
        .unwrap();
    let mut metapop = Metapopulation::new(vec![patch("p", 10_000, 1, 1)]);
    breeder.breed(&mut metapop, &mut rng(5)).unwrap();
    let p = metapop.patch(0).unwrap();
    let sons = p.size(Sex::Male, AgeClass::Offspring);
    assert_eq!(sons + p.size(Sex::Female, AgeClass::Offspring), 10_000);
    // sd = 50
    assert!((sons as i64 - 5_000).abs() < 250, "sons = {sons}");
}

#[test]
fn test_hard_selection_on_parentage_thins_offspring() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .selection(BreedModel::Hard, SelectionTarget::Parentage)
        .fitness(FitnessModel::Stabilizing { width: 1.0 })
        .build()
        .unwrap();
    // every adult sits one width from the optimum: mean fitness exp(-1/2)
    let mut p = Patch::new("p", 1_000).with_optimum(1.0);
    for i in 0..5 {
        p.add_adult(Individual::new(format!("m{i}"), Sex::Male, 0.0));
        p.add_adult(Individual::new(format!("f{i}"), Sex::Female, 2.0));
    }
    let mut metapop = Metapopulation::new(vec![p]);
    breeder.breed(&mut metapop, &mut rng(6)).unwrap();
    let n = metapop.size_of_age(AgeClass::Offspring) as f64;
    let expected = 1_000.0 * (-0.5f64).exp();
    assert!((n - expected).abs() < 60.0, "n = {n}");
}

#[test]
fn test_soft_metapop_favours_fitter_patch() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::Fecundity)
        .mean_fecundity(10.0)
        .selection(BreedModel::SoftMetapop, SelectionTarget::Offspring)
        .fitness(FitnessModel::Stabilizing { width: 1.0 })
        .build()
        .unwrap();
    let good = patch("good", 50, 10, 10).with_optimum(0.0);
    let bad = patch("bad", 50, 10, 10).with_optimum(3.0);
    let mut metapop = Metapopulation::new(vec![good, bad]);
    breeder.breed(&mut metapop, &mut rng(7)).unwrap();

    let good_n = metapop.patch(0).unwrap().size_of_age(AgeClass::Offspring);
    let bad_n = metapop.patch(1).unwrap().size_of_age(AgeClass::Offspring);
    assert!(good_n <= 50);
    assert!(good_n > bad_n, "good {good_n}, bad {bad_n}");
}

#[test]
fn test_breeder_as_lifecycle_event() {
    let mut event: Box<dyn LifeCycleEvent> = Box::new(
        BreederBuilder::new()
            .mating_system(MatingSystem::RandomHermaphrodite)
            .offspring_count(OffspringCountModel::KeepNumber)
            .build()
            .unwrap(),
    );
    let mut metapop = Metapopulation::new(vec![patch("a", 10, 0, 6), patch("b", 10, 0, 0)]);
    event.init(&metapop).unwrap();
    event.before_generation(&mut metapop, 1);
    event.execute(&mut metapop, &mut rng(8)).unwrap();

    assert_eq!(metapop.patch(0).unwrap().size_of_age(event.added_age_class()), 6);
    assert_eq!(metapop.patch(1).unwrap().size_of_age(AgeClass::Offspring), 0);
    assert_eq!(metapop.patch(1).unwrap().stats(), BreedingStats::default());
}

#[test]
fn test_soft_metapop_parentage_scales_and_caps_offspring() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Promiscuity)
        .offspring_count(OffspringCountModel::Fecundity)
        .mean_fecundity(10.0)
        .selection(BreedModel::SoftMetapop, SelectionTarget::Parentage)
        .fitness(FitnessModel::Stabilizing { width: 1.0 })
        .build()
        .unwrap();
    // 100 offspring drawn per patch, capacity 50
    let good = patch("good", 50, 10, 10).with_optimum(0.0);
    let bad = patch("bad", 50, 10, 10).with_optimum(3.0);
    let mut metapop = Metapopulation::new(vec![good, bad]);
    breeder.breed(&mut metapop, &mut rng(11)).unwrap();

    let good = metapop.patch(0).unwrap();
    let bad = metapop.patch(1).unwrap();
    let good_n = good.size_of_age(AgeClass::Offspring);
    let bad_n = bad.size_of_age(AgeClass::Offspring);
    assert_eq!(good_n, 50);
    assert!(bad_n < good_n, "good {good_n}, bad {bad_n}");
    assert_eq!(good.stats().offspring, good_n);
    assert_eq!(bad.stats().offspring, bad_n);
}

#[test]
fn test_weighted_monogamy_never_pairs_lethal_male() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Monogamy)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .selection(BreedModel::SoftPatch, SelectionTarget::Parentage)
        .fitness(FitnessModel::Stabilizing { width: 0.1 })
        .build()
        .unwrap();

    for seed in 0..10 {
        let mut p = Patch::new("p", 50);
        p.add_adult(Individual::new("m0", Sex::Male, 0.0));
        p.add_adult(Individual::new("m1", Sex::Male, 0.0));
        // far from the optimum: zero fitness
        p.add_adult(Individual::new("lethal", Sex::Male, 100.0));
        p.add_adult(Individual::new("f0", Sex::Female, 0.0));
        p.add_adult(Individual::new("f1", Sex::Female, 0.0));
        let mut metapop = Metapopulation::new(vec![p]);
        breeder.breed(&mut metapop, &mut rng(seed)).unwrap();

        let p = metapop.patch(0).unwrap();
        let fathers: HashSet<&str> = offspring(p)
            .into_iter()
            .filter_map(|c| c.parents())
            .map(|pa| &*pa.father)
            .collect();
        assert_eq!(p.size_of_age(AgeClass::Offspring), 50);
        assert!(!fathers.contains("lethal"), "seed {seed}: {fathers:?}");
        assert_eq!(p.stats().matings, 2);
    }
}

#[test]
fn test_weighted_polygyny_draws_fathers_from_fittest_subset() {
    let breeder = BreederBuilder::new()
        .mating_system(MatingSystem::Polygyny)
        .mating_males(2)
        .offspring_count(OffspringCountModel::CarryingCapacity)
        .selection(BreedModel::SoftPatch, SelectionTarget::Parentage)
        .fitness_sort(FitnessSortMode::FittestSubset, 3)
        .fitness(FitnessModel::Stabilizing { width: 1.0 })
        .build()
        .unwrap();

    // male fitness falls with index, so the fittest three are m0..m2
    let top: HashSet<&str> = ["p_m0", "p_m1", "p_m2"].into_iter().collect();
    let mut seen: HashSet<String> = HashSet::new();
    for seed in 0..20 {
        let mut metapop = Metapopulation::new(vec![patch("p", 40, 6, 8)]);
        breeder.breed(&mut metapop, &mut rng(seed)).unwrap();

        let p = metapop.patch(0).unwrap();
        let fathers: HashSet<&str> = offspring(p)
            .into_iter()
            .filter_map(|c| c.parents())
            .map(|pa| &*pa.father)
            .collect();
        assert!(fathers.len() <= 2, "seed {seed}: {fathers:?}");
        assert!(fathers.is_subset(&top), "seed {seed}: {fathers:?}");
        seen.extend(fathers.into_iter().map(str::to_string));
    }
    assert_eq!(seen.len(), 3);
}
