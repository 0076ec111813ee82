//! Migration rounding, pulse determinism, and gene flow through the engine.

use demesim::demography;
use demesim::evolution::migration::{continuous_migrant_count, pulse_migrant_count};
use demesim::evolution::IntroductionEntry;
use demesim::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

#[test]
fn test_continuous_rounding_matches_expected_split() {
    // size 10 × rate 0.34 = 3.4 expected migrants: 3 guaranteed, plus one
    // more with probability 0.34. Across many seeds the split should be
    // roughly 66% threes and 34% fours.
    let trials = 2000;
    let mut threes = 0usize;
    let mut fours = 0usize;

    for seed in 0..trials {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed as u64);
        match continuous_migrant_count(10, 0.34, &mut rng) {
            3 => threes += 1,
            4 => fours += 1,
            other => panic!("unexpected migrant count {other}"),
        }
    }

    assert_eq!(threes + fours, trials);
    let three_fraction = threes as f64 / trials as f64;
    assert!(
        (0.60..=0.72).contains(&three_fraction),
        "expected ~66% three-migrant trials, got {three_fraction}"
    );
}

#[test]
fn test_pulse_count_independent_of_seed() {
    // floor(20 × 0.25) = 5 on every trial; pulse counts draw no randomness
    // at all, unlike continuous migration.
    assert_eq!(pulse_migrant_count(20, 0.25), 5);
    assert_eq!(pulse_migrant_count(21, 0.25), 5);
    assert_eq!(pulse_migrant_count(19, 0.25), 4);
}

const MIGRATION_MODEL: &str = "
demes:
  - name: source
    epochs:
      - start_size: 100
  - name: sink
    epochs:
      - start_size: 50
migrations:
  - {source: source, dest: sink, rate: 0.2}
";

const PULSE_MODEL: &str = "
demes:
  - name: source
    epochs:
      - start_size: 100
  - name: sink
    epochs:
      - start_size: 20
pulses:
  - {source: source, dest: sink, proportion: 0.25, time: 50}
";

/// Fix the source deme to carry only the marker allele by introducing it at
/// the start generation with frequency 1.0.
fn marked_source_builder(model: &str) -> SimulationBuilder {
    let graph = demography::load_str(model).unwrap();
    let start = graph.start_generation() as f64;
    SimulationBuilder::new()
        .graph(graph)
        .alleles(["wt", "marker"])
        .wild_type("wt")
        .introduction(IntroductionEntry::new("marker", "source", start).with_frequency(1.0))
}

#[test]
fn test_continuous_migration_carries_alleles_downstream() {
    let mut sim = marked_source_builder(MIGRATION_MODEL).seed(21).build().unwrap();
    sim.run();

    let history = sim.history();
    let marker = Allele::new("marker");

    // The source is fixed for the marker throughout.
    for snapshot in history.series("source").unwrap() {
        assert_eq!(snapshot.frequency(&marker), 1.0);
    }

    // Ten expected migrants per generation, all carrying the marker: gene
    // flow shows up in the sink from the very first generation.
    let first = &history.series("sink").unwrap()[0];
    assert!(first.frequency(&marker) > 0.0);

    // Sizes never change: every sink snapshot is over 50 individuals.
    for snapshot in history.series("sink").unwrap() {
        let scaled = snapshot.frequency(&marker) * 50.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}

#[test]
fn test_pulse_fires_exactly_once() {
    let mut sim = marked_source_builder(PULSE_MODEL).seed(33).build().unwrap();
    sim.run();

    let history = sim.history();
    let marker = Allele::new("marker");
    let series = history.series("sink").unwrap();

    for (index, snapshot) in series.iter().enumerate() {
        let generation = history.generation_of("sink", index).unwrap();
        if generation > 50 {
            // No gene flow of any kind before the pulse.
            assert_eq!(snapshot.frequency(&marker), 0.0);
        } else if generation == 50 {
            // Five draws with replacement overwrite between one and five of
            // the twenty sink slots.
            let frequency = snapshot.frequency(&marker);
            assert!(frequency >= 1.0 / 20.0);
            assert!(frequency <= 5.0 / 20.0);
        }
    }
}

#[test]
fn test_migration_preserves_history_alignment() {
    let mut sim = marked_source_builder(MIGRATION_MODEL).seed(2).build().unwrap();
    let start = sim.start_generation();
    sim.run();

    for deme in ["source", "sink"] {
        let series = sim.history().series(deme).unwrap();
        assert_eq!(series.len(), (start + 1) as usize);
        for snapshot in series {
            assert!((snapshot.total() - 1.0).abs() < 1e-9);
        }
    }
}
