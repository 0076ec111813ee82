//! Timing and activation semantics of scheduled allele introductions.

use demesim::demography;
use demesim::evolution::IntroductionEntry;
use demesim::prelude::*;

const SINGLE_DEME: &str = "
demes:
  - name: pop
    epochs:
      - start_size: 100
";

const LATE_DEME_MODEL: &str = "
demes:
  - name: root
    epochs:
      - start_size: 100
  - name: late
    ancestors: [root]
    start_time: 30
    epochs:
      - start_size: 50
";

#[test]
fn test_introduction_absent_before_scheduled_generation() {
    let mut sim = SimulationBuilder::new()
        .graph(demography::load_str(SINGLE_DEME).unwrap())
        .alleles(["wt", "sweep"])
        .wild_type("wt")
        .introduction(IntroductionEntry::new("sweep", "pop", 40.0).with_frequency(1.0))
        .seed(17)
        .build()
        .unwrap();
    sim.run();

    let history = sim.history();
    let series = history.series("pop").unwrap();
    let sweep = Allele::new("sweep");

    for (index, snapshot) in series.iter().enumerate() {
        let generation = history.generation_of("pop", index).unwrap();
        if generation > 40 {
            assert_eq!(
                snapshot.frequency(&sweep),
                0.0,
                "allele present before its scheduled generation {generation}"
            );
        } else {
            // Introduced at frequency 1.0: the whole population converts,
            // and without mutation fixation is absorbing.
            assert_eq!(
                snapshot.frequency(&sweep),
                1.0,
                "allele missing from generation {generation}"
            );
        }
    }
}

#[test]
fn test_introduced_allele_joins_census_tracking() {
    let mut sim = SimulationBuilder::new()
        .graph(demography::load_str(SINGLE_DEME).unwrap())
        .alleles(["wt", "late"])
        .wild_type("wt")
        .introduction(IntroductionEntry::new("late", "pop", 25.0).with_frequency(0.2))
        .seed(8)
        .build()
        .unwrap();

    assert!(!sim.active_alleles().contains(&Allele::new("late")));
    sim.run();
    assert!(sim.active_alleles().contains(&Allele::new("late")));

    // Snapshots taken before the introduction do not track the allele;
    // snapshots from generation 25 onward do.
    let history = sim.history();
    let series = history.series("pop").unwrap();
    let late = Allele::new("late");

    for (index, snapshot) in series.iter().enumerate() {
        let generation = history.generation_of("pop", index).unwrap();
        let tracked = snapshot.alleles().any(|a| a == &late);
        assert_eq!(tracked, generation <= 25);
    }
}

#[test]
fn test_introduction_into_unborn_deme_is_skipped() {
    // Scheduled for generation 50, but the deme is only born at 30.
    let mut sim = SimulationBuilder::new()
        .graph(demography::load_str(LATE_DEME_MODEL).unwrap())
        .alleles(["wt", "m"])
        .wild_type("wt")
        .introduction(IntroductionEntry::new("m", "late", 50.0))
        .seed(4)
        .build()
        .unwrap();
    sim.run();

    // The skip is silent and the allele never activates.
    assert!(!sim.active_alleles().contains(&Allele::new("m")));
    for deme in ["root", "late"] {
        for snapshot in sim.history().series(deme).unwrap() {
            assert_eq!(snapshot.frequency(&Allele::new("m")), 0.0);
        }
    }
}

#[test]
fn test_selection_acts_from_the_introduction_generation() {
    // A strongly beneficial allele introduced into a large population rises
    // far above its injection frequency by the present.
    let mut sim = SimulationBuilder::new()
        .graph(
            demography::load_str(
                "
demes:
  - name: pop
    epochs:
      - start_size: 2000
",
            )
            .unwrap(),
        )
        .alleles(["wt", "adv"])
        .wild_type("wt")
        .selection("adv", 0.5)
        .introduction(IntroductionEntry::new("adv", "pop", 60.0).with_frequency(0.05))
        .seed(12)
        .build()
        .unwrap();
    sim.run();

    let last = sim.history().series("pop").unwrap().last().unwrap();
    let frequency = last.frequency(&Allele::new("adv"));
    assert!(
        frequency > 0.5,
        "beneficial allele only reached frequency {frequency}"
    );
}
