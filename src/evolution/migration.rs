//! Continuous and pulse migration between demes.
//!
//! Migration moves allele tags, not individuals: each migrant overwrites a
//! uniformly-random destination slot, so destination sizes are invariant
//! under gene flow. Continuous records apply every generation of their
//! active interval with a stochastically-rounded migrant count; pulses fire
//! once, at an exact generation, with a deterministic count.

use crate::base::Allele;
use crate::demography::Graph;
use crate::simulation::population::PopulationStore;
use rand::Rng;

/// Migrant count for one continuous-migration record in one generation:
/// `floor(dest_size × rate)` guaranteed migrants, plus one more with
/// probability equal to the fractional remainder (a single Bernoulli draw
/// per record per generation).
pub fn continuous_migrant_count<R: Rng + ?Sized>(
    dest_size: usize,
    rate: f64,
    rng: &mut R,
) -> usize {
    let expected = dest_size as f64 * rate;
    let mut count = expected.floor() as usize;
    let remainder = expected - expected.floor();
    if rng.random::<f64>() < remainder {
        count += 1;
    }
    count
}

/// Migrant count for a pulse: `floor(dest_size × proportion)`, with no
/// stochastic remainder.
pub fn pulse_migrant_count(dest_size: usize, proportion: f64) -> usize {
    (dest_size as f64 * proportion).floor() as usize
}

/// Apply every continuous-migration record active at `generation`, in the
/// model's listed order. Records whose source or destination is missing or
/// empty are skipped silently.
pub fn apply_continuous<R: Rng + ?Sized>(
    graph: &Graph,
    store: &mut PopulationStore,
    generation: i64,
    rng: &mut R,
) {
    for migration in graph.migrations() {
        if !migration.active_at(generation as f64) {
            continue;
        }

        let migrants = {
            let Some(source) = store.get(&migration.source) else {
                continue;
            };
            let Some(dest) = store.get(&migration.dest) else {
                continue;
            };
            if source.is_empty() || dest.is_empty() {
                continue;
            }
            let count = continuous_migrant_count(dest.size(), migration.rate, rng);
            draw_migrants(source.individuals(), count, rng)
        };

        place_migrants(store, &migration.dest, migrants, rng);
    }
}

/// Apply every pulse whose time equals `generation` exactly, after all
/// continuous migration for the generation.
pub fn apply_pulses<R: Rng + ?Sized>(
    graph: &Graph,
    store: &mut PopulationStore,
    generation: i64,
    rng: &mut R,
) {
    for pulse in graph.pulses() {
        if pulse.time as i64 != generation {
            continue;
        }

        let migrants = {
            let Some(source) = store.get(&pulse.source) else {
                continue;
            };
            let Some(dest) = store.get(&pulse.dest) else {
                continue;
            };
            if source.is_empty() || dest.is_empty() {
                continue;
            }
            let count = pulse_migrant_count(dest.size(), pulse.proportion);
            draw_migrants(source.individuals(), count, rng)
        };

        place_migrants(store, &pulse.dest, migrants, rng);
    }
}

/// Draw `count` migrant alleles uniformly, with replacement, from the
/// source population.
fn draw_migrants<R: Rng + ?Sized>(source: &[Allele], count: usize, rng: &mut R) -> Vec<Allele> {
    (0..count)
        .map(|_| source[rng.random_range(0..source.len())].clone())
        .collect()
}

/// Overwrite one uniformly-random destination slot per migrant. Later
/// migrants may overwrite earlier ones; listed-order precedence is the
/// documented tie-break.
fn place_migrants<R: Rng + ?Sized>(
    store: &mut PopulationStore,
    dest: &str,
    migrants: Vec<Allele>,
    rng: &mut R,
) {
    if migrants.is_empty() {
        return;
    }
    if let Some(dest) = store.get_mut(dest) {
        for migrant in migrants {
            let slot = rng.random_range(0..dest.size());
            dest.set(slot, migrant);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::population::Population;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    fn store(pops: &[(&str, &str, usize)]) -> PopulationStore {
        let mut store = PopulationStore::default();
        for (name, allele, size) in pops {
            store.insert(Population::new(*name, vec![Allele::new(allele); *size]));
        }
        store
    }

    #[test]
    fn test_continuous_count_exact_when_no_remainder() {
        for seed in 0..20 {
            assert_eq!(continuous_migrant_count(10, 0.2, &mut rng(seed)), 2);
        }
    }

    #[test]
    fn test_continuous_count_zero_rate() {
        assert_eq!(continuous_migrant_count(1000, 0.0, &mut rng(1)), 0);
    }

    #[test]
    fn test_continuous_count_rounds_stochastically() {
        let mut counts = [0usize; 2];
        for seed in 0..500 {
            match continuous_migrant_count(10, 0.34, &mut rng(seed)) {
                3 => counts[0] += 1,
                4 => counts[1] += 1,
                other => panic!("unexpected migrant count {other}"),
            }
        }
        assert!(counts[0] > counts[1]);
    }

    #[test]
    fn test_pulse_count_deterministic() {
        assert_eq!(pulse_migrant_count(20, 0.25), 5);
        assert_eq!(pulse_migrant_count(10, 0.0), 0);
        assert_eq!(pulse_migrant_count(7, 0.5), 3);
    }

    #[test]
    fn test_continuous_preserves_sizes() {
        let graph = crate::demography::load_str(
            r#"
demes:
  - name: a
    epochs: [{start_size: 30}]
  - name: b
    epochs: [{start_size: 50}]
migrations:
  - {source: a, dest: b, rate: 0.4}
"#,
        )
        .unwrap();
        let mut store = store(&[("a", "A", 30), ("b", "B", 50)]);

        apply_continuous(&graph, &mut store, 10, &mut rng(3));
        assert_eq!(store.get("a").unwrap().size(), 30);
        assert_eq!(store.get("b").unwrap().size(), 50);

        // Gene flow happened: destination now carries source alleles.
        let immigrants = store
            .get("b")
            .unwrap()
            .individuals()
            .iter()
            .filter(|a| a.as_str() == "A")
            .count();
        assert!(immigrants > 0);
        // Source composition is untouched.
        assert!(store
            .get("a")
            .unwrap()
            .individuals()
            .iter()
            .all(|a| a.as_str() == "A"));
    }

    #[test]
    fn test_migration_outside_interval_is_noop() {
        let graph = crate::demography::load_str(
            r#"
demes:
  - name: a
    epochs: [{start_size: 30}]
  - name: b
    epochs: [{start_size: 50}]
migrations:
  - {source: a, dest: b, rate: 0.4, start_time: 20, end_time: 10}
"#,
        )
        .unwrap();
        let mut store = store(&[("a", "A", 30), ("b", "B", 50)]);

        apply_continuous(&graph, &mut store, 50, &mut rng(3));
        assert!(store
            .get("b")
            .unwrap()
            .individuals()
            .iter()
            .all(|a| a.as_str() == "B"));
    }

    #[test]
    fn test_missing_population_skipped() {
        let graph = crate::demography::load_str(
            r#"
demes:
  - name: a
    epochs: [{start_size: 30}]
  - name: b
    epochs: [{start_size: 50}]
migrations:
  - {source: a, dest: b, rate: 0.4}
"#,
        )
        .unwrap();
        // Destination not materialized yet.
        let mut store = store(&[("a", "A", 30)]);
        apply_continuous(&graph, &mut store, 10, &mut rng(3));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_pulse_fires_only_at_exact_time() {
        let graph = crate::demography::load_str(
            r#"
demes:
  - name: a
    epochs: [{start_size: 30}]
  - name: b
    epochs: [{start_size: 20}]
pulses:
  - {source: a, dest: b, proportion: 0.25, time: 40}
"#,
        )
        .unwrap();

        let mut untouched = store(&[("a", "A", 30), ("b", "B", 20)]);
        apply_pulses(&graph, &mut untouched, 41, &mut rng(5));
        assert!(untouched
            .get("b")
            .unwrap()
            .individuals()
            .iter()
            .all(|a| a.as_str() == "B"));

        let mut hit = store(&[("a", "A", 30), ("b", "B", 20)]);
        apply_pulses(&graph, &mut hit, 40, &mut rng(5));
        let immigrants = hit
            .get("b")
            .unwrap()
            .individuals()
            .iter()
            .filter(|a| a.as_str() == "A")
            .count();
        // Five draws with replacement overwrite at least one slot.
        assert!((1..=5).contains(&immigrants));
        assert_eq!(hit.get("b").unwrap().size(), 20);
    }
}
