//! The generation-stepping simulation engine.
//!
//! This module drives one simulation from the oldest generation down to the
//! present, applying a fixed six-phase pipeline per generation: deme
//! initialization, allele injection, selection, mutation, migration
//! (continuous then pulse), and census. The phase order is semantic:
//! mutation must see the exact post-selection cohort, migration the exact
//! post-mutation cohort, and the census the exact post-migration cohort.

use crate::base::{ActiveAlleles, Allele, FitnessTable};
use crate::demography::{Deme, Graph};
use crate::evolution::{migration, mutation, selection, IntroductionSchedule};
use crate::simulation::history::History;
use crate::simulation::parameters::SimulationParameters;
use crate::simulation::population::{Population, PopulationStore};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Offset subtracted from the generation number when querying deme sizes,
/// so the lookup lands strictly inside the epoch covering the generation
/// rather than on a boundary shared with the previous epoch.
const SIZE_QUERY_EPSILON: f64 = 1e-5;

/// Main simulation engine.
///
/// One instance owns all mutable run state (population store, history,
/// RNG), so independent replicate instances can run concurrently without
/// coordination. A run is atomic: `run` drives every generation to
/// completion and is not resumable mid-generation.
#[derive(Debug)]
pub struct Simulation {
    /// Read-only demographic schedule
    graph: Graph,
    /// Fixed per-run parameters
    params: SimulationParameters,
    /// Precomputed weights for every allele that can ever exist
    fitness: FitnessTable,
    /// Resolved founding allele distribution
    initial_frequencies: Vec<(Allele, f64)>,
    /// Generation-indexed allele introductions
    introductions: IntroductionSchedule,
    /// Alleles the census and mutation phases currently track
    active: ActiveAlleles,
    /// Working memory: one allele sequence per born deme
    store: PopulationStore,
    /// Output artifact: per-deme frequency series
    history: History,
    /// Random number generator (Xoshiro256++, one per instance)
    rng: Xoshiro256PlusPlus,
    /// Oldest generation of the run, inclusive
    start_generation: i64,
}

impl Simulation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        graph: Graph,
        params: SimulationParameters,
        fitness: FitnessTable,
        initial_frequencies: Vec<(Allele, f64)>,
        introductions: IntroductionSchedule,
        active: ActiveAlleles,
        rng: Xoshiro256PlusPlus,
    ) -> Self {
        let start_generation = graph.start_generation();
        Self {
            graph,
            params,
            fitness,
            initial_frequencies,
            introductions,
            active,
            store: PopulationStore::default(),
            history: History::default(),
            rng,
            start_generation,
        }
    }

    /// The oldest generation this run simulates.
    pub fn start_generation(&self) -> i64 {
        self.start_generation
    }

    /// The demographic schedule driving this run.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Alleles currently tracked by census and mutation.
    pub fn active_alleles(&self) -> &ActiveAlleles {
        &self.active
    }

    /// The frequency history recorded so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Consume the simulation and return its history.
    pub fn into_history(self) -> History {
        self.history
    }

    /// Run every generation from the oldest down to 0, inclusive, and
    /// return the recorded history.
    pub fn run(&mut self) -> &History {
        for generation in (0..=self.start_generation).rev() {
            self.step(generation);
        }
        &self.history
    }

    /// Advance one generation through the six-phase pipeline.
    fn step(&mut self, generation: i64) {
        // 1. Materialize demes born this generation.
        self.initialize_demes(generation);

        // 2. Inject scheduled alleles.
        self.introductions
            .apply_at(generation, &mut self.store, &mut self.active, &mut self.rng);

        // 3-4. Selection then mutation, deme by deme in graph order.
        self.evolve(generation);

        // 5. Continuous migration, then pulses.
        migration::apply_continuous(&self.graph, &mut self.store, generation, &mut self.rng);
        migration::apply_pulses(&self.graph, &mut self.store, generation, &mut self.rng);

        // 6. Census every deme known to have existed, extinct ones included.
        self.census();
    }

    fn initialize_demes(&mut self, generation: i64) {
        for deme in self.graph.demes() {
            if !deme.starts_at(generation, self.start_generation) {
                continue;
            }
            if self.store.contains(deme.name()) {
                continue;
            }

            let size = deme.initial_size().floor() as usize;
            let individuals = if deme.ancestors().is_empty() {
                founder_individuals(&self.initial_frequencies, size, &mut self.rng)
            } else {
                descend_from_ancestors(
                    &self.store,
                    deme,
                    size,
                    &self.params.wild_type,
                    &self.active,
                    &mut self.rng,
                )
            };

            self.store.insert(Population::new(deme.name(), individuals));
            self.history.open_series(deme.name());
        }
    }

    fn evolve(&mut self, generation: i64) {
        let query_time = (generation as f64 - SIZE_QUERY_EPSILON).max(0.0);

        for deme in self.graph.demes() {
            let Some(population) = self.store.get_mut(deme.name()) else {
                continue;
            };

            let target_size = deme.size_at(query_time).floor() as usize;
            if target_size == 0 {
                population.set_individuals(Vec::new());
                continue;
            }
            if population.is_empty() {
                // Extinct stays extinct; the size function alone cannot
                // resurrect a population.
                continue;
            }

            let next = selection::resample(
                population.individuals(),
                &self.fitness,
                target_size,
                &mut self.rng,
            );
            population.set_individuals(next);

            mutation::mutate(
                population.individuals_mut(),
                self.params.mutation_rate,
                &self.params.wild_type,
                &self.active,
                &mut self.rng,
            );
        }
    }

    fn census(&mut self) {
        for deme in self.graph.demes() {
            let Some(population) = self.store.get(deme.name()) else {
                continue;
            };
            let snapshot = population.frequencies(&self.active);
            self.history.append(deme.name(), snapshot);
        }
    }
}

/// Found a root population by weighted sampling from the configured initial
/// allele distribution.
fn founder_individuals<R: Rng + ?Sized>(
    initial_frequencies: &[(Allele, f64)],
    size: usize,
    rng: &mut R,
) -> Vec<Allele> {
    if size == 0 || initial_frequencies.is_empty() {
        return Vec::new();
    }
    let weights: Vec<f64> = initial_frequencies.iter().map(|(_, f)| *f).collect();
    let dist = match WeightedIndex::new(&weights) {
        Ok(dist) => dist,
        Err(_) => return Vec::new(),
    };
    (0..size)
        .map(|_| initial_frequencies[dist.sample(rng)].0.clone())
        .collect()
}

/// Found a descendant population by sampling each ancestor's current state
/// in proportion to the configured ancestry split.
fn descend_from_ancestors<R: Rng + ?Sized>(
    store: &PopulationStore,
    deme: &Deme,
    size: usize,
    wild_type: &Allele,
    active: &ActiveAlleles,
    rng: &mut R,
) -> Vec<Allele> {
    let mut individuals = Vec::with_capacity(size);

    for (ancestor, proportion) in deme.ancestors().iter().zip(deme.proportions()) {
        let Some(source) = store.get(ancestor) else {
            continue;
        };
        let count = (size as f64 * proportion) as usize;
        if source.is_empty() {
            individuals.extend(std::iter::repeat_with(|| wild_type.clone()).take(count));
        } else {
            for _ in 0..count {
                let slot = rng.random_range(0..source.size());
                individuals.push(source.individuals()[slot].clone());
            }
        }
    }

    // Per-ancestor floors can leave a shortfall; top it up from the first
    // ancestor, falling back to a uniform draw over active alleles.
    while individuals.len() < size {
        let primary = deme
            .ancestors()
            .first()
            .and_then(|name| store.get(name))
            .filter(|p| !p.is_empty());
        match primary {
            Some(source) => {
                let slot = rng.random_range(0..source.size());
                individuals.push(source.individuals()[slot].clone());
            }
            None => {
                let alleles: Vec<&Allele> = active.iter().collect();
                if alleles.is_empty() {
                    individuals.push(wild_type.clone());
                } else {
                    individuals.push(alleles[rng.random_range(0..alleles.len())].clone());
                }
            }
        }
    }

    // Interleave the ancestor contributions.
    individuals.shuffle(rng);
    individuals
}
