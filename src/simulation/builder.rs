//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for configuring and creating simulations with
//! sensible defaults and comprehensive validation. Every configuration
//! error is rejected here, before the generation loop starts; the engine
//! itself performs no fallible calls.

use crate::base::{ActiveAlleles, Allele, FitnessTable};
use crate::demography::Graph;
pub use crate::errors::BuilderError;
use crate::evolution::{IntroductionEntry, IntroductionSchedule};
use crate::simulation::engine::Simulation;
use crate::simulation::parameters::{InitialFrequency, SimulationParameters};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashMap;

/// Builder for constructing [`Simulation`] instances.
///
/// # Examples
///
/// ```
/// use demesim::demography;
/// use demesim::simulation::SimulationBuilder;
///
/// let graph = demography::load_str(
///     "
/// demes:
///   - name: pop
///     epochs:
///       - start_size: 500
/// ",
/// )
/// .unwrap();
///
/// let mut sim = SimulationBuilder::new()
///     .graph(graph)
///     .alleles(["wt", "mutant"])
///     .wild_type("wt")
///     .initial_frequency(0.9)
///     .mutation_rate(0.001)
///     .selection("mutant", 0.05)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let history = sim.run();
/// assert!(history.series("pop").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    graph: Option<Graph>,
    alleles: Vec<Allele>,
    initial_frequency: InitialFrequency,
    mutation_rate: f64,
    wild_type: Option<Allele>,
    selection_coefficients: HashMap<Allele, f64>,
    introductions: Vec<IntroductionEntry>,
    seed: Option<u64>,
}

impl SimulationBuilder {
    /// Create a builder with default values: alleles `0`/`1`, wild type
    /// `0`, initial frequency 0.5, no mutation, no selection, no
    /// introductions, entropy-seeded RNG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the demographic graph (required).
    pub fn graph(mut self, graph: Graph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Set the full potential-allele set: every allele that can ever exist,
    /// active now or introduced later.
    pub fn alleles<A: Into<Allele>>(mut self, alleles: impl IntoIterator<Item = A>) -> Self {
        self.alleles = alleles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the initial allele-frequency distribution for founding demes.
    pub fn initial_frequency(mut self, frequency: impl Into<InitialFrequency>) -> Self {
        self.initial_frequency = frequency.into();
        self
    }

    /// Set the shared forward/backward mutation probability (default 0.0).
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the wild-type allele (default `0`).
    pub fn wild_type(mut self, allele: impl Into<Allele>) -> Self {
        self.wild_type = Some(allele.into());
        self
    }

    /// Set one allele's selection coefficient (fitness `max(0, 1 + s)`).
    pub fn selection(mut self, allele: impl Into<Allele>, coefficient: f64) -> Self {
        self.selection_coefficients
            .insert(allele.into(), coefficient);
        self
    }

    /// Set all selection coefficients at once.
    pub fn selection_coefficients(mut self, coefficients: HashMap<Allele, f64>) -> Self {
        self.selection_coefficients = coefficients;
        self
    }

    /// Add one scheduled allele introduction.
    pub fn introduction(mut self, entry: IntroductionEntry) -> Self {
        self.introductions.push(entry);
        self
    }

    /// Add several scheduled allele introductions.
    pub fn introductions(
        mut self,
        entries: impl IntoIterator<Item = IntroductionEntry>,
    ) -> Self {
        self.introductions.extend(entries);
        self
    }

    /// Set the RNG seed for a reproducible run.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and build the simulation.
    pub fn build(self) -> Result<Simulation, BuilderError> {
        let graph = self.graph.ok_or(BuilderError::MissingGraph)?;

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(BuilderError::InvalidMutationRate(self.mutation_rate));
        }

        let potential = if self.alleles.is_empty() {
            vec![Allele::new("0"), Allele::new("1")]
        } else {
            self.alleles
        };
        let wild_type = self.wild_type.unwrap_or_else(|| potential[0].clone());
        if !potential.contains(&wild_type) {
            return Err(BuilderError::UnknownWildType(wild_type.to_string()));
        }

        for entry in &self.introductions {
            if !potential.contains(&entry.allele) {
                return Err(BuilderError::UnknownIntroductionAllele(
                    entry.allele.to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&entry.initial_frequency) {
                return Err(BuilderError::InvalidFrequency {
                    allele: entry.allele.to_string(),
                    value: entry.initial_frequency,
                });
            }
            if !entry.start_time.is_finite() || entry.start_time < 0.0 {
                return Err(BuilderError::InvalidIntroductionTime {
                    allele: entry.allele.to_string(),
                    time: entry.start_time,
                });
            }
        }

        let introductions = IntroductionSchedule::new(self.introductions);

        // Scheduled-future alleles start inactive; they enter the active
        // set through the injection phase only.
        let scheduled = introductions.scheduled_alleles();
        let active = ActiveAlleles::new(
            potential
                .iter()
                .filter(|allele| !scheduled.contains(allele))
                .cloned(),
        );
        if active.is_empty() {
            return Err(BuilderError::NoActiveAlleles);
        }

        // Fitness covers the full potential set so introduced alleles are
        // under selection from the generation they appear.
        let fitness =
            FitnessTable::from_coefficients(potential.iter(), &self.selection_coefficients);

        let initial_frequencies = self.initial_frequency.resolve(&active)?;

        let rng = match self.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        let params = SimulationParameters {
            mutation_rate: self.mutation_rate,
            wild_type,
            seed: self.seed,
        };

        Ok(Simulation::from_parts(
            graph,
            params,
            fitness,
            initial_frequencies,
            introductions,
            active,
            rng,
        ))
    }
}
