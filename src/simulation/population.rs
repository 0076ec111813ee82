//! Population state: the mutable per-deme allele sequences.

use crate::base::{ActiveAlleles, Allele};
use crate::simulation::history::FrequencySnapshot;
use std::collections::HashMap;
use std::sync::Arc;

/// A population's working state: one allele tag per individual, in slot
/// order. Individuals have no identity beyond their current allele; each
/// generation replaces the whole sequence by sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    id: Arc<str>,
    individuals: Vec<Allele>,
}

impl Population {
    /// Create a population from its individuals.
    pub fn new(id: impl Into<Arc<str>>, individuals: Vec<Allele>) -> Self {
        Self {
            id: id.into(),
            individuals,
        }
    }

    /// Population name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of individuals.
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population currently has no individuals (extinct or not
    /// yet sized).
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// All individuals as a slice of allele tags.
    pub fn individuals(&self) -> &[Allele] {
        &self.individuals
    }

    /// Mutable access to the allele tags.
    pub fn individuals_mut(&mut self) -> &mut [Allele] {
        &mut self.individuals
    }

    /// Replace the whole sequence (the per-generation resampling step).
    pub fn set_individuals(&mut self, individuals: Vec<Allele>) {
        self.individuals = individuals;
    }

    /// Overwrite the allele at one slot.
    pub fn set(&mut self, slot: usize, allele: Allele) {
        self.individuals[slot] = allele;
    }

    /// Count individuals per allele.
    pub fn counts(&self) -> HashMap<&Allele, usize> {
        let mut counts: HashMap<&Allele, usize> = HashMap::new();
        for allele in &self.individuals {
            *counts.entry(allele).or_insert(0) += 1;
        }
        counts
    }

    /// Frequency snapshot over the active-allele set: `count / size` per
    /// active allele, or all-zero entries for an empty population so that
    /// histories stay aligned across demes with different lifespans.
    pub fn frequencies(&self, active: &ActiveAlleles) -> FrequencySnapshot {
        if self.individuals.is_empty() {
            return FrequencySnapshot::zeroed(active);
        }
        let counts = self.counts();
        let size = self.individuals.len() as f64;
        let mut snapshot = FrequencySnapshot::default();
        for allele in active.iter() {
            let count = counts.get(allele).copied().unwrap_or(0);
            snapshot.set(allele.clone(), count as f64 / size);
        }
        snapshot
    }
}

/// The store of all populations born so far, keyed by deme name.
///
/// Populations are inserted when their deme is born and never removed;
/// extinction leaves an empty sequence in place so the census keeps
/// emitting aligned all-zero snapshots.
#[derive(Debug, Clone, Default)]
pub struct PopulationStore {
    populations: HashMap<String, Population>,
}

impl PopulationStore {
    /// Insert a newly-born population, keyed by its id.
    pub fn insert(&mut self, population: Population) {
        self.populations
            .insert(population.id().to_string(), population);
    }

    /// Whether a deme has been materialized.
    pub fn contains(&self, name: &str) -> bool {
        self.populations.contains_key(name)
    }

    /// Borrow a population by deme name.
    pub fn get(&self, name: &str) -> Option<&Population> {
        self.populations.get(name)
    }

    /// Mutably borrow a population by deme name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Population> {
        self.populations.get_mut(name)
    }

    /// Number of populations born so far.
    pub fn len(&self) -> usize {
        self.populations.len()
    }

    /// Whether no population exists yet.
    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }
}
