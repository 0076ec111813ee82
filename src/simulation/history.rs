//! Frequency histories: the simulation's output artifact.

use crate::base::{ActiveAlleles, Allele};
use serde::Serialize;
use std::collections::BTreeMap;

/// Allele frequencies of one population at one generation.
///
/// Entries cover the active-allele set as of the census; an allele absent
/// from the map reads as 0.0 (it was not yet active when the snapshot was
/// taken). Values sum to 1.0 for a non-empty population and to 0.0 for an
/// empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrequencySnapshot {
    frequencies: BTreeMap<Allele, f64>,
}

impl FrequencySnapshot {
    /// An all-zero snapshot over the active set, recorded for empty or
    /// extinct populations to keep histories aligned.
    pub fn zeroed(active: &ActiveAlleles) -> Self {
        let mut snapshot = Self::default();
        for allele in active.iter() {
            snapshot.set(allele.clone(), 0.0);
        }
        snapshot
    }

    pub(crate) fn set(&mut self, allele: Allele, frequency: f64) {
        self.frequencies.insert(allele, frequency);
    }

    /// Frequency of an allele; 0.0 if the allele was not tracked yet.
    pub fn frequency(&self, allele: &Allele) -> f64 {
        self.frequencies.get(allele).copied().unwrap_or(0.0)
    }

    /// Iterate over `(allele, frequency)` pairs in allele order.
    pub fn iter(&self) -> impl Iterator<Item = (&Allele, f64)> {
        self.frequencies.iter().map(|(a, f)| (a, *f))
    }

    /// Alleles tracked by this snapshot.
    pub fn alleles(&self) -> impl Iterator<Item = &Allele> {
        self.frequencies.keys()
    }

    /// Sum of all recorded frequencies.
    pub fn total(&self) -> f64 {
        self.frequencies.values().sum()
    }
}

/// Per-population frequency series, one snapshot per generation.
///
/// Each series starts at the generation its deme was born and ends at
/// generation 0, so the last snapshot of every series refers to the present
/// and series lengths encode birth times.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    series: BTreeMap<String, Vec<FrequencySnapshot>>,
}

impl History {
    /// Start an (empty) series for a newly-born deme.
    pub(crate) fn open_series(&mut self, name: &str) {
        self.series.entry(name.to_string()).or_default();
    }

    /// Append one generation's snapshot to a deme's series.
    pub(crate) fn append(&mut self, name: &str, snapshot: FrequencySnapshot) {
        self.series.entry(name.to_string()).or_default().push(snapshot);
    }

    /// Names of all recorded demes, in name order.
    pub fn demes(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// A deme's snapshots, oldest generation first, last entry = generation 0.
    pub fn series(&self, name: &str) -> Option<&[FrequencySnapshot]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// The generation a series entry refers to: index 0 is the oldest
    /// recorded generation and the last entry is generation 0.
    pub fn generation_of(&self, name: &str, index: usize) -> Option<i64> {
        let series = self.series.get(name)?;
        if index >= series.len() {
            return None;
        }
        Some((series.len() - 1 - index) as i64)
    }
}
