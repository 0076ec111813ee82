//! Scheduled allele introduction.
//!
//! An introduction converts a fraction of a target population to a new
//! allele at a fixed generation. This is the only mechanism by which an
//! allele moves from the potential set to the active set; its fitness was
//! already precomputed at setup, so it is under selection from the same
//! generation it appears.

use crate::base::{ActiveAlleles, Allele};
use crate::errors::LoadError;
use crate::simulation::population::PopulationStore;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_frequency() -> f64 {
    0.05
}

/// One scheduled introduction: `allele` enters `population` at backward time
/// `start_time` with fractional initial frequency `initial_frequency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntroductionEntry {
    pub allele: Allele,
    pub population: String,
    pub start_time: f64,
    #[serde(default = "default_frequency")]
    pub initial_frequency: f64,
}

impl IntroductionEntry {
    /// A new entry with the default initial frequency of 0.05.
    pub fn new(allele: impl Into<Allele>, population: impl Into<String>, start_time: f64) -> Self {
        Self {
            allele: allele.into(),
            population: population.into(),
            start_time,
            initial_frequency: default_frequency(),
        }
    }

    /// Override the fractional initial frequency.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.initial_frequency = frequency;
        self
    }
}

#[derive(Debug, Deserialize)]
struct RawIntroductionConfig {
    #[serde(default)]
    new_alleles: Vec<IntroductionEntry>,
}

/// Load introduction entries from a YAML configuration file. `allele`,
/// `population` and `start_time` are required per entry; a missing field is
/// a parse error.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<IntroductionEntry>, LoadError> {
    let text = fs::read_to_string(path)?;
    load_str(&text)
}

/// Load introduction entries from YAML text.
pub fn load_str(text: &str) -> Result<Vec<IntroductionEntry>, LoadError> {
    let raw: RawIntroductionConfig = serde_yaml::from_str(text)?;
    Ok(raw.new_alleles)
}

/// Generation-indexed introduction schedule, built once at setup.
#[derive(Debug, Clone, Default)]
pub struct IntroductionSchedule {
    by_generation: HashMap<i64, Vec<IntroductionEntry>>,
}

impl IntroductionSchedule {
    /// Group entries by their (truncated) start generation, preserving the
    /// configured order within a generation.
    pub fn new(entries: impl IntoIterator<Item = IntroductionEntry>) -> Self {
        let mut by_generation: HashMap<i64, Vec<IntroductionEntry>> = HashMap::new();
        for entry in entries {
            by_generation
                .entry(entry.start_time as i64)
                .or_default()
                .push(entry);
        }
        Self { by_generation }
    }

    /// Whether no introduction is scheduled.
    pub fn is_empty(&self) -> bool {
        self.by_generation.is_empty()
    }

    /// Every allele scheduled for future introduction.
    pub fn scheduled_alleles(&self) -> Vec<Allele> {
        let mut alleles: Vec<Allele> = Vec::new();
        for entries in self.by_generation.values() {
            for entry in entries {
                if !alleles.contains(&entry.allele) {
                    alleles.push(entry.allele.clone());
                }
            }
        }
        alleles
    }

    /// Apply every entry scheduled for `generation`.
    ///
    /// A target population that does not exist yet or is empty is skipped
    /// silently. Otherwise `max(1, floor(size × frequency))` distinct slots
    /// are chosen uniformly without replacement and overwritten with the
    /// introduced allele, which then joins the active set.
    pub fn apply_at<R: Rng + ?Sized>(
        &self,
        generation: i64,
        store: &mut PopulationStore,
        active: &mut ActiveAlleles,
        rng: &mut R,
    ) {
        let Some(entries) = self.by_generation.get(&generation) else {
            return;
        };

        for entry in entries {
            let Some(population) = store.get_mut(&entry.population) else {
                continue;
            };
            if population.is_empty() {
                continue;
            }

            let size = population.size();
            let count = (((size as f64 * entry.initial_frequency).floor() as usize).max(1)).min(size);
            for slot in rand::seq::index::sample(rng, size, count) {
                population.set(slot, entry.allele.clone());
            }
            active.activate(entry.allele.clone());
        }
    }
}
