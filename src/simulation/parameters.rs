//! Simulation parameters.

use crate::base::{ActiveAlleles, Allele};
use crate::errors::BuilderError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How founding populations draw their initial allele composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialFrequency {
    /// A single frequency for the first of exactly two active alleles (the
    /// second gets the complement). With one active allele it is ignored;
    /// with more than two the split is uniform.
    Single(f64),
    /// Explicit per-allele frequencies. Entries for inactive alleles are
    /// ignored; the remainder is rescaled to sum to 1.
    PerAllele(HashMap<Allele, f64>),
}

impl Default for InitialFrequency {
    fn default() -> Self {
        Self::Single(0.5)
    }
}

impl From<f64> for InitialFrequency {
    fn from(frequency: f64) -> Self {
        Self::Single(frequency)
    }
}

impl From<HashMap<Allele, f64>> for InitialFrequency {
    fn from(frequencies: HashMap<Allele, f64>) -> Self {
        Self::PerAllele(frequencies)
    }
}

impl InitialFrequency {
    /// Resolve to a weighted allele list over the active set, normalized to
    /// sum to 1. Individual frequencies outside [0, 1] are configuration
    /// errors; a non-positive total is too.
    pub(crate) fn resolve(
        &self,
        active: &ActiveAlleles,
    ) -> Result<Vec<(Allele, f64)>, BuilderError> {
        let mut resolved: Vec<(Allele, f64)> = match self {
            Self::Single(frequency) => {
                check_frequency("<initial>", *frequency)?;
                let alleles: Vec<&Allele> = active.iter().collect();
                match alleles.len() {
                    0 => Vec::new(),
                    1 => vec![(alleles[0].clone(), 1.0)],
                    2 => vec![
                        (alleles[0].clone(), *frequency),
                        (alleles[1].clone(), 1.0 - *frequency),
                    ],
                    n => alleles
                        .into_iter()
                        .map(|a| (a.clone(), 1.0 / n as f64))
                        .collect(),
                }
            }
            Self::PerAllele(frequencies) => {
                for (allele, frequency) in frequencies {
                    check_frequency(allele.as_str(), *frequency)?;
                }
                let filtered: Vec<(Allele, f64)> = active
                    .iter()
                    .filter_map(|a| frequencies.get(a).map(|f| (a.clone(), *f)))
                    .collect();
                if filtered.is_empty() {
                    // No entry names an active allele: fall back to uniform.
                    active
                        .iter()
                        .map(|a| (a.clone(), 1.0 / active.len() as f64))
                        .collect()
                } else {
                    filtered
                }
            }
        };

        let total: f64 = resolved.iter().map(|(_, f)| f).sum();
        if total <= 0.0 {
            return Err(BuilderError::FrequencySum(total));
        }
        if (total - 1.0).abs() > 1e-9 {
            for (_, frequency) in &mut resolved {
                *frequency /= total;
            }
        }
        Ok(resolved)
    }
}

fn check_frequency(allele: &str, value: f64) -> Result<(), BuilderError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BuilderError::InvalidFrequency {
            allele: allele.to_string(),
            value,
        });
    }
    Ok(())
}

/// Fixed per-run parameters consulted inside the generation loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Shared forward/backward per-individual mutation probability.
    pub mutation_rate: f64,
    /// The wild-type allele, hub of the bidirectional mutation model.
    pub wild_type: Allele,
    /// Optional RNG seed; `None` means non-reproducible draws.
    pub seed: Option<u64>,
}
