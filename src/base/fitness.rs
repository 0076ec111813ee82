//! Per-allele fitness weights.

use crate::base::Allele;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Precomputed fitness weights for every allele that can ever exist in a run,
/// including alleles scheduled for future introduction.
///
/// Each weight is `max(0, 1 + s)` for selection coefficient `s`; alleles with
/// no configured coefficient are neutral (`s = 0`). The table is built once at
/// setup and never changes, so an introduced allele participates in selection
/// from the generation it appears.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FitnessTable {
    weights: HashMap<Allele, f64>,
}

impl FitnessTable {
    /// Build the table from the potential-allele set and a map of selection
    /// coefficients. Missing coefficients default to 0.0.
    pub fn from_coefficients<'a>(
        alleles: impl IntoIterator<Item = &'a Allele>,
        coefficients: &HashMap<Allele, f64>,
    ) -> Self {
        let weights = alleles
            .into_iter()
            .map(|allele| {
                let s = coefficients.get(allele).copied().unwrap_or(0.0);
                (allele.clone(), (1.0 + s).max(0.0))
            })
            .collect();
        Self { weights }
    }

    /// Fitness weight for an allele. Alleles absent from the table are
    /// treated as neutral.
    pub fn weight(&self, allele: &Allele) -> f64 {
        self.weights.get(allele).copied().unwrap_or(1.0)
    }

    /// Number of alleles in the table.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
