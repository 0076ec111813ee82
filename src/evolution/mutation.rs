//! Bidirectional allele mutation.
//!
//! Mutation is a single symmetric per-individual probability: with
//! probability `rate` a wild-type individual mutates forward to a uniformly
//! chosen active mutant allele, and a mutant individual mutates back to the
//! wild type. Both directions share the same rate.

use crate::base::{ActiveAlleles, Allele};
use rand::Rng;

/// Apply one generation of mutation to a population's allele tags.
///
/// No-op when `rate <= 0` or no mutant allele is active. Runs strictly after
/// selection and strictly before migration, so mutants always come from the
/// post-selection cohort and may migrate in the same generation.
pub fn mutate<R: Rng + ?Sized>(
    individuals: &mut [Allele],
    rate: f64,
    wild_type: &Allele,
    active: &ActiveAlleles,
    rng: &mut R,
) {
    if rate <= 0.0 {
        return;
    }
    let mutants = active.mutant_targets(wild_type);
    if mutants.is_empty() {
        return;
    }

    for slot in individuals.iter_mut() {
        if rng.random::<f64>() < rate {
            *slot = if slot == wild_type {
                mutants[rng.random_range(0..mutants.len())].clone()
            } else {
                wild_type.clone()
            };
        }
    }
}
