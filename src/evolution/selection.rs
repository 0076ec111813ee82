//! Fitness-weighted Wright-Fisher resampling.

use crate::base::{Allele, FitnessTable};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// Draw the next generation from `parents` by sampling `target_size` allele
/// tags with replacement, each parent weighted by its allele's fitness.
///
/// A population whose total fitness is zero (every carried allele lethal)
/// goes extinct: the result is the empty sequence, not an error.
pub fn resample<R: Rng + ?Sized>(
    parents: &[Allele],
    fitness: &FitnessTable,
    target_size: usize,
    rng: &mut R,
) -> Vec<Allele> {
    if parents.is_empty() || target_size == 0 {
        return Vec::new();
    }

    let weights: Vec<f64> = parents.iter().map(|a| fitness.weight(a)).collect();
    if weights.iter().sum::<f64>() <= 0.0 {
        return Vec::new();
    }

    let dist = match WeightedIndex::new(&weights) {
        Ok(dist) => dist,
        // Weights are clamped non-negative and sum to a positive total, so
        // the only remaining failure is a degenerate vector; treat it as
        // extinction rather than erroring mid-generation.
        Err(_) => return Vec::new(),
    };

    (0..target_size)
        .map(|_| parents[dist.sample(rng)].clone())
        .collect()
}
