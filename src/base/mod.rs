//! Base types shared across the simulator.
//!
//! This module provides the foundational types for representing alleles,
//! the growable active-allele set, and per-allele fitness weights.

pub mod allele;
pub mod fitness;

pub use allele::{ActiveAlleles, Allele};
pub use fitness::FitnessTable;
