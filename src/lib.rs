//! # demesim
//!
//! A Wright-Fisher allele-frequency simulator driven by demes-style
//! demographic models. Populations advance through discrete,
//! backward-indexed generations (0 = present) under selection, bidirectional
//! mutation, continuous and pulse migration, and scheduled allele
//! introduction; the output is one frequency snapshot per population per
//! generation, aligned so every series ends at the present.

pub mod base;
pub mod demography;
pub mod errors;
pub mod evolution;
pub mod prelude;
pub mod simulation;

pub use base::{ActiveAlleles, Allele, FitnessTable};
