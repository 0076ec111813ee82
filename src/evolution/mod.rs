//! Evolutionary forces applied each generation.
//!
//! This module implements the per-generation operators:
//! - **Selection**: fitness-weighted Wright-Fisher resampling
//! - **Mutation**: symmetric bidirectional wild-type/mutant mutation
//! - **Migration**: continuous gene flow and one-time pulses
//! - **Introduction**: scheduled activation of new alleles

pub mod introduction;
pub mod migration;
pub mod mutation;
pub mod selection;

pub use introduction::{IntroductionEntry, IntroductionSchedule};
