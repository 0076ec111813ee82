//! Convenient re-exports of the most commonly used types.

pub use crate::base::{ActiveAlleles, Allele, FitnessTable};
pub use crate::demography::{Deme, Epoch, Graph, Migration, Pulse, SizeFunction};
pub use crate::errors::{BuilderError, GraphError, LoadError};
pub use crate::evolution::{IntroductionEntry, IntroductionSchedule};
pub use crate::simulation::{
    FrequencySnapshot, History, InitialFrequency, Simulation, SimulationBuilder,
};
