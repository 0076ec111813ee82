//! Demographic schedule: the read-only graph of demes, size trajectories,
//! migrations and pulses, plus the YAML loader that produces it.

pub mod graph;
pub mod loader;

pub use graph::{Deme, Epoch, Graph, Migration, Pulse, SizeFunction};
pub use loader::{load_path, load_str};
