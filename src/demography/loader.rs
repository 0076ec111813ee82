//! YAML loader for demes-style demographic model files.
//!
//! The accepted format is a subset of the demes specification with time in
//! generations:
//!
//! ```yaml
//! time_units: generations
//! demes:
//!   - name: ancestral
//!     epochs:
//!       - start_size: 1000
//!   - name: derived
//!     ancestors: [ancestral]
//!     start_time: 80
//!     epochs:
//!       - {start_size: 500, end_size: 2000, end_time: 0}
//! migrations:
//!   - {source: ancestral, dest: derived, rate: 0.01}
//! pulses:
//!   - {source: derived, dest: ancestral, proportion: 0.1, time: 40}
//! ```
//!
//! Raw documents are parsed with serde and then resolved into a validated
//! [`Graph`]: root demes get infinite start times, later epochs inherit
//! sizes from earlier ones, and migrations default to the overlap of the
//! demes they connect.

use crate::demography::graph::{Deme, Epoch, Graph, Migration, Pulse, SizeFunction};
use crate::errors::{GraphError, LoadError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModel {
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(default)]
    time_units: Option<String>,
    demes: Vec<RawDeme>,
    #[serde(default)]
    migrations: Vec<RawMigration>,
    #[serde(default)]
    pulses: Vec<RawPulse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDeme {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(default)]
    start_time: Option<f64>,
    #[serde(default)]
    ancestors: Vec<String>,
    #[serde(default)]
    proportions: Vec<f64>,
    epochs: Vec<RawEpoch>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEpoch {
    #[serde(default)]
    end_time: Option<f64>,
    #[serde(default)]
    start_size: Option<f64>,
    #[serde(default)]
    end_size: Option<f64>,
    #[serde(default)]
    size_function: Option<SizeFunction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMigration {
    source: String,
    dest: String,
    rate: f64,
    #[serde(default)]
    start_time: Option<f64>,
    #[serde(default)]
    end_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPulse {
    source: String,
    dest: String,
    proportion: f64,
    time: f64,
}

/// Load a demographic model from a YAML file.
pub fn load_path(path: impl AsRef<Path>) -> Result<Graph, LoadError> {
    let text = fs::read_to_string(path)?;
    load_str(&text)
}

/// Load a demographic model from YAML text.
pub fn load_str(text: &str) -> Result<Graph, LoadError> {
    let raw: RawModel = serde_yaml::from_str(text)?;

    if let Some(units) = &raw.time_units {
        if units != "generations" {
            return Err(LoadError::UnsupportedTimeUnits(units.clone()));
        }
    }

    let demes = raw
        .demes
        .into_iter()
        .map(resolve_deme)
        .collect::<Result<Vec<_>, _>>()?;

    let migrations = raw
        .migrations
        .into_iter()
        .map(|m| resolve_migration(m, &demes))
        .collect::<Result<Vec<_>, _>>()?;

    let pulses = raw
        .pulses
        .into_iter()
        .map(|p| Pulse {
            source: p.source,
            dest: p.dest,
            proportion: p.proportion,
            time: p.time,
        })
        .collect();

    Ok(Graph::new(demes, migrations, pulses)?)
}

fn resolve_deme(raw: RawDeme) -> Result<Deme, GraphError> {
    if raw.epochs.is_empty() {
        return Err(GraphError::EmptyEpochs(raw.name));
    }

    let start_time = raw.start_time.unwrap_or(f64::INFINITY);

    let mut epochs = Vec::with_capacity(raw.epochs.len());
    let mut inherited_size: Option<f64> = None;
    let last = raw.epochs.len() - 1;
    for (i, epoch) in raw.epochs.into_iter().enumerate() {
        let start_size = match epoch.start_size.or(inherited_size) {
            Some(size) => size,
            None => return Err(GraphError::MissingSize { deme: raw.name }),
        };
        let end_size = epoch.end_size.unwrap_or(start_size);
        let end_time = match epoch.end_time {
            Some(t) => t,
            // Only the final epoch may omit its end time, which is then the
            // present.
            None if i == last => 0.0,
            None => {
                return Err(GraphError::InvalidTime {
                    what: "epoch end_time",
                    value: f64::NAN,
                })
            }
        };
        let size_function = epoch.size_function.unwrap_or(if start_size == end_size {
            SizeFunction::Constant
        } else {
            SizeFunction::Exponential
        });

        inherited_size = Some(end_size);
        epochs.push(Epoch::new(end_time, start_size, end_size, size_function));
    }

    Deme::new(raw.name, start_time, raw.ancestors, raw.proportions, epochs)
}

fn resolve_migration(raw: RawMigration, demes: &[Deme]) -> Result<Migration, GraphError> {
    let lifespan = |name: &str| -> Result<(f64, f64), GraphError> {
        demes
            .iter()
            .find(|d| d.name() == name)
            .map(|d| (d.start_time(), d.end_time()))
            .ok_or_else(|| GraphError::UnknownDeme {
                referrer: "migration".to_string(),
                name: name.to_string(),
            })
    };

    let (source_start, source_end) = lifespan(&raw.source)?;
    let (dest_start, dest_end) = lifespan(&raw.dest)?;

    // Default interval: the overlap of the two demes' lifespans.
    let start_time = raw.start_time.unwrap_or_else(|| source_start.min(dest_start));
    let end_time = raw.end_time.unwrap_or_else(|| source_end.max(dest_end));

    Ok(Migration {
        source: raw.source,
        dest: raw.dest,
        rate: raw.rate,
        start_time,
        end_time,
    })
}
