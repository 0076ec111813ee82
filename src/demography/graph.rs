//! Resolved demographic model: demes, size trajectories, migrations, pulses.
//!
//! A [`Graph`] is built once, validated at construction, and treated as
//! read-only for the duration of a simulation. Time runs backward: 0 is the
//! present, larger values are further in the past, and a root deme has an
//! infinite start time.

use crate::errors::GraphError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Burn-in generations simulated before the oldest finite event when the
/// model contains a root deme with an infinite start time.
pub const ROOT_BURN_IN: f64 = 50.0;

/// Total generations simulated when no deme has a finite start time.
pub const DEFAULT_SPAN: f64 = 100.0;

/// How a deme's size changes across an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFunction {
    Constant,
    Linear,
    Exponential,
}

/// One interval of a deme's size trajectory.
///
/// An epoch covers the backward-time interval `[end_time, start_time]`. The
/// start time is resolved from the deme's start time (first epoch) or the
/// previous epoch's end time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub(crate) start_time: f64,
    pub end_time: f64,
    pub start_size: f64,
    pub end_size: f64,
    pub size_function: SizeFunction,
}

impl Epoch {
    /// Create an epoch; the start time is resolved when the deme is built.
    pub fn new(end_time: f64, start_size: f64, end_size: f64, size_function: SizeFunction) -> Self {
        Self {
            start_time: f64::INFINITY,
            end_time,
            start_size,
            end_size,
            size_function,
        }
    }

    /// An epoch with a constant size.
    pub fn constant(end_time: f64, size: f64) -> Self {
        Self::new(end_time, size, size, SizeFunction::Constant)
    }

    /// The epoch's resolved start time (older bound).
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Size at a time inside this epoch. Interpolates between `start_size`
    /// and `end_size` according to the size function; an epoch with an
    /// infinite start time is flat at `start_size`.
    pub fn size_at(&self, time: f64) -> f64 {
        if self.start_time.is_infinite() {
            return self.start_size;
        }
        let span = self.start_time - self.end_time;
        let frac = if span > 0.0 {
            (self.start_time - time) / span
        } else {
            1.0
        };
        match self.size_function {
            SizeFunction::Constant => self.start_size,
            SizeFunction::Linear => self.start_size + (self.end_size - self.start_size) * frac,
            SizeFunction::Exponential => {
                self.start_size * (self.end_size / self.start_size).powf(frac)
            }
        }
    }
}

/// A named population with a time-bounded existence and an ancestry relation.
#[derive(Debug, Clone)]
pub struct Deme {
    name: Arc<str>,
    start_time: f64,
    ancestors: Vec<String>,
    proportions: Vec<f64>,
    epochs: Vec<Epoch>,
}

impl Deme {
    /// Build a deme, resolving epoch start times and defaulting missing
    /// ancestry proportions to a uniform split.
    pub fn new(
        name: impl Into<Arc<str>>,
        start_time: f64,
        ancestors: Vec<String>,
        proportions: Vec<f64>,
        mut epochs: Vec<Epoch>,
    ) -> Result<Self, GraphError> {
        let name = name.into();

        if epochs.is_empty() {
            return Err(GraphError::EmptyEpochs(name.to_string()));
        }
        if ancestors.is_empty() && start_time.is_finite() {
            return Err(GraphError::RootStartTime {
                deme: name.to_string(),
            });
        }
        if !ancestors.is_empty() && !start_time.is_finite() {
            return Err(GraphError::MissingStartTime {
                deme: name.to_string(),
            });
        }

        let proportions = if proportions.is_empty() && !ancestors.is_empty() {
            vec![1.0 / ancestors.len() as f64; ancestors.len()]
        } else {
            proportions
        };
        if proportions.len() != ancestors.len() {
            return Err(GraphError::ProportionMismatch {
                deme: name.to_string(),
                ancestors: ancestors.len(),
                proportions: proportions.len(),
            });
        }
        if !ancestors.is_empty() {
            let sum: f64 = proportions.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(GraphError::ProportionSum {
                    deme: name.to_string(),
                    sum,
                });
            }
        }

        let mut previous_end = start_time;
        for epoch in &mut epochs {
            epoch.start_time = previous_end;
            if !(epoch.end_time >= 0.0) {
                return Err(GraphError::InvalidTime {
                    what: "epoch end_time",
                    value: epoch.end_time,
                });
            }
            if epoch.end_time >= epoch.start_time {
                return Err(GraphError::UnorderedTimes {
                    deme: name.to_string(),
                    start_time: epoch.start_time,
                    end_time: epoch.end_time,
                });
            }
            for size in [epoch.start_size, epoch.end_size] {
                if !(size >= 0.0) || size.is_infinite() {
                    return Err(GraphError::InvalidSize {
                        deme: name.to_string(),
                        value: size,
                    });
                }
            }
            // Exponential interpolation is undefined from a zero start size.
            if epoch.size_function == SizeFunction::Exponential && epoch.start_size == 0.0 {
                return Err(GraphError::InvalidSize {
                    deme: name.to_string(),
                    value: epoch.start_size,
                });
            }
            previous_end = epoch.end_time;
        }

        Ok(Self {
            name,
            start_time,
            ancestors,
            proportions,
            epochs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backward time at which the deme comes into existence; infinite for
    /// root demes.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Backward time at which the deme ceases to exist (0 if it survives to
    /// the present).
    pub fn end_time(&self) -> f64 {
        self.epochs.last().map(|e| e.end_time).unwrap_or(0.0)
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    pub fn proportions(&self) -> &[f64] {
        &self.proportions
    }

    pub fn epochs(&self) -> &[Epoch] {
        &self.epochs
    }

    /// Size at the deme's birth: the first epoch's start size. Used when the
    /// deme is materialized, where querying the boundary itself would fall
    /// outside the first epoch's open interval.
    pub fn initial_size(&self) -> f64 {
        self.epochs[0].start_size
    }

    /// Size of the deme at a backward time, or 0.0 outside its lifespan.
    pub fn size_at(&self, time: f64) -> f64 {
        if time > self.start_time || time < self.end_time() {
            return 0.0;
        }
        for epoch in &self.epochs {
            if time >= epoch.end_time && time <= epoch.start_time {
                return epoch.size_at(time);
            }
        }
        0.0
    }

    /// Whether this deme is born at `generation`. Root demes with an
    /// infinite start time are born at the simulation's start generation.
    pub fn starts_at(&self, generation: i64, start_generation: i64) -> bool {
        if self.start_time.is_finite() {
            self.start_time as i64 == generation
        } else {
            generation == start_generation
        }
    }
}

/// A continuous migration: per-generation gene flow from `source` into
/// `dest` at `rate`, active over the backward interval
/// `[end_time, start_time]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub source: String,
    pub dest: String,
    pub rate: f64,
    pub start_time: f64,
    pub end_time: f64,
}

impl Migration {
    /// Whether this migration applies at the given backward time.
    pub fn active_at(&self, time: f64) -> bool {
        self.end_time <= time && time <= self.start_time
    }
}

/// An instantaneous one-time migration at a single generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub source: String,
    pub dest: String,
    pub proportion: f64,
    pub time: f64,
}

/// The resolved, immutable demographic model.
#[derive(Debug, Clone)]
pub struct Graph {
    demes: Vec<Deme>,
    migrations: Vec<Migration>,
    pulses: Vec<Pulse>,
}

impl Graph {
    /// Validate and assemble a graph. Ancestors must be declared before
    /// their descendants, which keeps the ancestry relation acyclic.
    pub fn new(
        demes: Vec<Deme>,
        migrations: Vec<Migration>,
        pulses: Vec<Pulse>,
    ) -> Result<Self, GraphError> {
        if demes.is_empty() {
            return Err(GraphError::NoDemes);
        }

        let mut seen: Vec<&str> = Vec::with_capacity(demes.len());
        for deme in &demes {
            if seen.contains(&deme.name()) {
                return Err(GraphError::DuplicateDeme(deme.name().to_string()));
            }
            for ancestor in deme.ancestors() {
                if !seen.contains(&ancestor.as_str()) {
                    return Err(GraphError::UnknownDeme {
                        referrer: deme.name().to_string(),
                        name: ancestor.clone(),
                    });
                }
            }
            seen.push(deme.name());
        }

        for migration in &migrations {
            for name in [&migration.source, &migration.dest] {
                if !seen.contains(&name.as_str()) {
                    return Err(GraphError::UnknownDeme {
                        referrer: "migration".to_string(),
                        name: name.clone(),
                    });
                }
            }
            if migration.source == migration.dest {
                return Err(GraphError::SelfMigration {
                    deme: migration.source.clone(),
                });
            }
            if !(0.0..=1.0).contains(&migration.rate) {
                return Err(GraphError::InvalidRate {
                    what: "migration rate",
                    value: migration.rate,
                });
            }
            if !(migration.end_time >= 0.0) {
                return Err(GraphError::InvalidTime {
                    what: "migration end_time",
                    value: migration.end_time,
                });
            }
            if migration.start_time < migration.end_time {
                return Err(GraphError::InvalidTime {
                    what: "migration start_time",
                    value: migration.start_time,
                });
            }
        }

        for pulse in &pulses {
            for name in [&pulse.source, &pulse.dest] {
                if !seen.contains(&name.as_str()) {
                    return Err(GraphError::UnknownDeme {
                        referrer: "pulse".to_string(),
                        name: name.clone(),
                    });
                }
            }
            if pulse.source == pulse.dest {
                return Err(GraphError::SelfMigration {
                    deme: pulse.source.clone(),
                });
            }
            if !(0.0..=1.0).contains(&pulse.proportion) {
                return Err(GraphError::InvalidRate {
                    what: "pulse proportion",
                    value: pulse.proportion,
                });
            }
            if !pulse.time.is_finite() || pulse.time < 0.0 {
                return Err(GraphError::InvalidTime {
                    what: "pulse time",
                    value: pulse.time,
                });
            }
        }

        Ok(Self {
            demes,
            migrations,
            pulses,
        })
    }

    /// Demes in declaration order. The simulation visits populations in
    /// this order, which fixes the random-draw sequence for a given seed.
    pub fn demes(&self) -> &[Deme] {
        &self.demes
    }

    /// Look up a deme by name.
    pub fn deme(&self, name: &str) -> Option<&Deme> {
        self.demes.iter().find(|d| d.name() == name)
    }

    /// Continuous migrations in declaration order. When several records
    /// target the same destination in one generation they apply in this
    /// order, later overwrites winning at the individual level; this
    /// tie-break is documented behavior, not a semantic contract.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Pulse migrations in declaration order.
    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    /// The oldest generation the simulation runs, inclusive.
    ///
    /// Root demes have infinite start times, so the run begins
    /// [`ROOT_BURN_IN`] generations before the oldest finite start time, or
    /// spans [`DEFAULT_SPAN`] generations when no deme has a finite start
    /// time at all.
    pub fn start_generation(&self) -> i64 {
        let finite_max = self
            .demes
            .iter()
            .map(Deme::start_time)
            .filter(|t| t.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);

        if finite_max.is_finite() {
            (finite_max + ROOT_BURN_IN) as i64
        } else {
            DEFAULT_SPAN as i64
        }
    }
}
