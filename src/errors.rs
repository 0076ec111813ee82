use std::error;
use std::fmt;

/// Errors raised while resolving or validating a demographic graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The model declares no demes at all.
    NoDemes,
    /// Two demes share the same name.
    DuplicateDeme(String),
    /// A deme, migration or pulse refers to a deme that does not exist
    /// (or, for ancestors, is not declared earlier in the model).
    UnknownDeme { referrer: String, name: String },
    /// A migration or pulse names the same deme as source and destination.
    SelfMigration { deme: String },
    /// `ancestors` and `proportions` have different lengths.
    ProportionMismatch {
        deme: String,
        ancestors: usize,
        proportions: usize,
    },
    /// Ancestry proportions do not sum to 1.
    ProportionSum { deme: String, sum: f64 },
    /// A deme without ancestors must have an infinite start time.
    RootStartTime { deme: String },
    /// A deme with ancestors must have a finite start time.
    MissingStartTime { deme: String },
    /// A deme declares no epochs.
    EmptyEpochs(String),
    /// Epoch boundaries are not strictly decreasing towards the present.
    UnorderedTimes {
        deme: String,
        start_time: f64,
        end_time: f64,
    },
    /// A deme size is negative or not a number.
    InvalidSize { deme: String, value: f64 },
    /// A required size field is missing and cannot be inherited.
    MissingSize { deme: String },
    /// A rate or proportion is outside [0, 1].
    InvalidRate { what: &'static str, value: f64 },
    /// A time value is negative or not a number.
    InvalidTime { what: &'static str, value: f64 },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDemes => write!(f, "Demographic model declares no demes"),
            Self::DuplicateDeme(name) => write!(f, "Duplicate deme name: '{name}'"),
            Self::UnknownDeme { referrer, name } => {
                write!(f, "'{referrer}' refers to unknown deme '{name}'")
            }
            Self::SelfMigration { deme } => {
                write!(f, "Migration from deme '{deme}' to itself")
            }
            Self::ProportionMismatch {
                deme,
                ancestors,
                proportions,
            } => write!(
                f,
                "Deme '{deme}' has {ancestors} ancestors but {proportions} proportions"
            ),
            Self::ProportionSum { deme, sum } => write!(
                f,
                "Ancestry proportions of deme '{deme}' sum to {sum}, expected 1"
            ),
            Self::RootStartTime { deme } => write!(
                f,
                "Deme '{deme}' has no ancestors and must not declare a finite start time"
            ),
            Self::MissingStartTime { deme } => write!(
                f,
                "Deme '{deme}' has ancestors and requires a finite start time"
            ),
            Self::EmptyEpochs(name) => write!(f, "Deme '{name}' declares no epochs"),
            Self::UnorderedTimes {
                deme,
                start_time,
                end_time,
            } => write!(
                f,
                "Epoch times of deme '{deme}' are not decreasing: start {start_time}, end {end_time}"
            ),
            Self::InvalidSize { deme, value } => {
                write!(f, "Invalid size {value} for deme '{deme}'")
            }
            Self::MissingSize { deme } => write!(
                f,
                "First epoch of deme '{deme}' must specify a start_size"
            ),
            Self::InvalidRate { what, value } => {
                write!(f, "Invalid {what}: {value} (must be between 0.0 and 1.0)")
            }
            Self::InvalidTime { what, value } => {
                write!(f, "Invalid {what}: {value} (must be non-negative)")
            }
        }
    }
}

impl error::Error for GraphError {}

/// Errors raised while loading model or configuration files.
#[derive(Debug)]
pub enum LoadError {
    /// IO error while reading the file.
    Io(std::io::Error),
    /// The file is not valid YAML or is missing required fields.
    Parse(serde_yaml::Error),
    /// The parsed model failed graph validation.
    Graph(GraphError),
    /// The model uses time units other than generations.
    UnsupportedTimeUnits(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Graph(e) => write!(f, "Invalid demographic model: {e}"),
            Self::UnsupportedTimeUnits(units) => write!(
                f,
                "Unsupported time units '{units}': only 'generations' is supported"
            ),
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Graph(e) => Some(e),
            Self::UnsupportedTimeUnits(_) => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for LoadError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<GraphError> for LoadError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

/// Errors that can occur during simulation building.
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// No demographic graph was supplied.
    MissingGraph,
    /// Mutation rate outside [0, 1].
    InvalidMutationRate(f64),
    /// An initial or introduction frequency outside [0, 1].
    InvalidFrequency { allele: String, value: f64 },
    /// Initial frequencies sum to a non-positive total.
    FrequencySum(f64),
    /// The wild-type allele is not part of the potential-allele set.
    UnknownWildType(String),
    /// An introduction entry names an allele outside the potential set.
    UnknownIntroductionAllele(String),
    /// An introduction entry has a negative or non-finite start time.
    InvalidIntroductionTime { allele: String, time: f64 },
    /// Removing scheduled-future alleles left no active allele.
    NoActiveAlleles,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGraph => write!(f, "Missing required parameter: demographic graph"),
            Self::InvalidMutationRate(mu) => write!(
                f,
                "Invalid mutation rate: {mu} (must be between 0.0 and 1.0)"
            ),
            Self::InvalidFrequency { allele, value } => write!(
                f,
                "Invalid frequency {value} for allele '{allele}' (must be between 0.0 and 1.0)"
            ),
            Self::FrequencySum(sum) => write!(
                f,
                "Initial allele frequencies sum to {sum}, expected a positive total"
            ),
            Self::UnknownWildType(allele) => write!(
                f,
                "Wild-type allele '{allele}' is not in the potential-allele set"
            ),
            Self::UnknownIntroductionAllele(allele) => write!(
                f,
                "Allele '{allele}' is scheduled for introduction but not in the potential-allele set"
            ),
            Self::InvalidIntroductionTime { allele, time } => write!(
                f,
                "Invalid introduction time {time} for allele '{allele}'"
            ),
            Self::NoActiveAlleles => write!(
                f,
                "Every potential allele is scheduled for future introduction; no allele is active at the start"
            ),
        }
    }
}

impl error::Error for BuilderError {}
