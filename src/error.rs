//! Error taxonomy for station generation and queries.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by generation and by id-based queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StationError {
    /// The configuration failed validation; generation was refused.
    #[error("invalid configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),
    #[error("zone not found: {0}")]
    ZoneNotFound(String),
    #[error("inverter not found: {0}")]
    InverterNotFound(String),
    #[error("string not found: {0}")]
    StringNotFound(String),
    /// Random gaps left a zone without a single panel.
    #[error("zone {zone} has no panels with seed {seed}")]
    EmptyZone { zone: String, seed: u64 },
    /// A cross-level invariant does not hold.
    #[error("inconsistent station data: {0}")]
    Inconsistent(String),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ConfigError>> for StationError {
    fn from(errors: Vec<ConfigError>) -> Self {
        StationError::InvalidConfig(errors)
    }
}

impl From<ConfigError> for StationError {
    fn from(error: ConfigError) -> Self {
        StationError::InvalidConfig(vec![error])
    }
}
