//! Synthetic PV station telemetry: zone grids, fault injection, and
//! consistent string/inverter/zone/sensor views over one panel set.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
/// Generation pipeline, aggregates, and the snapshot query surface.
pub mod station;

pub use config::{ConfigError, StationConfig};
pub use error::StationError;
pub use station::{StationSnapshot, StationStore};
