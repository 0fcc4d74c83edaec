/// Aggregation of panels into strings, inverters, and zones.
pub mod aggregate;
pub mod faults;
/// Zone grid generation.
pub mod grid;
pub mod ids;
/// Sensor list derivation.
pub mod sensors;
pub mod snapshot;
/// Copy-and-swap holder for the current snapshot.
pub mod store;
pub mod types;

pub use snapshot::{StationOverview, StationSnapshot};
pub use store::StationStore;

/// Rounds `value` to `places` decimal places.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}
