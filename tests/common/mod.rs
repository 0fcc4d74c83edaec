//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use pv_station_sim::StationConfig;
use pv_station_sim::station::StationSnapshot;

/// Seeds used by property-style tests.
pub const SEEDS: [u64; 6] = [0, 1, 7, 42, 1234, 987_654_321];

/// Every built-in preset.
pub fn presets() -> Vec<(&'static str, StationConfig)> {
    StationConfig::PRESETS
        .iter()
        .map(|&name| (name, StationConfig::from_preset(name).unwrap()))
        .collect()
}

/// Generates `config` with a fixed seed as generation 1.
pub fn generate(config: &StationConfig, seed: u64) -> StationSnapshot {
    StationSnapshot::generate(config, seed, 1).unwrap()
}

/// Baseline preset generated with `seed`.
pub fn baseline(seed: u64) -> StationSnapshot {
    generate(&StationConfig::baseline(), seed)
}

/// Path of a TOML file under `scenarios/`.
pub fn scenario_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}
