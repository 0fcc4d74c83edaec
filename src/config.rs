//! TOML-based station configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::station::grid::usable_cells;
use crate::station::ids::zone_suffix;
use crate::station::types::{Issue, TrendPoint};

/// Top-level station configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`StationConfig::from_toml_file`] or use
/// [`StationConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    /// Generation parameters (seed, string size, terrain gaps).
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Fault/warning injection policy.
    #[serde(default)]
    pub faults: FaultConfig,
    /// Field zones, in display order.
    #[serde(default = "default_zones")]
    pub zones: Vec<ZoneConfig>,
    /// Static station KPIs.
    #[serde(default)]
    pub station: StationInfoConfig,
    /// Context values for the always-present base sensors.
    #[serde(default)]
    pub sensors: SensorContextConfig,
}

/// Generation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Random seed; `None` draws one from the OS and records it in the snapshot.
    pub seed: Option<u64>,
    /// Panels wired in series per string (must be > 0).
    pub panels_per_string: usize,
    /// Chance that an otherwise usable cell is left empty (0.0–1.0).
    pub random_void_probability: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            panels_per_string: 20,
            random_void_probability: 0.0,
        }
    }
}

/// Fault/warning injection policy parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaultConfig {
    /// Enables probabilistic injection. Scripted overrides apply regardless.
    pub enabled: bool,
    /// Per-panel chance of a critical fault.
    pub fault_probability: f64,
    /// Per-panel chance of a warning.
    pub warning_probability: f64,
    /// Extra per-panel chance of soiling in zones flagged `dusty`.
    pub dusty_soiling_probability: f64,
    /// Warning-panel fraction above which a zone reports `warning`.
    pub warning_fraction_threshold: f64,
    /// Ambient temperature above which a zone reports `warning` (°C).
    pub hot_temperature_c: f64,
    /// Strings forced into a given condition.
    pub scripted: Vec<ScriptedFault>,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fault_probability: 0.002,
            warning_probability: 0.03,
            dusty_soiling_probability: 0.08,
            warning_fraction_threshold: 0.05,
            hot_temperature_c: 60.0,
            scripted: Vec::new(),
        }
    }
}

/// A string forced into a fixed condition for reproducible demos.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedFault {
    /// Target string id (e.g. `STR-01-03`).
    pub string_id: String,
    /// Issue applied to every panel of the string.
    pub issue: Issue,
}

impl ScriptedFault {
    pub fn new(string_id: &str, issue: Issue) -> Self {
        Self {
            string_id: string_id.to_string(),
            issue,
        }
    }
}

/// One geographic field zone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    /// Stable short code, `<letters>-<digits>` (e.g. `Z-01`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rated capacity (kW).
    pub capacity_kw: f64,
    /// Grid rows (must be > 0).
    pub rows: usize,
    /// Grid columns (must be > 0).
    pub cols: usize,
    /// Number of inverters (must be >= 1).
    pub inverter_count: usize,
    /// Plane-of-array irradiance (W/m²).
    #[serde(default = "default_irradiance")]
    pub irradiance_w_m2: f64,
    /// Ambient temperature (°C).
    #[serde(default = "default_temperature")]
    pub temperature_c: f64,
    /// Wind speed (m/s).
    #[serde(default)]
    pub wind_speed_m_s: f64,
    /// Map pin x position (% of width).
    #[serde(default = "default_map_pos")]
    pub map_x: f64,
    /// Map pin y position (% of height).
    #[serde(default = "default_map_pos")]
    pub map_y: f64,
    /// Dusty zone: extra soiling chance and a standing warning.
    #[serde(default)]
    pub dusty: bool,
}

fn default_irradiance() -> f64 {
    1000.0
}

fn default_temperature() -> f64 {
    25.0
}

fn default_map_pos() -> f64 {
    50.0
}

impl ZoneConfig {
    #[expect(clippy::too_many_arguments)]
    fn field(
        id: &str,
        name: &str,
        capacity_kw: f64,
        (rows, cols): (usize, usize),
        inverter_count: usize,
        (irradiance_w_m2, temperature_c, wind_speed_m_s): (f64, f64, f64),
        (map_x, map_y): (f64, f64),
        dusty: bool,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            capacity_kw,
            rows,
            cols,
            inverter_count,
            irradiance_w_m2,
            temperature_c,
            wind_speed_m_s,
            map_x,
            map_y,
            dusty,
        }
    }

    /// Whether the zone carries a standing warning regardless of panel state.
    pub fn has_warning_bias(&self, faults: &FaultConfig) -> bool {
        self.dusty || self.temperature_c > faults.hot_temperature_c
    }

    /// Capacity share of each inverter (kW).
    pub fn inverter_capacity_kw(&self) -> f64 {
        self.capacity_kw / self.inverter_count.max(1) as f64
    }
}

/// The four fields of the baseline station.
fn default_zones() -> Vec<ZoneConfig> {
    vec![
        ZoneConfig::field(
            "Z-01",
            "North-West Field",
            500.0,
            (12, 24),
            2,
            (950.0, 32.0, 5.5),
            (20.0, 30.0),
            false,
        ),
        ZoneConfig::field(
            "Z-02",
            "North-East Field",
            500.0,
            (12, 24),
            2,
            (960.0, 68.0, 1.2),
            (70.0, 25.0),
            false,
        ),
        ZoneConfig::field(
            "Z-03",
            "South-West Field",
            300.0,
            (10, 20),
            3,
            (350.0, 24.0, 8.0),
            (30.0, 70.0),
            false,
        ),
        ZoneConfig::field(
            "Z-04",
            "South-East Field",
            200.0,
            (8, 18),
            2,
            (880.0, 29.0, 4.5),
            (65.0, 65.0),
            true,
        ),
    ]
}

/// Static station KPIs that are not derived from the panel model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationInfoConfig {
    /// Energy produced today (kWh).
    pub daily_energy_kwh: f64,
    /// Grid emission factor used for CO₂ avoided (kg/kWh).
    pub co2_factor_kg_per_kwh: f64,
    /// Days without a safety incident.
    pub safety_days: u32,
    /// Site weather temperature (°C).
    pub weather_temp_c: f64,
    /// Site weather description.
    pub weather_condition: String,
    /// Intraday station output trend.
    pub trend: Vec<TrendPoint>,
}

impl Default for StationInfoConfig {
    fn default() -> Self {
        let trend = [
            ("06:00", 0.0),
            ("08:00", 120.0),
            ("10:00", 450.0),
            ("12:00", 980.0),
            ("14:00", 850.0),
            ("16:00", 340.0),
            ("18:00", 50.0),
            ("20:00", 0.0),
        ]
        .into_iter()
        .map(|(time, power_kw)| TrendPoint {
            time: time.to_string(),
            power_kw,
        })
        .collect();

        Self {
            daily_energy_kwh: 1250.0,
            co2_factor_kg_per_kwh: 0.68,
            safety_days: 124,
            weather_temp_c: 24.0,
            weather_condition: "Sunny".to_string(),
            trend,
        }
    }
}

/// Context values for the base environmental and security sensors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorContextConfig {
    /// Airborne dust concentration (mg/m³).
    pub dust_mg_m3: f64,
    /// Tracker azimuth (degrees).
    pub tracker_azimuth_deg: f64,
    /// Inverter heatsink offset above zone ambient (°C).
    pub inverter_temp_offset_c: f64,
}

impl Default for SensorContextConfig {
    fn default() -> Self {
        Self {
            dust_mg_m3: 0.35,
            tracker_azimuth_deg: 182.0,
            inverter_temp_offset_c: 5.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"zones[0].inverter_count"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl StationConfig {
    /// Returns the baseline station: the hot north-east field, the dusty
    /// south-east field, and two scripted string faults.
    pub fn baseline() -> Self {
        Self {
            generation: GenerationConfig::default(),
            faults: FaultConfig {
                scripted: vec![
                    ScriptedFault::new("STR-01-03", Issue::ArcFault),
                    ScriptedFault::new("STR-04-02", Issue::GroundFault),
                ],
                ..FaultConfig::default()
            },
            zones: default_zones(),
            station: StationInfoConfig::default(),
            sensors: SensorContextConfig::default(),
        }
    }

    /// Returns the clean preset: no injected or scripted issues, mild weather.
    pub fn clean() -> Self {
        let zones = default_zones()
            .into_iter()
            .map(|z| ZoneConfig {
                temperature_c: z.temperature_c.min(35.0),
                dusty: false,
                ..z
            })
            .collect();
        Self {
            generation: GenerationConfig::default(),
            faults: FaultConfig {
                enabled: false,
                ..FaultConfig::default()
            },
            zones,
            station: StationInfoConfig::default(),
            sensors: SensorContextConfig {
                dust_mg_m3: 0.05,
                ..SensorContextConfig::default()
            },
        }
    }

    /// Returns the stress preset: frequent faults, gaps in the field, extra scripted issues.
    pub fn stress() -> Self {
        Self {
            generation: GenerationConfig {
                random_void_probability: 0.03,
                ..GenerationConfig::default()
            },
            faults: FaultConfig {
                fault_probability: 0.01,
                warning_probability: 0.08,
                dusty_soiling_probability: 0.2,
                scripted: vec![
                    ScriptedFault::new("STR-01-03", Issue::ArcFault),
                    ScriptedFault::new("STR-02-01", Issue::IrHotspot),
                    ScriptedFault::new("STR-03-02", Issue::PidWarning),
                    ScriptedFault::new("STR-04-02", Issue::GroundFault),
                ],
                ..FaultConfig::default()
            },
            zones: default_zones(),
            station: StationInfoConfig {
                safety_days: 3,
                ..StationInfoConfig::default()
            },
            sensors: SensorContextConfig {
                dust_mg_m3: 1.2,
                ..SensorContextConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "clean", "stress"];

    /// Loads a station from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "clean" => Ok(Self::clean()),
            "stress" => Ok(Self::stress()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a station from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a station from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.generation;
        if g.panels_per_string == 0 {
            errors.push(ConfigError::new(
                "generation.panels_per_string",
                "must be > 0",
            ));
        }
        check_probability(
            &mut errors,
            "generation.random_void_probability",
            g.random_void_probability,
        );
        if g.random_void_probability >= 1.0 {
            errors.push(ConfigError::new(
                "generation.random_void_probability",
                "must be < 1.0 or no panel can be placed",
            ));
        }

        let f = &self.faults;
        check_probability(&mut errors, "faults.fault_probability", f.fault_probability);
        check_probability(
            &mut errors,
            "faults.warning_probability",
            f.warning_probability,
        );
        check_probability(
            &mut errors,
            "faults.dusty_soiling_probability",
            f.dusty_soiling_probability,
        );
        check_probability(
            &mut errors,
            "faults.warning_fraction_threshold",
            f.warning_fraction_threshold,
        );
        if f.fault_probability + f.warning_probability > 1.0 {
            errors.push(ConfigError::new(
                "faults.warning_probability",
                "faults.fault_probability + faults.warning_probability must be <= 1.0",
            ));
        }
        let mut scripted_ids = HashSet::new();
        for (i, s) in f.scripted.iter().enumerate() {
            if !scripted_ids.insert(s.string_id.as_str()) {
                errors.push(ConfigError::new(
                    format!("faults.scripted[{i}].string_id"),
                    format!("duplicate scripted string \"{}\"", s.string_id),
                ));
            }
        }

        if self.zones.is_empty() {
            errors.push(ConfigError::new("zones", "at least one zone is required"));
        }
        let mut zone_ids = HashSet::new();
        let mut suffixes = HashSet::new();
        for (i, z) in self.zones.iter().enumerate() {
            let path = |field: &str| format!("zones[{i}].{field}");

            match zone_suffix(&z.id) {
                Some(suffix) => {
                    if !suffixes.insert(suffix) {
                        errors.push(ConfigError::new(
                            path("id"),
                            format!("numeric suffix of \"{}\" is already used", z.id),
                        ));
                    }
                }
                None => errors.push(ConfigError::new(
                    path("id"),
                    format!("must look like \"Z-01\", got \"{}\"", z.id),
                )),
            }
            if !zone_ids.insert(z.id.as_str()) {
                errors.push(ConfigError::new(
                    path("id"),
                    format!("duplicate zone id \"{}\"", z.id),
                ));
            }
            if z.name.trim().is_empty() {
                errors.push(ConfigError::new(path("name"), "must not be empty"));
            }
            if z.inverter_count == 0 {
                errors.push(ConfigError::new(path("inverter_count"), "must be >= 1"));
            }
            if z.rows == 0 {
                errors.push(ConfigError::new(path("rows"), "must be > 0"));
            }
            if z.cols == 0 {
                errors.push(ConfigError::new(path("cols"), "must be > 0"));
            }
            if z.rows > 0 && z.cols > 0 && usable_cells(z.rows, z.cols) == 0 {
                errors.push(ConfigError::new(
                    path("cols"),
                    format!(
                        "a {}x{} grid leaves no panel slot after corners and road",
                        z.rows, z.cols
                    ),
                ));
            }
            if z.capacity_kw.is_nan() || z.capacity_kw <= 0.0 {
                errors.push(ConfigError::new(path("capacity_kw"), "must be > 0"));
            }
            if z.irradiance_w_m2 < 0.0 {
                errors.push(ConfigError::new(path("irradiance_w_m2"), "must be >= 0"));
            }
        }

        errors
    }
}

fn check_probability(errors: &mut Vec<ConfigError>, field: &str, p: f64) {
    if !(0.0..=1.0).contains(&p) {
        errors.push(ConfigError::new(field, "must be in [0.0, 1.0]"));
    }
}
