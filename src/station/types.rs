//! Core station types: statuses, issues, panels, aggregates, and sensor records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Health status shared by panels and every aggregate above them.
///
/// Variants are ordered by severity, so the worst status of a set is its
/// maximum: `Fault > Warning > Normal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Normal,
    Warning,
    Fault,
}

impl Status {
    /// Returns the dominant status of a set (fault > warning > normal).
    ///
    /// An empty set is `Normal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pv_station_sim::station::types::Status;
    ///
    /// let worst = Status::worst([Status::Normal, Status::Fault, Status::Warning]);
    /// assert_eq!(worst, Status::Fault);
    /// assert_eq!(Status::worst([]), Status::Normal);
    /// ```
    pub fn worst<I: IntoIterator<Item = Status>>(statuses: I) -> Status {
        statuses.into_iter().max().unwrap_or_default()
    }

    /// Lowercase label used in exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Fault => "fault",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Panel-level condition label.
///
/// Critical issues zero the panel's output; warnings derate either voltage
/// or current depending on their physical cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Issue {
    #[serde(rename = "Arc Fault")]
    ArcFault,
    #[serde(rename = "Ground Fault")]
    GroundFault,
    #[serde(rename = "Diode Failure")]
    DiodeFailure,
    #[serde(rename = "Partial Shading")]
    PartialShading,
    #[serde(rename = "Uneven Soiling")]
    UnevenSoiling,
    #[serde(rename = "PID Warning")]
    PidWarning,
    #[serde(rename = "IR Hotspot")]
    IrHotspot,
}

impl Issue {
    /// Issues drawn by the critical-fault branch of the injection policy.
    pub const CRITICAL: [Issue; 3] = [Issue::ArcFault, Issue::GroundFault, Issue::DiodeFailure];

    /// Issues drawn by the warning branch of the injection policy.
    pub const WARNINGS: [Issue; 4] = [
        Issue::PartialShading,
        Issue::UnevenSoiling,
        Issue::PidWarning,
        Issue::IrHotspot,
    ];

    /// Status a panel carrying this issue reports.
    pub fn status(self) -> Status {
        match self {
            Issue::ArcFault | Issue::GroundFault | Issue::DiodeFailure => Status::Fault,
            Issue::PartialShading | Issue::UnevenSoiling | Issue::PidWarning | Issue::IrHotspot => {
                Status::Warning
            }
        }
    }

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Issue::ArcFault => "Arc Fault",
            Issue::GroundFault => "Ground Fault",
            Issue::DiodeFailure => "Diode Failure",
            Issue::PartialShading => "Partial Shading",
            Issue::UnevenSoiling => "Uneven Soiling",
            Issue::PidWarning => "PID Warning",
            Issue::IrHotspot => "IR Hotspot",
        }
    }

    /// Applies this issue's electrical effect to a `(voltage, current)` reading.
    ///
    /// Shading and soiling reduce current, PID and hotspots reduce voltage,
    /// critical faults zero both.
    pub fn derate(self, voltage_v: f64, current_a: f64) -> (f64, f64) {
        match self {
            Issue::ArcFault | Issue::GroundFault | Issue::DiodeFailure => (0.0, 0.0),
            Issue::PartialShading => (voltage_v, current_a * 0.60),
            Issue::UnevenSoiling => (voltage_v, current_a * 0.85),
            Issue::PidWarning => (voltage_v * 0.80, current_a),
            Issue::IrHotspot => (voltage_v * 0.92, current_a),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One populated slot of a zone grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Unique key, `<string id>-<panel id>`.
    pub key: String,
    /// Owning string id (e.g. `STR-01-03`).
    pub string_id: String,
    /// Position within the string (e.g. `P-07`).
    pub panel_id: String,
    /// Owning inverter id (e.g. `INV-01-02`).
    pub inverter_id: String,
    /// Owning zone id.
    pub zone_id: String,
    /// Owning zone display name.
    pub zone_name: String,
    /// Grid row.
    pub row: usize,
    /// Grid column.
    pub col: usize,
    /// 1-based row-major visit order among populated cells of the zone.
    pub sequence: usize,
    pub status: Status,
    pub issue: Option<Issue>,
    /// DC voltage (V).
    #[serde(rename = "v")]
    pub voltage_v: f64,
    /// DC current (A).
    #[serde(rename = "c")]
    pub current_a: f64,
}

impl Panel {
    /// Instantaneous DC power in watts.
    pub fn power_w(&self) -> f64 {
        self.voltage_v * self.current_a
    }
}

/// Row-major zone grid; `None` marks a void cell (road, corner, gap).
pub type PanelGrid = Vec<Vec<Option<Panel>>>;

/// Generated layout of one zone: the spatial grid plus its flat panel list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneLayout {
    #[serde(rename = "id")]
    pub zone_id: String,
    #[serde(rename = "name")]
    pub zone_name: String,
    pub matrix: PanelGrid,
    /// Populated panels in row-major order.
    #[serde(skip)]
    pub panels: Vec<Panel>,
    pub module_count: usize,
}

/// Series string: every panel sharing one string id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringSummary {
    pub id: String,
    pub inverter_id: String,
    pub zone_id: String,
    pub zone_name: String,
    pub status: Status,
    /// Representative issue: the first panel carrying the string's status.
    pub issue: Option<Issue>,
    /// Sum of panel V×I (kW).
    pub power_kw: f64,
    pub panels: Vec<Panel>,
}

/// Inverter aggregate over the strings wired to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InverterSummary {
    pub id: String,
    pub zone_id: String,
    pub zone_name: String,
    /// Rated capacity share (kW).
    pub capacity: f64,
    /// Σ panel V×I (kW), rounded to one decimal.
    pub current_power: f64,
    /// Conversion efficiency (%), indexed by status.
    pub efficiency: f64,
    /// Heatsink temperature (°C).
    pub temp: f64,
    pub status: Status,
    pub string_count: usize,
    pub panel_count: usize,
}

impl fmt::Display for InverterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<6} {:>7.1} / {:>6.1} kW  eff={:>5.1}%  temp={:>5.1}°C  strings={:>3}  {}",
            self.id,
            self.zone_id,
            self.current_power,
            self.capacity,
            self.efficiency,
            self.temp,
            self.string_count,
            self.status,
        )
    }
}

/// Field overview entry for one zone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
    /// Σ panel V×I (kW), unrounded.
    pub power: f64,
    /// Capacity-factor estimate from irradiance and temperature (kW).
    pub expected_power: f64,
    /// Rated capacity (kW).
    pub capacity: f64,
    pub module_count: usize,
    pub inverter_count: usize,
    pub warning_count: usize,
    pub fault_count: usize,
    pub status: Status,
    /// Map pin position (% of width).
    pub x: f64,
    /// Map pin position (% of height).
    pub y: f64,
}

impl fmt::Display for ZoneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} {:<18} {:>8.2} kW (expected {:>6.1}, rated {:>6.1}) | modules={:>4} warn={:>3} fault={:>3} | {}",
            self.id,
            self.name,
            self.power,
            self.expected_power,
            self.capacity,
            self.module_count,
            self.warning_count,
            self.fault_count,
            self.status,
        )
    }
}

/// Sensor classification level used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorLevel {
    Environmental,
    Module,
    #[serde(rename = "String/DC")]
    StringDc,
    #[serde(rename = "Inverter/AC")]
    InverterAc,
    Security,
}

/// Sensor reading: numeric measurement or a state word such as `DETECTED`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Text(String),
}

/// One entry of the sensor list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub id: String,
    pub level: SensorLevel,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: SensorValue,
    pub unit: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    /// String or inverter id this record was derived from; `None` for base sensors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

/// Value-with-unit KPI tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiValue {
    pub value: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub temp: f64,
    pub condition: String,
}

/// Station headline KPIs.
///
/// Only `power` is derived from the panel model; the rest is static context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationKpi {
    pub power: KpiValue,
    pub daily_energy: KpiValue,
    pub co2: KpiValue,
    pub safety_days: u32,
    pub weather: Weather,
}

/// One point of the intraday power trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrendPoint {
    /// Clock label (`HH:MM`).
    pub time: String,
    /// Station output at that time (kW).
    #[serde(rename = "power", alias = "power_kw")]
    pub power_kw: f64,
}
