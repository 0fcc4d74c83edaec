//! Sensor list synthesized from the frozen aggregates.
//!
//! Base sensors describe site context and are always present. Every
//! non-normal string yields one record per distinct issue among the panels
//! that carry its status, and every non-normal inverter yields one
//! efficiency record.

use crate::config::StationConfig;

use super::ids;
use super::types::{
    InverterSummary, Issue, SensorLevel, SensorRecord, SensorValue, Status, StringSummary,
};

/// How an issue shows up in the sensor list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssueSensor {
    pub level: SensorLevel,
    /// Short id code (`S-<code>-<target>`).
    pub code: &'static str,
    pub kind: &'static str,
    pub label: &'static str,
    pub value: IssueReading,
    pub unit: &'static str,
}

/// Fixed representative reading of an issue sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IssueReading {
    Number(f64),
    State(&'static str),
}

impl From<IssueReading> for SensorValue {
    fn from(reading: IssueReading) -> Self {
        match reading {
            IssueReading::Number(v) => SensorValue::Number(v),
            IssueReading::State(s) => SensorValue::Text(s.to_string()),
        }
    }
}

/// Sensor mapping for an issue label.
pub fn issue_sensor(issue: Issue) -> IssueSensor {
    let (level, code, kind, label, value, unit) = match issue {
        Issue::ArcFault => (
            SensorLevel::StringDc,
            "ARC",
            "arc",
            "Arc Detector",
            IssueReading::State("DETECTED"),
            "",
        ),
        Issue::GroundFault => (
            SensorLevel::StringDc,
            "ISO",
            "insulation",
            "Insulation Resistance",
            IssueReading::Number(0.3),
            "MΩ",
        ),
        Issue::DiodeFailure => (
            SensorLevel::Module,
            "DIO",
            "bypass_diode",
            "Bypass Diode",
            IssueReading::State("OPEN"),
            "",
        ),
        Issue::PartialShading => (
            SensorLevel::StringDc,
            "CUR",
            "current_mismatch",
            "String Current Mismatch",
            IssueReading::Number(18.0),
            "%",
        ),
        Issue::UnevenSoiling => (
            SensorLevel::Module,
            "SOI",
            "soiling",
            "Soiling Ratio",
            IssueReading::Number(7.5),
            "%",
        ),
        Issue::PidWarning => (
            SensorLevel::Module,
            "PID",
            "pid",
            "PID Leakage",
            IssueReading::Number(12.0),
            "%",
        ),
        Issue::IrHotspot => (
            SensorLevel::Module,
            "HOT",
            "thermal",
            "IR Thermal",
            IssueReading::Number(85.0),
            "°C",
        ),
    };
    IssueSensor {
        level,
        code,
        kind,
        label,
        value,
        unit,
    }
}

/// Builds the full sensor list: base sensors, then string issues, then inverters.
pub fn derive_sensors(
    config: &StationConfig,
    strings: &[StringSummary],
    inverters: &[InverterSummary],
) -> Vec<SensorRecord> {
    let mut sensors = base_sensors(config);

    for s in strings.iter().filter(|s| s.status != Status::Normal) {
        for issue in string_issues(s) {
            let mapping = issue_sensor(issue);
            sensors.push(SensorRecord {
                id: format!("S-{}-{}", mapping.code, s.id),
                level: mapping.level,
                name: format!("{} ({})", mapping.label, s.id),
                kind: mapping.kind.to_string(),
                value: mapping.value.into(),
                unit: mapping.unit.to_string(),
                status: s.status,
                zone_id: Some(s.zone_id.clone()),
                target_id: Some(s.id.clone()),
            });
        }
    }

    for inv in inverters.iter().filter(|i| i.status != Status::Normal) {
        sensors.push(SensorRecord {
            id: format!("S-EFF-{}", inv.id),
            level: SensorLevel::InverterAc,
            name: format!("Conversion Efficiency ({})", inv.id),
            kind: "efficiency".to_string(),
            value: SensorValue::Number(inv.efficiency),
            unit: "%".to_string(),
            status: inv.status,
            zone_id: Some(inv.zone_id.clone()),
            target_id: Some(inv.id.clone()),
        });
    }

    sensors
}

/// Distinct issues among the panels carrying the string's status, in panel order.
///
/// Lower-severity issues are left out: their sensor would report a status
/// the string does not have.
pub fn string_issues(string: &StringSummary) -> Vec<Issue> {
    let mut issues = Vec::new();
    for issue in string
        .panels
        .iter()
        .filter(|p| p.status == string.status)
        .filter_map(|p| p.issue)
    {
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }
    issues
}

fn base_sensors(config: &StationConfig) -> Vec<SensorRecord> {
    let mut sensors = Vec::with_capacity(config.zones.len() * 3 + 4);

    for zone in &config.zones {
        let suffix = ids::zone_suffix(&zone.id).unwrap_or(&zone.id);
        let hot = zone.temperature_c > config.faults.hot_temperature_c;
        let mut push = |code: &str, label: &str, kind: &str, value: f64, unit: &str, status| {
            sensors.push(SensorRecord {
                id: format!("S-{code}-{suffix}"),
                level: SensorLevel::Environmental,
                name: format!("{label} ({})", zone.name),
                kind: kind.to_string(),
                value: SensorValue::Number(value),
                unit: unit.to_string(),
                status,
                zone_id: Some(zone.id.clone()),
                target_id: None,
            });
        };
        push("IRR", "Irradiance", "irradiance", zone.irradiance_w_m2, "W/m²", Status::Normal);
        push(
            "TMP",
            "Module Temp",
            "temperature",
            zone.temperature_c,
            "°C",
            if hot { Status::Warning } else { Status::Normal },
        );
        push("WND", "Wind Speed", "wind", zone.wind_speed_m_s, "m/s", Status::Normal);
    }

    let dusty = config.zones.iter().any(|z| z.dusty);
    let station = |id: &str, level, name: &str, kind: &str, value, unit: &str, status| SensorRecord {
        id: id.to_string(),
        level,
        name: name.to_string(),
        kind: kind.to_string(),
        value,
        unit: unit.to_string(),
        status,
        zone_id: None,
        target_id: None,
    };

    sensors.push(station(
        "S-DST-ST",
        SensorLevel::Environmental,
        "Dust Concentration",
        "dust",
        SensorValue::Number(config.sensors.dust_mg_m3),
        "mg/m³",
        if dusty { Status::Warning } else { Status::Normal },
    ));
    sensors.push(station(
        "S-AZI-ST",
        SensorLevel::Environmental,
        "Tracker Azimuth",
        "azimuth",
        SensorValue::Number(config.sensors.tracker_azimuth_deg),
        "°",
        Status::Normal,
    ));
    sensors.push(station(
        "S-FIRE-ST",
        SensorLevel::Security,
        "Fire Detection",
        "fire",
        SensorValue::Text("CLEAR".to_string()),
        "",
        Status::Normal,
    ));
    sensors.push(station(
        "S-SEC-ST",
        SensorLevel::Security,
        "Perimeter Intrusion",
        "perimeter",
        SensorValue::Text("SECURE".to_string()),
        "",
        Status::Normal,
    ));

    sensors
}
