//! Roll-up of the frozen panel set into strings, inverters, zones, and the station.
//!
//! Every aggregate is computed from the stored panel readings only, so power
//! is conserved across levels: a string's kW is the sum of its panels, an
//! inverter's is the sum of its strings, and so on up to the station total.

use std::collections::HashMap;

use crate::config::{FaultConfig, ZoneConfig};

use super::ids;
use super::round_dp;
use super::types::{InverterSummary, Panel, Status, StringSummary, ZoneLayout, ZoneSummary};

/// Inverter efficiency reported while all its panels are normal (%).
pub const EFFICIENCY_NORMAL_PCT: f64 = 98.5;
/// Inverter efficiency reported while any panel is in warning (%).
pub const EFFICIENCY_WARNING_PCT: f64 = 95.0;
/// Inverter efficiency reported while any panel is faulted (%).
pub const EFFICIENCY_FAULT_PCT: f64 = 0.0;

/// Reference irradiance for the capacity-factor estimate (W/m²).
const STC_IRRADIANCE_W_M2: f64 = 1000.0;
/// Cell temperature above which thermal derating starts (°C).
const STC_TEMPERATURE_C: f64 = 25.0;
/// Fractional output lost per degree above [`STC_TEMPERATURE_C`].
const THERMAL_LOSS_PER_C: f64 = 0.004;
/// Cable and conversion losses.
const SYSTEM_EFFICIENCY: f64 = 0.96;

/// Efficiency constant for an inverter in the given status.
pub fn efficiency_for(status: Status) -> f64 {
    match status {
        Status::Normal => EFFICIENCY_NORMAL_PCT,
        Status::Warning => EFFICIENCY_WARNING_PCT,
        Status::Fault => EFFICIENCY_FAULT_PCT,
    }
}

/// Σ V×I over a panel set, in kW.
pub fn panels_power_kw<'a, I: IntoIterator<Item = &'a Panel>>(panels: I) -> f64 {
    panels.into_iter().map(Panel::power_w).sum::<f64>() / 1000.0
}

/// Capacity-factor power estimate for a zone (kW, one decimal).
///
/// `capacity × irradiance/1000 × (1 − 0.4%/°C above 25 °C) × 0.96`, floored at zero.
pub fn expected_power_kw(capacity_kw: f64, irradiance_w_m2: f64, temperature_c: f64) -> f64 {
    let sun_factor = irradiance_w_m2 / STC_IRRADIANCE_W_M2;
    let heat_loss = (temperature_c - STC_TEMPERATURE_C).max(0.0) * THERMAL_LOSS_PER_C;
    let output = capacity_kw * sun_factor * (1.0 - heat_loss) * SYSTEM_EFFICIENCY;
    round_dp(output.max(0.0), 1)
}

/// Groups a zone's panels into strings, in order of first appearance.
///
/// String status is the worst panel status; the representative issue is the
/// issue of the first panel carrying that status.
pub fn summarize_strings(layout: &ZoneLayout) -> Vec<StringSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut strings: Vec<StringSummary> = Vec::new();

    for panel in &layout.panels {
        let slot = *index.entry(panel.string_id.as_str()).or_insert_with(|| {
            strings.push(StringSummary {
                id: panel.string_id.clone(),
                inverter_id: panel.inverter_id.clone(),
                zone_id: layout.zone_id.clone(),
                zone_name: layout.zone_name.clone(),
                status: Status::Normal,
                issue: None,
                power_kw: 0.0,
                panels: Vec::new(),
            });
            strings.len() - 1
        });
        strings[slot].panels.push(panel.clone());
    }

    for s in &mut strings {
        s.status = Status::worst(s.panels.iter().map(|p| p.status));
        s.issue = s
            .panels
            .iter()
            .find(|p| p.status == s.status)
            .and_then(|p| p.issue);
        s.power_kw = panels_power_kw(&s.panels);
    }
    strings
}

/// Builds one summary per configured inverter of a zone.
///
/// Inverters that received no string (more inverters than strings) report
/// zero power and `Normal` status.
pub fn summarize_inverters(
    zone: &ZoneConfig,
    strings: &[StringSummary],
    temp_offset_c: f64,
) -> Vec<InverterSummary> {
    let suffix = ids::zone_suffix(&zone.id).unwrap_or(&zone.id);

    (0..zone.inverter_count)
        .map(|idx| {
            let id = ids::inverter_id(suffix, idx);
            let wired: Vec<&StringSummary> =
                strings.iter().filter(|s| s.inverter_id == id).collect();
            let panels = || wired.iter().flat_map(|s| s.panels.iter());

            let status = Status::worst(panels().map(|p| p.status));
            InverterSummary {
                zone_id: zone.id.clone(),
                zone_name: zone.name.clone(),
                capacity: round_dp(zone.inverter_capacity_kw(), 1),
                current_power: round_dp(panels_power_kw(panels()), 1),
                efficiency: efficiency_for(status),
                temp: round_dp(zone.temperature_c + temp_offset_c, 1),
                status,
                string_count: wired.len(),
                panel_count: panels().count(),
                id,
            }
        })
        .collect()
}

/// Builds the field-overview entry of a zone.
///
/// Status is `Fault` if any panel or inverter faults; `Warning` if the
/// warning-panel fraction exceeds the configured threshold or the zone has a
/// standing bias (dusty or hot); otherwise `Normal`.
pub fn summarize_zone(
    zone: &ZoneConfig,
    layout: &ZoneLayout,
    inverters: &[InverterSummary],
    faults: &FaultConfig,
) -> ZoneSummary {
    let warning_count = layout
        .panels
        .iter()
        .filter(|p| p.status == Status::Warning)
        .count();
    let fault_count = layout
        .panels
        .iter()
        .filter(|p| p.status == Status::Fault)
        .count();
    let inverter_fault = inverters.iter().any(|i| i.status == Status::Fault);

    let warning_fraction = if layout.module_count > 0 {
        warning_count as f64 / layout.module_count as f64
    } else {
        0.0
    };

    let status = if fault_count > 0 || inverter_fault {
        Status::Fault
    } else if warning_fraction > faults.warning_fraction_threshold
        || zone.has_warning_bias(faults)
    {
        Status::Warning
    } else {
        Status::Normal
    };

    ZoneSummary {
        id: zone.id.clone(),
        name: zone.name.clone(),
        power: panels_power_kw(&layout.panels),
        expected_power: expected_power_kw(zone.capacity_kw, zone.irradiance_w_m2, zone.temperature_c),
        capacity: zone.capacity_kw,
        module_count: layout.module_count,
        inverter_count: zone.inverter_count,
        warning_count,
        fault_count,
        status,
        x: zone.map_x,
        y: zone.map_y,
    }
}

/// Station total power (kW): the sum of every zone's power.
pub fn station_power_kw(zones: &[ZoneSummary]) -> f64 {
    zones.iter().map(|z| z.power).sum()
}
