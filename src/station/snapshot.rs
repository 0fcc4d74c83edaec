//! One frozen generation of the station and its read-only query surface.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::StationConfig;
use crate::error::StationError;

use super::aggregate;
use super::faults::FaultPolicy;
use super::grid;
use super::sensors;
use super::types::{
    InverterSummary, KpiValue, Panel, SensorLevel, SensorRecord, StationKpi, Status,
    StringSummary, TrendPoint, Weather, ZoneLayout, ZoneSummary,
};

/// Tolerance for power sums compared across aggregation levels (kW).
const POWER_TOLERANCE_KW: f64 = 1e-6;
/// Slack for inverter power, which is stored rounded to 0.1 kW.
const INVERTER_ROUNDING_KW: f64 = 0.05 + 1e-9;

/// Complete, immutable result of one generation run.
///
/// Every derived list is computed from the same panel set, so any two views
/// read from one snapshot agree with each other.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    generation: u64,
    seed: u64,
    layouts: Vec<ZoneLayout>,
    strings: Vec<StringSummary>,
    inverters: Vec<InverterSummary>,
    zones: Vec<ZoneSummary>,
    sensors: Vec<SensorRecord>,
    kpi: StationKpi,
    trend: Vec<TrendPoint>,
    total_power_kw: f64,
}

/// Zone grids keyed for spatial rendering.
#[derive(Debug, Serialize)]
pub struct StationMap<'a> {
    pub zones: &'a [ZoneLayout],
}

/// Station page payload: KPIs, intraday trend, and the zone map.
#[derive(Debug, Serialize)]
pub struct StationOverview<'a> {
    pub kpi: &'a StationKpi,
    pub trend: &'a [TrendPoint],
    pub map: StationMap<'a>,
}

/// Seed configured for generation, or a fresh one from the thread RNG.
pub fn resolve_seed(config: &StationConfig) -> u64 {
    config
        .generation
        .seed
        .unwrap_or_else(|| rand::rng().random())
}

impl StationSnapshot {
    /// Builds a snapshot from the configured seed (or a random one).
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidConfig`] if validation fails.
    pub fn from_config(config: &StationConfig) -> Result<Self, StationError> {
        Self::generate(config, resolve_seed(config), 0)
    }

    /// Runs the full pipeline: grids, aggregation, sensors, KPIs.
    ///
    /// # Arguments
    ///
    /// * `config` - Station configuration; validated before anything is built
    /// * `seed` - Seed for the single RNG shared by every zone, in zone order
    /// * `generation` - Version number stamped on the result
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InvalidConfig`] if validation fails, or
    /// [`StationError::EmptyZone`] if random gaps leave a zone without panels.
    pub fn generate(
        config: &StationConfig,
        seed: u64,
        generation: u64,
    ) -> Result<Self, StationError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(StationError::InvalidConfig(errors));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let policy = FaultPolicy::new(&config.faults);

        let mut layouts = Vec::with_capacity(config.zones.len());
        let mut strings = Vec::new();
        let mut inverters = Vec::new();
        let mut zones = Vec::with_capacity(config.zones.len());

        for zone in &config.zones {
            let layout = grid::generate_zone(zone, &config.generation, &policy, &mut rng);
            if layout.module_count == 0 {
                return Err(StationError::EmptyZone {
                    zone: zone.id.clone(),
                    seed,
                });
            }
            let zone_strings = aggregate::summarize_strings(&layout);
            let zone_inverters = aggregate::summarize_inverters(
                zone,
                &zone_strings,
                config.sensors.inverter_temp_offset_c,
            );
            zones.push(aggregate::summarize_zone(
                zone,
                &layout,
                &zone_inverters,
                &config.faults,
            ));
            layouts.push(layout);
            strings.extend(zone_strings);
            inverters.extend(zone_inverters);
        }

        let generated: HashSet<&str> = strings.iter().map(|s| s.id.as_str()).collect();
        for scripted in &config.faults.scripted {
            if !generated.contains(scripted.string_id.as_str()) {
                warn!(
                    string = %scripted.string_id,
                    issue = %scripted.issue,
                    "scripted issue matched no generated string"
                );
            }
        }

        let sensors = sensors::derive_sensors(config, &strings, &inverters);
        let total_power_kw = aggregate::station_power_kw(&zones);
        let kpi = station_kpi(config, total_power_kw);

        let snapshot = Self {
            generation,
            seed,
            layouts,
            strings,
            inverters,
            zones,
            sensors,
            kpi,
            trend: config.station.trend.clone(),
            total_power_kw,
        };

        info!(
            generation,
            seed,
            zones = snapshot.zones.len(),
            panels = snapshot.panels().count(),
            faults = snapshot.zones.iter().map(|z| z.fault_count).sum::<usize>(),
            warnings = snapshot.zones.iter().map(|z| z.warning_count).sum::<usize>(),
            total_kw = total_power_kw,
            "station generated"
        );
        debug_assert!(
            snapshot.check_consistency().is_ok(),
            "{:?}",
            snapshot.check_consistency()
        );

        Ok(snapshot)
    }

    /// Version number of this snapshot; later regenerations carry larger numbers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Seed the snapshot was generated from; regenerating with it reproduces the snapshot.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Flat inverter list across all zones.
    pub fn inverters(&self) -> &[InverterSummary] {
        &self.inverters
    }

    /// Flat string list across all zones, each with its panels.
    pub fn strings(&self) -> &[StringSummary] {
        &self.strings
    }

    /// Zone grids in configuration order.
    pub fn layouts(&self) -> &[ZoneLayout] {
        &self.layouts
    }

    /// Field overview: one summary per zone.
    pub fn zones(&self) -> &[ZoneSummary] {
        &self.zones
    }

    pub fn sensors(&self) -> &[SensorRecord] {
        &self.sensors
    }

    pub fn kpi(&self) -> &StationKpi {
        &self.kpi
    }

    pub fn trend(&self) -> &[TrendPoint] {
        &self.trend
    }

    /// Sum of every panel's V×I (kW).
    pub fn total_power_kw(&self) -> f64 {
        self.total_power_kw
    }

    /// All panels, zone by zone in row-major order.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.layouts.iter().flat_map(|l| l.panels.iter())
    }

    /// KPIs, trend, and zone map in one payload.
    pub fn overview(&self) -> StationOverview<'_> {
        StationOverview {
            kpi: &self.kpi,
            trend: &self.trend,
            map: StationMap {
                zones: &self.layouts,
            },
        }
    }

    /// # Errors
    ///
    /// Returns [`StationError::ZoneNotFound`] for an unknown id.
    pub fn zone(&self, id: &str) -> Result<&ZoneSummary, StationError> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or_else(|| StationError::ZoneNotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`StationError::ZoneNotFound`] for an unknown id.
    pub fn zone_layout(&self, id: &str) -> Result<&ZoneLayout, StationError> {
        self.layouts
            .iter()
            .find(|l| l.zone_id == id)
            .ok_or_else(|| StationError::ZoneNotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`StationError::InverterNotFound`] for an unknown id.
    pub fn inverter(&self, id: &str) -> Result<&InverterSummary, StationError> {
        self.inverters
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| StationError::InverterNotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`StationError::StringNotFound`] for an unknown id.
    pub fn string(&self, id: &str) -> Result<&StringSummary, StationError> {
        self.strings
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StationError::StringNotFound(id.to_string()))
    }

    /// Inverters of one zone.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::ZoneNotFound`] for an unknown zone.
    pub fn inverters_in_zone(&self, zone_id: &str) -> Result<Vec<&InverterSummary>, StationError> {
        self.zone(zone_id)?;
        Ok(self
            .inverters
            .iter()
            .filter(|i| i.zone_id == zone_id)
            .collect())
    }

    /// Strings of one zone.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::ZoneNotFound`] for an unknown zone.
    pub fn strings_in_zone(&self, zone_id: &str) -> Result<Vec<&StringSummary>, StationError> {
        self.zone(zone_id)?;
        Ok(self
            .strings
            .iter()
            .filter(|s| s.zone_id == zone_id)
            .collect())
    }

    /// Strings wired to one inverter.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::InverterNotFound`] for an unknown inverter.
    pub fn strings_for_inverter(
        &self,
        inverter_id: &str,
    ) -> Result<Vec<&StringSummary>, StationError> {
        self.inverter(inverter_id)?;
        Ok(self
            .strings
            .iter()
            .filter(|s| s.inverter_id == inverter_id)
            .collect())
    }

    pub fn sensors_at_level(&self, level: SensorLevel) -> impl Iterator<Item = &SensorRecord> {
        self.sensors.iter().filter(move |s| s.level == level)
    }

    /// Re-derives every cross-level relation from the panels and compares.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Inconsistent`] naming the first relation that
    /// does not hold.
    pub fn check_consistency(&self) -> Result<(), StationError> {
        let fail = |msg: String| Err(StationError::Inconsistent(msg));

        let mut keys = HashSet::new();
        for panel in self.panels() {
            if !keys.insert(panel.key.as_str()) {
                return fail(format!("duplicate panel key {}", panel.key));
            }
        }

        for (layout, zone) in self.layouts.iter().zip(&self.zones) {
            let populated = layout.matrix.iter().flatten().filter(|c| c.is_some()).count();
            if populated != layout.module_count || layout.panels.len() != layout.module_count {
                return fail(format!(
                    "{}: grid holds {populated} panels, list {}, count {}",
                    layout.zone_id,
                    layout.panels.len(),
                    layout.module_count
                ));
            }
            let power = aggregate::panels_power_kw(&layout.panels);
            if (power - zone.power).abs() > POWER_TOLERANCE_KW {
                return fail(format!(
                    "{}: zone power {} != panel sum {power}",
                    zone.id, zone.power
                ));
            }
            let has_fault = layout.panels.iter().any(|p| p.status == Status::Fault);
            if has_fault != (zone.status == Status::Fault) {
                return fail(format!("{}: zone status {} vs panels", zone.id, zone.status));
            }
        }

        for s in &self.strings {
            let status = Status::worst(s.panels.iter().map(|p| p.status));
            if status != s.status {
                return fail(format!("{}: status {} != worst panel {status}", s.id, s.status));
            }
            let power = aggregate::panels_power_kw(&s.panels);
            if (power - s.power_kw).abs() > POWER_TOLERANCE_KW {
                return fail(format!("{}: power {} != panel sum {power}", s.id, s.power_kw));
            }
            if s.panels.iter().any(|p| p.status == Status::Fault && p.power_w() != 0.0) {
                return fail(format!("{}: faulted panel produces power", s.id));
            }
        }

        let mut by_inverter: HashMap<&str, (f64, Status)> = HashMap::new();
        for s in &self.strings {
            let entry = by_inverter
                .entry(s.inverter_id.as_str())
                .or_insert((0.0, Status::Normal));
            entry.0 += s.power_kw;
            entry.1 = entry.1.max(s.status);
        }
        for inv in &self.inverters {
            let (power, status) = by_inverter
                .get(inv.id.as_str())
                .copied()
                .unwrap_or((0.0, Status::Normal));
            if (power - inv.current_power).abs() > INVERTER_ROUNDING_KW {
                return fail(format!(
                    "{}: power {} != string sum {power}",
                    inv.id, inv.current_power
                ));
            }
            if status != inv.status {
                return fail(format!("{}: status {} != worst string {status}", inv.id, inv.status));
            }
        }

        let zone_sum = aggregate::station_power_kw(&self.zones);
        if (zone_sum - self.total_power_kw).abs() > POWER_TOLERANCE_KW {
            return fail(format!(
                "station power {} != zone sum {zone_sum}",
                self.total_power_kw
            ));
        }

        for sensor in &self.sensors {
            let Some(target) = sensor.target_id.as_deref() else {
                continue;
            };
            let status = match sensor.level {
                SensorLevel::InverterAc => self.inverter(target).map(|i| i.status),
                _ => self.string(target).map(|s| s.status),
            };
            match status {
                Ok(status) if status == sensor.status => {}
                Ok(status) => {
                    return fail(format!(
                        "sensor {}: status {} but {target} is {status}",
                        sensor.id, sensor.status
                    ));
                }
                Err(_) => return fail(format!("sensor {}: unknown target {target}", sensor.id)),
            }
        }

        Ok(())
    }
}

fn station_kpi(config: &StationConfig, total_power_kw: f64) -> StationKpi {
    let info = &config.station;
    StationKpi {
        power: KpiValue {
            value: total_power_kw,
            unit: "kW".to_string(),
            trend: Some("up".to_string()),
        },
        daily_energy: KpiValue {
            value: info.daily_energy_kwh,
            unit: "kWh".to_string(),
            trend: None,
        },
        co2: KpiValue {
            value: info.daily_energy_kwh * info.co2_factor_kg_per_kwh,
            unit: "kg".to_string(),
            trend: None,
        },
        safety_days: info.safety_days,
        weather: Weather {
            temp: info.weather_temp_c,
            condition: info.weather_condition.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::types::Issue;

    fn baseline(seed: u64) -> StationSnapshot {
        StationSnapshot::generate(&StationConfig::baseline(), seed, 1).unwrap()
    }

    #[test]
    fn baseline_snapshot_is_consistent() {
        let snap = baseline(42);
        assert_eq!(snap.check_consistency(), Ok(()));
        assert_eq!(snap.zones().len(), 4);
        assert_eq!(snap.layouts().len(), 4);
        assert_eq!(snap.inverters().len(), 2 + 2 + 3 + 2);
        assert_eq!(snap.seed(), 42);
        assert_eq!(snap.generation(), 1);
    }

    #[test]
    fn same_seed_same_snapshot() {
        let a = baseline(7);
        let b = baseline(7);
        let panels_a: Vec<&Panel> = a.panels().collect();
        let panels_b: Vec<&Panel> = b.panels().collect();
        assert_eq!(panels_a, panels_b);
        assert_eq!(a.sensors(), b.sensors());
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut cfg = StationConfig::baseline();
        cfg.zones[1].inverter_count = 0;
        let err = StationSnapshot::generate(&cfg, 1, 1).unwrap_err();
        match err {
            StationError::InvalidConfig(errors) => {
                assert!(errors.iter().any(|e| e.field == "zones[1].inverter_count"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn zone_emptied_by_random_gaps_is_refused() {
        let mut cfg = StationConfig::clean();
        cfg.zones.truncate(1);
        cfg.zones[0].rows = 3;
        cfg.zones[0].cols = 8;
        cfg.generation.random_void_probability = 0.99;

        let mut refused = 0;
        for seed in 0..50 {
            match StationSnapshot::generate(&cfg, seed, 1) {
                Ok(snap) => assert!(snap.panels().count() > 0, "seed {seed}"),
                Err(StationError::EmptyZone { zone, seed: s }) => {
                    assert_eq!(zone, "Z-01");
                    assert_eq!(s, seed);
                    refused += 1;
                }
                Err(other) => panic!("unexpected error {other:?}"),
            }
        }
        assert!(refused > 0);
    }

    #[test]
    fn sensors_at_level_partitions_the_list() {
        let snap = baseline(42);
        let levels = [
            SensorLevel::Environmental,
            SensorLevel::Security,
            SensorLevel::StringDc,
            SensorLevel::Module,
            SensorLevel::InverterAc,
        ];
        let total: usize = levels.iter().map(|&l| snap.sensors_at_level(l).count()).sum();
        assert_eq!(total, snap.sensors().len());
        assert_eq!(snap.sensors_at_level(SensorLevel::Security).count(), 2);
        assert!(
            snap.sensors_at_level(SensorLevel::StringDc)
                .any(|s| s.id == "S-ARC-STR-01-03")
        );
    }

    #[test]
    fn scripted_arc_fault_surfaces_everywhere() {
        let snap = baseline(3);
        let s = snap.string("STR-01-03").unwrap();
        assert_eq!(s.status, Status::Fault);
        assert_eq!(s.issue, Some(Issue::ArcFault));
        assert_eq!(s.power_kw, 0.0);

        let inv = snap.inverter(&s.inverter_id).unwrap();
        assert_eq!(inv.status, Status::Fault);
        assert_eq!(inv.efficiency, 0.0);
        assert_eq!(snap.zone("Z-01").unwrap().status, Status::Fault);

        let arc: Vec<&SensorRecord> = snap
            .sensors()
            .iter()
            .filter(|r| r.kind == "arc" && r.target_id.as_deref() == Some("STR-01-03"))
            .collect();
        assert_eq!(arc.len(), 1);
    }

    #[test]
    fn lookups_report_missing_ids() {
        let snap = baseline(1);
        assert_eq!(
            snap.zone("Z-99").unwrap_err(),
            StationError::ZoneNotFound("Z-99".into())
        );
        assert!(matches!(
            snap.strings_for_inverter("INV-09-01"),
            Err(StationError::InverterNotFound(_))
        ));
        assert!(matches!(
            snap.string("STR-01-99"),
            Err(StationError::StringNotFound(_))
        ));
        assert!(matches!(
            snap.inverters_in_zone("nope"),
            Err(StationError::ZoneNotFound(_))
        ));
    }

    #[test]
    fn drill_down_filters_partition_the_lists() {
        let snap = baseline(5);
        let per_zone: usize = snap
            .zones()
            .iter()
            .map(|z| snap.inverters_in_zone(&z.id).unwrap().len())
            .sum();
        assert_eq!(per_zone, snap.inverters().len());

        let per_inverter: usize = snap
            .inverters()
            .iter()
            .map(|i| snap.strings_for_inverter(&i.id).unwrap().len())
            .sum();
        assert_eq!(per_inverter, snap.strings().len());
    }

    #[test]
    fn kpi_power_is_station_total() {
        let snap = baseline(9);
        assert_eq!(snap.kpi().power.value, snap.total_power_kw());
        assert_eq!(snap.kpi().co2.value, 1250.0 * 0.68);
        assert_eq!(snap.trend().len(), 8);
    }

    #[test]
    fn tampered_snapshot_fails_consistency() {
        let mut snap = baseline(11);
        snap.inverters[0].current_power += 10.0;
        assert!(matches!(
            snap.check_consistency(),
            Err(StationError::Inconsistent(_))
        ));

        let mut snap = baseline(11);
        let s = &mut snap.strings[0];
        s.status = if s.status == Status::Fault {
            Status::Normal
        } else {
            Status::Fault
        };
        assert!(snap.check_consistency().is_err());
    }

    #[test]
    fn overview_serializes_map_matrix() {
        let snap = baseline(2);
        let json = serde_json::to_value(snap.overview()).unwrap();
        let zones = json["map"]["zones"].as_array().unwrap();
        assert_eq!(zones.len(), 4);
        assert_eq!(zones[0]["id"], "Z-01");
        assert_eq!(zones[0]["matrix"].as_array().unwrap().len(), 12);
        assert!(json["kpi"]["power"]["value"].is_number());
        assert_eq!(json["trend"][3]["power"], 980.0);
    }
}
