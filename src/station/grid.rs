//! Panel grid generation for a single zone.

use rand::Rng;
use tracing::debug;

use crate::config::{GenerationConfig, ZoneConfig};

use super::faults::FaultPolicy;
use super::ids::{self, PanelPosition};
use super::round_dp;
use super::types::{Panel, PanelGrid, Status, ZoneLayout};

/// Baseline panel voltage before jitter (V).
const BASE_VOLTAGE_V: f64 = 32.0;
/// Voltage jitter span (V).
const VOLTAGE_JITTER_V: f64 = 1.0;
/// Baseline panel current before jitter (A).
const BASE_CURRENT_A: f64 = 9.0;
/// Current jitter span (A).
const CURRENT_JITTER_A: f64 = 0.2;

/// Whether a cell is permanently empty: a cut corner or the central road.
///
/// The top-left 2×3 block and the bottom-right 2×3 block are cut, and the
/// column at `cols / 2` is the access road.
pub fn is_reserved(row: usize, col: usize, rows: usize, cols: usize) -> bool {
    let top_left = row < 2 && col < 3;
    let bottom_right = row + 3 > rows && col + 4 > cols;
    let road = col == cols / 2;
    top_left || bottom_right || road
}

/// Number of cells that can hold a panel when no random gaps are drawn.
pub fn usable_cells(rows: usize, cols: usize) -> usize {
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| (r, c)))
        .filter(|&(r, c)| !is_reserved(r, c, rows, cols))
        .count()
}

/// Generates the panel grid of one zone.
///
/// Cells are visited row-major; each populated cell takes the next sequence
/// number, from which its string, position, and inverter follow (see
/// [`PanelPosition::from_sequence`]). Electrical readings get a small random
/// jitter and are then derated by whatever issue the policy assigns.
///
/// The configuration must have passed [`crate::config::StationConfig::validate`].
pub fn generate_zone<R: Rng + ?Sized>(
    zone: &ZoneConfig,
    generation: &GenerationConfig,
    policy: &FaultPolicy<'_>,
    rng: &mut R,
) -> ZoneLayout {
    let suffix = ids::zone_suffix(&zone.id).unwrap_or(&zone.id);
    let mut matrix: PanelGrid = Vec::with_capacity(zone.rows);
    let mut panels = Vec::new();
    let mut sequence = 0_usize;

    for row in 0..zone.rows {
        let mut cells = Vec::with_capacity(zone.cols);
        for col in 0..zone.cols {
            if is_reserved(row, col, zone.rows, zone.cols) {
                cells.push(None);
                continue;
            }
            if generation.random_void_probability > 0.0
                && rng.random::<f64>() < generation.random_void_probability
            {
                cells.push(None);
                continue;
            }

            sequence += 1;
            let pos =
                PanelPosition::from_sequence(sequence, generation.panels_per_string, zone.inverter_count);
            let string_id = ids::string_id(suffix, pos.string_number);
            let panel_id = ids::panel_id(pos.panel_in_string);

            let voltage_v = BASE_VOLTAGE_V + rng.random::<f64>() * VOLTAGE_JITTER_V;
            let current_a = BASE_CURRENT_A + rng.random::<f64>() * CURRENT_JITTER_A;

            let issue = policy.assess(&string_id, zone, rng);
            let (voltage_v, current_a) = match issue {
                Some(issue) => issue.derate(voltage_v, current_a),
                None => (voltage_v, current_a),
            };
            let status = issue.map_or(Status::Normal, |i| i.status());

            let panel = Panel {
                key: ids::panel_key(&string_id, &panel_id),
                inverter_id: ids::inverter_id(suffix, pos.inverter_index),
                string_id,
                panel_id,
                zone_id: zone.id.clone(),
                zone_name: zone.name.clone(),
                row,
                col,
                sequence,
                status,
                issue,
                voltage_v: round_dp(voltage_v, 1),
                current_a: round_dp(current_a, 2),
            };
            panels.push(panel.clone());
            cells.push(Some(panel));
        }
        matrix.push(cells);
    }

    debug!(
        zone = %zone.id,
        rows = zone.rows,
        cols = zone.cols,
        modules = sequence,
        "zone grid generated"
    );

    ZoneLayout {
        zone_id: zone.id.clone(),
        zone_name: zone.name.clone(),
        matrix,
        panels,
        module_count: sequence,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::{FaultConfig, ScriptedFault, StationConfig};
    use crate::station::types::Issue;

    fn zone(rows: usize, cols: usize, inverter_count: usize) -> ZoneConfig {
        ZoneConfig {
            id: "Z-07".to_string(),
            name: "Test Field".to_string(),
            rows,
            cols,
            inverter_count,
            ..StationConfig::baseline().zones[0].clone()
        }
    }

    fn quiet_faults() -> FaultConfig {
        FaultConfig {
            enabled: false,
            ..FaultConfig::default()
        }
    }

    #[test]
    fn reserved_cells_cover_corners_and_road() {
        // 12x24: road at column 12
        assert!(is_reserved(0, 0, 12, 24));
        assert!(is_reserved(1, 2, 12, 24));
        assert!(!is_reserved(2, 0, 12, 24));
        assert!(!is_reserved(0, 3, 12, 24));
        assert!(is_reserved(5, 12, 12, 24));
        assert!(is_reserved(10, 21, 12, 24));
        assert!(is_reserved(11, 23, 12, 24));
        assert!(!is_reserved(9, 23, 12, 24));
        assert!(!is_reserved(11, 20, 12, 24));
    }

    #[test]
    fn usable_cells_counts_slots() {
        // 288 cells - 6 top-left - 6 bottom-right - 12 road
        assert_eq!(usable_cells(12, 24), 264);
        assert_eq!(usable_cells(1, 3), 0);
    }

    #[test]
    fn module_count_matches_grid_and_flat_list() {
        let faults = FaultConfig::default();
        let policy = FaultPolicy::new(&faults);
        let generation = GenerationConfig {
            random_void_probability: 0.05,
            ..GenerationConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let layout = generate_zone(&zone(10, 20, 3), &generation, &policy, &mut rng);

        let populated = layout.matrix.iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(populated, layout.module_count);
        assert_eq!(layout.panels.len(), layout.module_count);
        assert_eq!(layout.matrix.len(), 10);
        assert!(layout.matrix.iter().all(|r| r.len() == 20));
    }

    #[test]
    fn forty_one_panel_zone_wiring() {
        // 1x48: 3 + 3 corner cells and the road at column 24 are void
        let faults = quiet_faults();
        let policy = FaultPolicy::new(&faults);
        let mut rng = StdRng::seed_from_u64(0);
        let layout = generate_zone(
            &zone(1, 48, 2),
            &GenerationConfig::default(),
            &policy,
            &mut rng,
        );

        assert_eq!(layout.module_count, 41);
        let mut strings: Vec<(&str, &str)> = layout
            .panels
            .iter()
            .map(|p| (p.string_id.as_str(), p.inverter_id.as_str()))
            .collect();
        strings.dedup();
        assert_eq!(
            strings,
            vec![
                ("STR-07-01", "INV-07-01"),
                ("STR-07-02", "INV-07-02"),
                ("STR-07-03", "INV-07-01"),
            ]
        );
        assert_eq!(layout.panels[40].panel_id, "P-01");
        assert_eq!(layout.panels[40].key, "STR-07-03-P-01");
    }

    #[test]
    fn ids_are_independent_of_seed() {
        let faults = FaultConfig {
            enabled: false,
            ..FaultConfig::default()
        };
        let policy = FaultPolicy::new(&faults);
        let z = zone(12, 24, 2);
        let ids = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_zone(&z, &GenerationConfig::default(), &policy, &mut rng)
                .panels
                .into_iter()
                .map(|p| (p.key, p.inverter_id, p.row, p.col))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(1), ids(2));
    }

    #[test]
    fn baseline_readings_within_band() {
        let faults = quiet_faults();
        let policy = FaultPolicy::new(&faults);
        let mut rng = StdRng::seed_from_u64(77);
        let layout = generate_zone(
            &zone(12, 24, 2),
            &GenerationConfig::default(),
            &policy,
            &mut rng,
        );
        for p in &layout.panels {
            assert_eq!(p.status, Status::Normal);
            assert!((32.0..=33.0).contains(&p.voltage_v), "v={}", p.voltage_v);
            assert!((9.0..=9.2).contains(&p.current_a), "c={}", p.current_a);
        }
    }

    #[test]
    fn scripted_string_is_zeroed() {
        let faults = FaultConfig {
            enabled: false,
            scripted: vec![ScriptedFault::new("STR-07-02", Issue::ArcFault)],
            ..FaultConfig::default()
        };
        let policy = FaultPolicy::new(&faults);
        let mut rng = StdRng::seed_from_u64(4);
        let layout = generate_zone(
            &zone(12, 24, 2),
            &GenerationConfig::default(),
            &policy,
            &mut rng,
        );
        let arc: Vec<&Panel> = layout
            .panels
            .iter()
            .filter(|p| p.string_id == "STR-07-02")
            .collect();
        assert_eq!(arc.len(), 20);
        for p in arc {
            assert_eq!(p.status, Status::Fault);
            assert_eq!(p.issue, Some(Issue::ArcFault));
            assert_eq!(p.power_w(), 0.0);
        }
        assert!(
            layout
                .panels
                .iter()
                .filter(|p| p.string_id != "STR-07-02")
                .all(|p| p.status == Status::Normal)
        );
    }
}
