//! Hierarchical identity assignment for populated panel slots.
//!
//! Every id is a pure function of the panel's 1-based sequence number within
//! its zone, the panels-per-string constant, and the zone's inverter count.
//! Randomness never reaches this module.

/// Hierarchical position derived from a panel's sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPosition {
    /// 1-based string number within the zone.
    pub string_number: usize,
    /// 1-based position within the string.
    pub panel_in_string: usize,
    /// 0-based inverter index (round-robin over strings).
    pub inverter_index: usize,
}

impl PanelPosition {
    /// Computes the position of the `sequence`-th populated panel.
    ///
    /// * string number = ⌈sequence / panels_per_string⌉
    /// * panel in string = ((sequence − 1) mod panels_per_string) + 1
    /// * inverter index = (string number − 1) mod inverter_count
    ///
    /// # Panics
    ///
    /// Panics if `sequence`, `panels_per_string`, or `inverter_count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use pv_station_sim::station::ids::PanelPosition;
    ///
    /// let pos = PanelPosition::from_sequence(41, 20, 2);
    /// assert_eq!(pos.string_number, 3);
    /// assert_eq!(pos.panel_in_string, 1);
    /// assert_eq!(pos.inverter_index, 0);
    /// ```
    pub fn from_sequence(sequence: usize, panels_per_string: usize, inverter_count: usize) -> Self {
        assert!(sequence > 0, "sequence is 1-based");
        assert!(panels_per_string > 0, "panels_per_string must be > 0");
        assert!(inverter_count > 0, "inverter_count must be > 0");

        let string_number = sequence.div_ceil(panels_per_string);
        Self {
            string_number,
            panel_in_string: (sequence - 1) % panels_per_string + 1,
            inverter_index: (string_number - 1) % inverter_count,
        }
    }
}

/// Returns the numeric suffix of a zone id (`"Z-01"` → `"01"`).
///
/// Returns `None` unless the id is `<prefix>-<digits>`.
pub fn zone_suffix(zone_id: &str) -> Option<&str> {
    let (prefix, suffix) = zone_id.split_once('-')?;
    if prefix.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(suffix)
}

/// `STR-<zone>-<nn>`
pub fn string_id(zone_suffix: &str, string_number: usize) -> String {
    format!("STR-{zone_suffix}-{string_number:02}")
}

/// `P-<nn>`
pub fn panel_id(panel_in_string: usize) -> String {
    format!("P-{panel_in_string:02}")
}

/// `INV-<zone>-<nn>`, from a 0-based inverter index.
pub fn inverter_id(zone_suffix: &str, inverter_index: usize) -> String {
    format!("INV-{zone_suffix}-{:02}", inverter_index + 1)
}

/// Unique panel key, `<string id>-<panel id>`.
pub fn panel_key(string_id: &str, panel_id: &str) -> String {
    format!("{string_id}-{panel_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_one_panels_make_three_strings_round_robin() {
        let positions: Vec<PanelPosition> = (1..=41)
            .map(|seq| PanelPosition::from_sequence(seq, 20, 2))
            .collect();

        let max_string = positions.iter().map(|p| p.string_number).max();
        assert_eq!(max_string, Some(3));

        for p in &positions {
            let expected_inverter = match p.string_number {
                1 | 3 => 0,
                2 => 1,
                other => panic!("unexpected string {other}"),
            };
            assert_eq!(p.inverter_index, expected_inverter);
        }

        assert_eq!(positions[19].panel_in_string, 20);
        assert_eq!(positions[20].panel_in_string, 1);
        assert_eq!(positions[20].string_number, 2);
    }

    #[test]
    fn single_inverter_takes_every_string() {
        for seq in 1..=100 {
            assert_eq!(PanelPosition::from_sequence(seq, 20, 1).inverter_index, 0);
        }
    }

    #[test]
    #[should_panic]
    fn zero_sequence_panics() {
        PanelPosition::from_sequence(0, 20, 2);
    }

    #[test]
    fn id_formatting_zero_pads() {
        assert_eq!(string_id("01", 3), "STR-01-03");
        assert_eq!(string_id("04", 12), "STR-04-12");
        assert_eq!(panel_id(7), "P-07");
        assert_eq!(inverter_id("02", 0), "INV-02-01");
        assert_eq!(panel_key("STR-01-03", "P-07"), "STR-01-03-P-07");
    }

    #[test]
    fn zone_suffix_parsing() {
        assert_eq!(zone_suffix("Z-01"), Some("01"));
        assert_eq!(zone_suffix("Z-123"), Some("123"));
        assert_eq!(zone_suffix("Z01"), None);
        assert_eq!(zone_suffix("Z-"), None);
        assert_eq!(zone_suffix("-01"), None);
        assert_eq!(zone_suffix("Z-0a"), None);
    }
}
