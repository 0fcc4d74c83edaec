//! CSV export of per-panel telemetry.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::station::StationSnapshot;
use crate::station::types::Panel;

/// Column header for the per-panel CSV export.
const HEADER: &str = "zone_id,string_id,panel_id,inverter_id,row,col,\
                       status,issue,voltage_v,current_a,power_w";

/// Exports every panel of a snapshot to a CSV file at the given path.
///
/// Rows follow zone order, then row-major grid order within a zone, so the
/// output is identical for identical snapshots.
///
/// # Arguments
///
/// * `snapshot` - Generated station
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_panels_csv(snapshot: &StationSnapshot, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_panels_csv(snapshot.panels(), buf)
}

/// Writes panels as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_panels_csv<'a, I>(panels: I, writer: impl Write) -> io::Result<()>
where
    I: IntoIterator<Item = &'a Panel>,
{
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for p in panels {
        wtr.write_record(&[
            p.zone_id.clone(),
            p.string_id.clone(),
            p.panel_id.clone(),
            p.inverter_id.clone(),
            p.row.to_string(),
            p.col.to_string(),
            p.status.to_string(),
            p.issue.map(|i| i.label().to_string()).unwrap_or_default(),
            format!("{:.1}", p.voltage_v),
            format!("{:.2}", p.current_a),
            format!("{:.3}", p.power_w()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
