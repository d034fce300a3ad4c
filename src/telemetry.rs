//! CSV export for simulation tick records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::TickRecord;

/// Schema v1 column header for CSV telemetry export.
pub const TELEMETRY_SCHEMA_V1_HEADER: &str =
    "hour,minute,is_nighttime,power_production_wh,state,soc_pct,voltage_v";

/// Exports the tick trace to a CSV file at the given path.
///
/// Writes a header row followed by one data row per tick using the schema
/// v1 column layout. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[TickRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes the tick trace as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[TickRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(TELEMETRY_SCHEMA_V1_HEADER.split(','))?;

    for r in records {
        wtr.write_record(&[
            r.hour.to_string(),
            r.minute.to_string(),
            r.is_nighttime.to_string(),
            format!("{:.4}", r.power_production_wh),
            r.state.to_string(),
            format!("{:.1}", r.soc_pct),
            format!("{:.2}", r.voltage_v),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
