//! CSV export of the displayed events.
//!
//! Fields are joined with commas as they are; embedded commas in places or
//! titles are not quoted.

use quake_common::{format_magnitude, DisplayEvent, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

/// Header row, one column per field written for each event.
pub const CSV_HEADER: &str = "Index,Magnitude,Place,Time,Type,Title";

/// Writes the header and one row per event to `writer`.
pub fn write_csv<W: Write>(mut writer: W, events: &[DisplayEvent]) -> std::io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for event in events {
        writeln!(
            writer,
            "{},{},{},{},{},{}",
            event.sequence_id,
            format_magnitude(event.magnitude),
            event.place,
            event.formatted_time,
            event.event_type,
            event.title
        )?;
    }
    writer.flush()
}

/// Writes `events` to a CSV file at `path`, replacing it. Returns rows written.
#[instrument(skip(path, events), fields(path = %path.as_ref().display(), rows = events.len()))]
pub fn export_to_csv(path: impl AsRef<Path>, events: &[DisplayEvent]) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    write_csv(BufWriter::new(file), events)?;
    info!("Exported events to CSV");
    Ok(events.len())
}
