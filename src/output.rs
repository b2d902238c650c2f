//! Output formatting and persistence.
//!
//! Writes the enriched table as CSV and renders run summaries as JSON.

use std::fs::File;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::enrich::EnrichedTable;
use crate::error::Result;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON to `path`, replacing any existing file.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes the table to `path` with a header row and no index column.
///
/// An existing file is truncated.
pub fn write_table(path: &Path, table: &EnrichedTable) -> Result<()> {
    debug!(path = %path.display(), rows = table.rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = table.rows.len(), "Output table written");
    Ok(())
}
