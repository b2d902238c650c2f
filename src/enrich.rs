//! Attaches region metadata and map identifiers to the flat series.

use tracing::info;

use crate::error::{PipelineError, Result};
use crate::parser::{CODE_COLUMN, GeoTable, ID_COLUMN, RegionTable};
use crate::series::RegionYear;

/// Leading columns of the output table, before the metadata columns.
pub const SERIES_COLUMNS: [&str; 5] = [CODE_COLUMN, "Year", "Established", "Discontinued", "Operating"];

/// A [`RegionYear`] joined with its region metadata and map identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRow {
    pub series: RegionYear,
    pub metadata: Vec<String>,
    pub id: i64,
}

impl EnrichedRow {
    /// Renders the row in output column order.
    pub fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(SERIES_COLUMNS.len() + self.metadata.len() + 1);
        record.push(self.series.code.clone());
        record.push(self.series.year.to_string());
        record.push(self.series.established.to_string());
        record.push(self.series.discontinued.to_string());
        record.push(self.series.operating.to_string());
        record.extend(self.metadata.iter().cloned());
        record.push(self.id.to_string());
        record
    }
}

/// The enriched output table.
#[derive(Debug, Clone)]
pub struct EnrichedTable {
    pub headers: Vec<String>,
    pub rows: Vec<EnrichedRow>,
}

/// Joins every series row to `regions` on region code, then to `geo` on the
/// region's display name.
///
/// Both joins must match; a region code missing from `regions` or a display
/// name missing from `geo` is an error.
#[tracing::instrument(skip_all, fields(rows = series.len()))]
pub fn enrich(series: Vec<RegionYear>, regions: &RegionTable, geo: &GeoTable) -> Result<EnrichedTable> {
    let headers = SERIES_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(regions.columns().iter().cloned())
        .chain(std::iter::once(ID_COLUMN.to_string()))
        .collect();

    let mut rows = Vec::with_capacity(series.len());
    for row in series {
        let metadata = regions
            .get(&row.code)
            .ok_or_else(|| PipelineError::JoinMismatch {
                table: "region",
                key: row.code.clone(),
            })?;

        let name = regions.display_name(metadata);
        let id = geo.get(name).ok_or_else(|| PipelineError::JoinMismatch {
            table: "geo",
            key: name.to_string(),
        })?;

        rows.push(EnrichedRow {
            metadata: metadata.to_vec(),
            series: row,
            id,
        });
    }

    info!(rows = rows.len(), "Series enriched");
    Ok(EnrichedTable { headers, rows })
}
