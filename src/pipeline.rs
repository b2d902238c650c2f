//! The load → clean → aggregate → join → write pipeline.
//!
//! Every input is read before any work starts and the output file is only
//! written once the whole table has been built, so a failed run never leaves
//! a partial output behind.

use tracing::info;

use crate::cleaning::clean;
use crate::config::PipelineConfig;
use crate::enrich::{EnrichedTable, enrich};
use crate::error::Result;
use crate::output::write_table;
use crate::parser::{GeoTable, RawFacility, RegionTable, load_facilities, load_geo, load_regions};
use crate::series::{build_series, region_sizes};
use crate::stats::RunSummary;

/// Result of [`transform`]: the output table and its summary.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: EnrichedTable,
    pub summary: RunSummary,
}

/// Cleans, aggregates and enriches already-loaded tables.
pub fn transform(raw: Vec<RawFacility>, regions: &RegionTable, geo: &GeoTable) -> Result<PipelineOutput> {
    let facilities = raw.len();
    let (cleaned, report) = clean(raw);
    let series = build_series(&cleaned);
    let table = enrich(series, regions, geo)?;

    let sizes = region_sizes(&cleaned);
    let summary = RunSummary::from_table(&table, regions.name_column(), &sizes).with_cleaning(
        facilities,
        report.dropped,
        report.remapped,
    );

    Ok(PipelineOutput { table, summary })
}

/// Loads the three input tables named by `config` and transforms them.
#[tracing::instrument(skip_all)]
pub fn build(config: &PipelineConfig) -> Result<PipelineOutput> {
    let raw = load_facilities(&config.facilities)?;
    let regions = load_regions(&config.regions)?;
    let geo = load_geo(&config.geo)?;

    transform(raw, &regions, &geo)
}

/// Runs the full pipeline and writes the output table.
#[tracing::instrument(skip_all, fields(output = %config.output.display()))]
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let PipelineOutput { table, summary } = build(config)?;
    write_table(&config.output, &table)?;

    info!(
        regions = summary.regions.len(),
        rows = summary.rows,
        "Pipeline complete"
    );
    Ok(summary)
}
