//! Run summary derived from the enriched table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::enrich::EnrichedTable;
use crate::series::YEAR_COUNT;

/// Per-region highlights of the yearly series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub code: String,
    pub name: String,
    pub id: i64,
    /// Cleaned facilities in the region, including those dated outside the
    /// year horizon or not dated at all.
    pub facilities: usize,
    pub established: u64,
    pub discontinued: u64,
    pub peak_operating: i64,
    pub peak_year: i32,
    pub final_operating: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub facilities: usize,
    pub dropped: usize,
    pub remapped: usize,
    pub rows: usize,
    pub regions: Vec<RegionSummary>,
}

impl RunSummary {
    /// Summarises `table`, whose rows come in contiguous per-region runs of
    /// [`YEAR_COUNT`] years. `name_column` is the position of the display
    /// name within each row's metadata; `sizes` maps region codes to their
    /// facility counts.
    pub fn from_table(
        table: &EnrichedTable,
        name_column: usize,
        sizes: &HashMap<String, usize>,
    ) -> Self {
        let regions = table
            .rows
            .chunks(YEAR_COUNT)
            .filter_map(|chunk| {
                let first = chunk.first()?;
                let last = chunk.last()?;
                // Earliest year wins on ties.
                let peak = chunk
                    .iter()
                    .rev()
                    .max_by_key(|r| r.series.operating)?;

                Some(RegionSummary {
                    code: first.series.code.clone(),
                    name: first.metadata.get(name_column).cloned().unwrap_or_default(),
                    id: first.id,
                    facilities: sizes.get(&first.series.code).copied().unwrap_or_default(),
                    established: chunk.iter().map(|r| u64::from(r.series.established)).sum(),
                    discontinued: chunk.iter().map(|r| u64::from(r.series.discontinued)).sum(),
                    peak_operating: peak.series.operating,
                    peak_year: peak.series.year,
                    final_operating: last.series.operating,
                })
            })
            .collect();

        RunSummary {
            generated_at: Utc::now(),
            facilities: 0,
            dropped: 0,
            remapped: 0,
            rows: table.rows.len(),
            regions,
        }
    }

    /// Attaches cleaning counters to the summary.
    pub fn with_cleaning(mut self, facilities: usize, dropped: usize, remapped: usize) -> Self {
        self.facilities = facilities;
        self.dropped = dropped;
        self.remapped = remapped;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichedRow;
    use crate::series::{FIRST_YEAR, RegionYear, YEARS};

    fn region(code: &str, name: &str, id: i64, events: &[(i32, u32, u32)]) -> Vec<EnrichedRow> {
        let mut running = 0i64;
        YEARS
            .map(|year| {
                let (established, discontinued) = events
                    .iter()
                    .find(|(y, _, _)| *y == year)
                    .map(|(_, e, d)| (*e, *d))
                    .unwrap_or((0, 0));
                running += i64::from(established) - i64::from(discontinued);
                EnrichedRow {
                    series: RegionYear {
                        code: code.to_string(),
                        year,
                        established,
                        discontinued,
                        operating: running,
                    },
                    metadata: vec![name.to_string()],
                    id,
                }
            })
            .collect()
    }

    #[test]
    fn test_summary_per_region() {
        let mut rows = region("WA", "Washington", 53, &[(1850, 3, 0), (1900, 0, 2), (1950, 1, 0)]);
        rows.extend(region("AL", "Alabama", 1, &[]));
        let table = EnrichedTable {
            headers: Vec::new(),
            rows,
        };

        let sizes = HashMap::from([("WA".to_string(), 5), ("AL".to_string(), 2)]);
        let summary = RunSummary::from_table(&table, 0, &sizes).with_cleaning(10, 2, 1);

        assert_eq!(summary.rows, 2 * YEAR_COUNT);
        assert_eq!(summary.facilities, 10);
        assert_eq!(summary.regions.len(), 2);

        let wa = &summary.regions[0];
        assert_eq!(wa.name, "Washington");
        assert_eq!(wa.facilities, 5);
        assert_eq!(wa.established, 4);
        assert_eq!(wa.discontinued, 2);
        assert_eq!(wa.peak_operating, 3);
        assert_eq!(wa.peak_year, 1850);
        assert_eq!(wa.final_operating, 2);

        let al = &summary.regions[1];
        assert_eq!(al.facilities, 2);
        assert_eq!(al.peak_operating, 0);
        assert_eq!(al.peak_year, FIRST_YEAR);
        assert_eq!(al.final_operating, 0);
    }

    #[test]
    fn test_summary_serializes() {
        let table = EnrichedTable {
            headers: Vec::new(),
            rows: region("WA", "Washington", 53, &[(1850, 1, 0)]),
        };
        let sizes = HashMap::from([("WA".to_string(), 1)]);
        let json = serde_json::to_value(RunSummary::from_table(&table, 0, &sizes)).unwrap();

        assert_eq!(json["regions"][0]["code"], "WA");
        assert_eq!(json["regions"][0]["id"], 53);
        assert_eq!(json["regions"][0]["facilities"], 1);
        assert!(json["generated_at"].is_string());
    }
}
