//! Row filtering and normalization applied before aggregation.

use tracing::{debug, info};

use crate::parser::RawFacility;

/// Region codes whose rows are discarded outright.
pub const DROPPED_CODES: [&str; 2] = ["MI/OH", "VAy"];

/// Legacy region codes and the code their rows are counted under.
pub const REMAPPED_CODES: [(&str, &str); 1] = [("DC", "WA")];

/// Value substituted for any missing cell.
const FILL: i32 = 0;

/// A facility after cleaning: every field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    pub code: String,
    pub established: i32,
    pub discontinued: i32,
}

/// Counters reported by [`clean`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleaningReport {
    pub dropped: usize,
    pub remapped: usize,
    pub filled: usize,
}

/// Drops rows with a bad region code, fills missing values with zero and
/// rewrites legacy region codes.
///
/// Years outside the analysis horizon are kept; the year walk never visits
/// them.
pub fn clean(rows: Vec<RawFacility>) -> (Vec<Facility>, CleaningReport) {
    let mut report = CleaningReport::default();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        if row.state.as_deref().is_some_and(|s| DROPPED_CODES.contains(&s)) {
            report.dropped += 1;
            continue;
        }

        let mut code = match row.state {
            Some(code) => code,
            None => {
                report.filled += 1;
                FILL.to_string()
            }
        };

        if let Some((_, modern)) = REMAPPED_CODES.iter().find(|(legacy, _)| *legacy == code) {
            code = (*modern).to_string();
            report.remapped += 1;
        }

        report.filled += usize::from(row.established.is_none());
        report.filled += usize::from(row.discontinued.is_none());

        cleaned.push(Facility {
            code,
            established: row.established.unwrap_or(FILL),
            discontinued: row.discontinued.unwrap_or(FILL),
        });
    }

    debug!(filled = report.filled, "Missing values filled");
    info!(
        kept = cleaned.len(),
        dropped = report.dropped,
        remapped = report.remapped,
        "Facility rows cleaned"
    );

    (cleaned, report)
}
