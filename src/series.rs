//! Per-region yearly time series.
//!
//! Facilities are grouped by region code in order of first appearance, then
//! each region is walked over the fixed year horizon. Opening and closing
//! events adjust a running total that is local to the region, and one flat
//! [`RegionYear`] record is emitted for every year whether or not anything
//! happened in it.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use tracing::debug;

use crate::cleaning::Facility;

pub const FIRST_YEAR: i32 = 1772;
pub const LAST_YEAR: i32 = 2000;
pub const YEARS: RangeInclusive<i32> = FIRST_YEAR..=LAST_YEAR;
/// Number of records emitted per region.
pub const YEAR_COUNT: usize = (LAST_YEAR - FIRST_YEAR + 1) as usize;

/// Facility counts for one region in one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionYear {
    pub code: String,
    pub year: i32,
    pub established: u32,
    pub discontinued: u32,
    pub operating: i64,
}

/// All facilities of one region, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGroup<'a> {
    pub code: &'a str,
    pub facilities: Vec<&'a Facility>,
}

/// Groups facilities by region code, keeping regions in discovery order.
pub fn partition(facilities: &[Facility]) -> Vec<RegionGroup<'_>> {
    let mut groups: Vec<RegionGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for facility in facilities {
        let slot = *index.entry(facility.code.as_str()).or_insert_with(|| {
            groups.push(RegionGroup {
                code: facility.code.as_str(),
                facilities: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].facilities.push(facility);
    }

    debug!(regions = groups.len(), "Facilities partitioned by region");
    groups
}

/// Number of cleaned facilities per region code, whatever their years.
pub fn region_sizes(facilities: &[Facility]) -> HashMap<String, usize> {
    partition(facilities)
        .into_iter()
        .map(|group| (group.code.to_string(), group.facilities.len()))
        .collect()
}

/// Walks [`YEARS`] for a single region and returns one record per year.
pub fn accumulate(group: &RegionGroup<'_>) -> Vec<RegionYear> {
    let mut opened = [0u32; YEAR_COUNT];
    let mut closed = [0u32; YEAR_COUNT];

    for facility in &group.facilities {
        if let Some(slot) = year_slot(facility.established) {
            opened[slot] += 1;
        }
        if let Some(slot) = year_slot(facility.discontinued) {
            closed[slot] += 1;
        }
    }

    let mut running_total: i64 = 0;
    YEARS
        .zip(opened.iter().zip(closed.iter()))
        .map(|(year, (&established, &discontinued))| {
            running_total += i64::from(established);
            running_total -= i64::from(discontinued);
            RegionYear {
                code: group.code.to_string(),
                year,
                established,
                discontinued,
                operating: running_total,
            }
        })
        .collect()
}

/// Builds the flat series for every region, regions in discovery order.
#[tracing::instrument(skip_all, fields(facilities = facilities.len()))]
pub fn build_series(facilities: &[Facility]) -> Vec<RegionYear> {
    let groups = partition(facilities);
    let mut series = Vec::with_capacity(groups.len() * YEAR_COUNT);

    for group in &groups {
        debug!(code = group.code, facilities = group.facilities.len(), "Processing region");
        series.extend(accumulate(group));
    }

    series
}

fn year_slot(year: i32) -> Option<usize> {
    YEARS
        .contains(&year)
        .then(|| (year - FIRST_YEAR) as usize)
}
