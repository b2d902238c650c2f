//! CSV loaders for the three input tables.
//!
//! Each loader checks the header row for the columns it needs before reading
//! any records, so a renamed column fails with a [`PipelineError::SchemaMismatch`]
//! instead of silently producing empty values.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Region code column, shared by the facility and region metadata tables.
pub const CODE_COLUMN: &str = "code";
/// Display name column, the key between region metadata and geo identifiers.
pub const NAME_COLUMN: &str = "state";
/// Metadata column dropped before the region join.
pub const CATEGORY_COLUMN: &str = "category";
/// Geo columns dropped before the identifier join.
pub const GEO_DROPPED_COLUMNS: [&str; 3] = ["population", "engineers", "hurricanes"];
/// Map identifier column of the geo table.
pub const ID_COLUMN: &str = "id";

const FACILITY_COLUMNS: [&str; 3] = ["state", "established", "discontinued"];

/// One row of the facility table, before cleaning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFacility {
    pub state: Option<String>,
    #[serde(deserialize_with = "optional_year")]
    pub established: Option<i32>,
    #[serde(deserialize_with = "optional_year")]
    pub discontinued: Option<i32>,
}

/// Region metadata keyed by region code.
///
/// `columns` holds every metadata column except `code` and `category`, in
/// file order; each row stores its values in the same order.
#[derive(Debug, Clone)]
pub struct RegionTable {
    columns: Vec<String>,
    name_index: usize,
    rows: HashMap<String, Vec<String>>,
}

impl RegionTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, code: &str) -> Option<&[String]> {
        self.rows.get(code).map(Vec::as_slice)
    }

    /// Position of the display name within [`RegionTable::columns`].
    pub fn name_column(&self) -> usize {
        self.name_index
    }

    /// Picks the display name out of a row returned by [`RegionTable::get`].
    pub fn display_name<'a>(&self, values: &'a [String]) -> &'a str {
        &values[self.name_index]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Map identifiers keyed by region display name.
#[derive(Debug, Clone, Default)]
pub struct GeoTable {
    ids: HashMap<String, i64>,
}

impl GeoTable {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct GeoRow {
    state: String,
    id: String,
}

/// Loads the raw facility table from `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_facilities(path: &Path) -> Result<Vec<RawFacility>> {
    let rows = read_facilities(path, open_input(path)?)?;
    info!(rows = rows.len(), "Facility table loaded");
    Ok(rows)
}

/// Reads facility rows from any CSV source; `path` is only used in errors.
pub fn read_facilities<R: Read>(path: &Path, mut rdr: csv::Reader<R>) -> Result<Vec<RawFacility>> {
    let headers = rdr.headers()?.clone();
    require_columns(path, &headers, &FACILITY_COLUMNS)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: RawFacility = result.map_err(|e| schema_error(path, e))?;
        rows.push(record);
    }

    Ok(rows)
}

/// Loads the region metadata table from `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_regions(path: &Path) -> Result<RegionTable> {
    let table = read_regions(path, open_input(path)?)?;
    info!(regions = table.len(), columns = ?table.columns, "Region metadata loaded");
    Ok(table)
}

pub fn read_regions<R: Read>(path: &Path, mut rdr: csv::Reader<R>) -> Result<RegionTable> {
    let headers = rdr.headers()?.clone();
    require_columns(path, &headers, &[CODE_COLUMN, NAME_COLUMN, CATEGORY_COLUMN])?;

    let code_index =
        column_index(&headers, CODE_COLUMN).ok_or_else(|| missing_column(path, CODE_COLUMN))?;
    let kept: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| *name != CODE_COLUMN && *name != CATEGORY_COLUMN)
        .map(|(i, _)| i)
        .collect();

    let columns: Vec<String> = kept.iter().map(|&i| headers[i].to_string()).collect();
    let name_index = columns
        .iter()
        .position(|c| c == NAME_COLUMN)
        .ok_or_else(|| missing_column(path, NAME_COLUMN))?;

    let mut rows = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let code = field(&record, code_index).to_string();
        let values: Vec<String> = kept.iter().map(|&i| field(&record, i).to_string()).collect();

        match rows.entry(code) {
            Entry::Occupied(e) => {
                return Err(PipelineError::DuplicateKey {
                    path: path.to_path_buf(),
                    key: e.key().clone(),
                });
            }
            Entry::Vacant(e) => {
                e.insert(values);
            }
        }
    }

    Ok(RegionTable {
        columns,
        name_index,
        rows,
    })
}

/// Loads the geo identifier table from `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_geo(path: &Path) -> Result<GeoTable> {
    let table = read_geo(path, open_input(path)?)?;
    info!(regions = table.len(), "Geo identifiers loaded");
    Ok(table)
}

pub fn read_geo<R: Read>(path: &Path, mut rdr: csv::Reader<R>) -> Result<GeoTable> {
    let headers = rdr.headers()?.clone();
    require_columns(path, &headers, &[NAME_COLUMN, ID_COLUMN])?;
    require_columns(path, &headers, &GEO_DROPPED_COLUMNS)?;
    debug!(dropped = ?GEO_DROPPED_COLUMNS, "Ignoring geo columns");

    let mut ids = HashMap::new();
    for result in rdr.deserialize() {
        let row: GeoRow = result.map_err(|e| schema_error(path, e))?;
        let id = parse_integer(&row.id).ok_or_else(|| PipelineError::SchemaMismatch {
            path: path.to_path_buf(),
            detail: format!("identifier '{}' for '{}' is not an integer", row.id, row.state),
        })?;

        if ids.insert(row.state.clone(), id).is_some() {
            return Err(PipelineError::DuplicateKey {
                path: path.to_path_buf(),
                key: row.state,
            });
        }
    }

    Ok(GeoTable { ids })
}

/// Parses integer text, also accepting integral floats such as `1850.0`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        let value: f64 = raw.parse().ok()?;
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    })
}

fn optional_year<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_integer(text)
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year '{text}'"))),
    }
}

fn open_input(path: &Path) -> Result<csv::Reader<File>> {
    if !path.exists() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(ReaderBuilder::new().trim(Trim::Headers).from_path(path)?)
}

fn require_columns(path: &Path, headers: &StringRecord, required: &[&str]) -> Result<()> {
    match required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        Some(column) => Err(missing_column(path, column)),
        None => Ok(()),
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}

fn missing_column(path: &Path, column: &str) -> PipelineError {
    PipelineError::SchemaMismatch {
        path: path.to_path_buf(),
        detail: format!("missing column '{column}'"),
    }
}

fn schema_error(path: &Path, err: csv::Error) -> PipelineError {
    if matches!(err.kind(), csv::ErrorKind::Deserialize { .. }) {
        PipelineError::SchemaMismatch {
            path: path.to_path_buf(),
            detail: err.to_string(),
        }
    } else {
        PipelineError::Csv(err)
    }
}
