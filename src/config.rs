//! Input and output locations for a pipeline run.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

pub const FACILITIES_FILE: &str = "post_offices.csv";
pub const REGIONS_FILE: &str = "codes.csv";
pub const GEO_FILE: &str = "population_engineers_hurricanes.csv";
pub const OUTPUT_FILE: &str = "us_post_office_processed.csv";

/// File locations used by [`crate::pipeline`].
///
/// May be stored as a JSON object on disk; omitted keys keep their defaults:
/// ```json
/// {
///   "facilities": "data/post_offices.csv",
///   "output": "out/us_post_office_processed.csv"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub facilities: PathBuf,
    pub regions: PathBuf,
    pub geo: PathBuf,
    pub output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            facilities: PathBuf::from(FACILITIES_FILE),
            regions: PathBuf::from(REGIONS_FILE),
            geo: PathBuf::from(GEO_FILE),
            output: PathBuf::from(OUTPUT_FILE),
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replaces the facility table location.
    pub fn with_facilities(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.facilities = path;
        }
        self
    }

    pub fn with_regions(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.regions = path;
        }
        self
    }

    pub fn with_geo(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.geo = path;
        }
        self
    }

    pub fn with_output(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.output = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_uses_fixed_file_names() {
        let config = PipelineConfig::default();
        assert_eq!(config.facilities, Path::new("post_offices.csv"));
        assert_eq!(config.regions, Path::new("codes.csv"));
        assert_eq!(config.geo, Path::new("population_engineers_hurricanes.csv"));
        assert_eq!(config.output, Path::new("us_post_office_processed.csv"));
    }

    #[test]
    fn test_load_partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{ "facilities": "data/po.csv" }"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.facilities, Path::new("data/po.csv"));
        assert_eq!(config.output, Path::new(OUTPUT_FILE));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        fs::write(&path, r#"{ "first_year": 1800 }"#).unwrap();

        assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::Json(_))));
    }

    #[test]
    fn test_overrides_win() {
        let config = PipelineConfig::default()
            .with_output(Some(PathBuf::from("elsewhere.csv")))
            .with_geo(None);
        assert_eq!(config.output, Path::new("elsewhere.csv"));
        assert_eq!(config.geo, Path::new(GEO_FILE));
    }
}
