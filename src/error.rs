//! Error type for the post office pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema mismatch in {}: {detail}", path.display())]
    SchemaMismatch { path: PathBuf, detail: String },

    #[error("duplicate join key '{key}' in {}", path.display())]
    DuplicateKey { path: PathBuf, key: String },

    #[error("no match for '{key}' in {table} lookup")]
    JoinMismatch { table: &'static str, key: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
