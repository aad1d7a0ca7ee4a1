//! Store adapters for the three data sources
//!
//! Each adapter loads its medium fully into memory and writes it back in one
//! pass. Table and column names are fixed to the CdsHelper schema.

pub mod city_db;
pub mod city_json;
pub mod guild_csv;

use std::path::PathBuf;
use thiserror::Error;

pub use city_db::{CityDb, CityRow};
pub use city_json::CityJson;
pub use guild_csv::GuildRoster;

/// Errors raised while reading or writing a store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Expected a top-level JSON array of cities")]
    NonArrayRoot,

    #[error("CSV header is missing column '{0}'")]
    MissingColumn(&'static str),
}

/// Fail with [`StoreError::MissingFile`] unless `path` exists
pub(crate) fn require_file(path: &std::path::Path) -> Result<(), StoreError> {
    if path.exists() {
        Ok(())
    } else {
        Err(StoreError::MissingFile(path.to_path_buf()))
    }
}
