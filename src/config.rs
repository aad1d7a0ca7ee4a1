//! Default file locations and path resolution
//!
//! Defaults are relative to the working directory and match the layout of a
//! CdsHelper checkout with a Debug build.

use std::path::PathBuf;

/// SQLite database written by the application
pub const DEFAULT_DB_PATH: &str = "cds-helper/bin/Debug/net8.0-windows/cdshelper.db";

/// City list shipped with the application
pub const DEFAULT_CITIES_JSON_PATH: &str = "cds-helper/cities.json";

/// City export with the guild column
pub const DEFAULT_CITY_CSV_PATH: &str = "CdsHelper/도시.csv";

/// Resolved locations of the three stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    pub db: PathBuf,
    pub cities_json: PathBuf,
    pub city_csv: PathBuf,
}

impl Default for SyncPaths {
    fn default() -> Self {
        Self {
            db: PathBuf::from(DEFAULT_DB_PATH),
            cities_json: PathBuf::from(DEFAULT_CITIES_JSON_PATH),
            city_csv: PathBuf::from(DEFAULT_CITY_CSV_PATH),
        }
    }
}

impl SyncPaths {
    /// Apply command-line overrides on top of the defaults
    pub fn resolve(
        db: Option<PathBuf>,
        cities_json: Option<PathBuf>,
        city_csv: Option<PathBuf>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            db: db.unwrap_or(defaults.db),
            cities_json: cities_json.unwrap_or(defaults.cities_json),
            city_csv: city_csv.unwrap_or(defaults.city_csv),
        }
    }
}
