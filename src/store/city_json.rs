//! cities.json access
//!
//! The file is a top-level array of city objects. Objects are kept as raw
//! `serde_json::Value`s so fields this tool does not know about survive a
//! rewrite in their original order.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::{require_file, StoreError};

/// In-memory copy of cities.json
#[derive(Debug)]
pub struct CityJson {
    path: PathBuf,
    pub cities: Vec<Value>,
}

impl CityJson {
    /// Read and parse the whole file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        require_file(path)?;

        let content = fs::read_to_string(path)?;
        let cities = match serde_json::from_str::<Value>(&content)? {
            Value::Array(cities) => cities,
            _ => return Err(StoreError::NonArrayRoot),
        };

        Ok(Self {
            path: path.to_path_buf(),
            cities,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize with 2-space indentation, keeping non-ASCII text literal
    pub fn to_pretty_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.cities)?)
    }

    /// Overwrite the file it was loaded from
    pub fn save(&self) -> Result<(), StoreError> {
        let content = self.to_pretty_string()?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Numeric id of a city object, if it has a usable one
///
/// Floats without a fractional part count as integers (`5.0` matches `5`).
pub fn city_id(city: &Value) -> Option<i64> {
    let id = city.get("id")?;
    if let Some(id) = id.as_i64() {
        return Some(id);
    }
    id.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Loose truthiness: null, false, zero, and empty strings or containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Whether both `pixelX` and `pixelY` are present and truthy
pub fn has_coordinates(city: &Value) -> bool {
    ["pixelX", "pixelY"]
        .iter()
        .all(|key| city.get(key).is_some_and(is_truthy))
}
