//! City table access
//!
//! Reads and updates the `Cities` table of the CdsHelper SQLite database.

use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags};
use serde_json::Number;
use serde_json::Value as JsonValue;
use std::path::Path;

use super::{require_file, StoreError};

/// Column added on demand by the guild sync
pub const GUILD_COLUMN: &str = "HasGuild";

/// One row of the `Cities` table as seen by the JSON sync
#[derive(Debug, Clone, PartialEq)]
pub struct CityRow {
    pub id: i64,
    pub name: Option<String>,
    /// `None` when the column is NULL; other stored values pass through as-is
    pub pixel_x: Option<JsonValue>,
    pub pixel_y: Option<JsonValue>,
    pub has_library: bool,
}

/// Handle on the city database
pub struct CityDb {
    conn: Connection,
}

impl CityDb {
    /// Open an existing database for reading only
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Open an existing database for reading and writing
    ///
    /// Unlike a plain `Connection::open`, a missing file is an error rather
    /// than a freshly created empty database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with(path: &Path, flags: OpenFlags) -> Result<Self, StoreError> {
        require_file(path)?;
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(Self { conn })
    }

    /// Load every city with its coordinates and library flag
    pub fn cities(&self) -> Result<Vec<CityRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT Id, Name, PixelX, PixelY, HasLibrary FROM Cities")?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Value>(2)?,
                    row.get::<_, Value>(3)?,
                    row.get::<_, Value>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(raw
            .into_iter()
            .map(|(id, name, pixel_x, pixel_y, has_library)| CityRow {
                id,
                name,
                pixel_x: coordinate(pixel_x),
                pixel_y: coordinate(pixel_y),
                has_library: sql_truthy(&has_library),
            })
            .collect())
    }

    /// Load `(Id, Name)` for every city
    pub fn city_names(&self) -> Result<Vec<(i64, Option<String>)>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT Id, Name FROM Cities")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Check whether `Cities` has a column with this exact name
    pub fn has_column(&self, column: &str) -> Result<bool, StoreError> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(Cities)")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(1))?;

        for name in names {
            if name? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Add `HasGuild INTEGER DEFAULT 0` unless it already exists
    ///
    /// Returns `true` when the column was added.
    pub fn ensure_guild_column(&self) -> Result<bool, StoreError> {
        if self.has_column(GUILD_COLUMN)? {
            return Ok(false);
        }
        self.conn
            .execute_batch("ALTER TABLE Cities ADD COLUMN HasGuild INTEGER DEFAULT 0")?;
        Ok(true)
    }

    /// Write `HasGuild` for each `(Id, flag)` pair in a single transaction
    pub fn write_guild_flags(&mut self, flags: &[(i64, bool)]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE Cities SET HasGuild = ?1 WHERE Id = ?2")?;
            for (id, has_guild) in flags {
                stmt.execute(params![i64::from(*has_guild), id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Convert a nullable coordinate column into the JSON value to write
///
/// Only NULL means "no value". Text is copied as a string and a blob as
/// lossy UTF-8 text. A non-finite real has no JSON form and is treated as NULL.
fn coordinate(value: Value) -> Option<JsonValue> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(JsonValue::Number(Number::from(i))),
        Value::Real(f) => Number::from_f64(f).map(JsonValue::Number),
        Value::Text(s) => Some(JsonValue::String(s)),
        Value::Blob(b) => Some(JsonValue::String(String::from_utf8_lossy(&b).into_owned())),
    }
}

/// Boolean reading of a stored flag: NULL, zero and empty values are false
fn sql_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Integer(i) => *i != 0,
        Value::Real(f) => *f != 0.0,
        Value::Text(s) => !s.is_empty(),
        Value::Blob(b) => !b.is_empty(),
    }
}
