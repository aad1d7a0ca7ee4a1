//! City CSV export access
//!
//! Only two columns matter: the city name and the guild marker.

use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use super::{require_file, StoreError};

pub const NAME_COLUMN: &str = "도시명";
pub const MARKER_COLUMN: &str = "조합";

/// Marker value meaning "this city has a guild"
pub const GUILD_MARKER: &str = "○";

#[derive(Debug, Deserialize)]
struct GuildRecord {
    #[serde(rename = "도시명")]
    name: String,
    #[serde(rename = "조합")]
    marker: String,
}

/// City name → guild flag, in first-seen order
#[derive(Debug, Default)]
pub struct GuildRoster {
    entries: Vec<(String, bool)>,
    index: HashMap<String, usize>,
}

impl GuildRoster {
    /// Load the roster from a CSV file (a leading BOM is ignored)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        require_file(path)?;
        Self::from_reader(fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, StoreError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content.as_str());

        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = rdr.headers()?.clone();
        for column in [NAME_COLUMN, MARKER_COLUMN] {
            if !headers.iter().any(|h| h == column) {
                return Err(StoreError::MissingColumn(column));
            }
        }

        let mut roster = Self::default();
        for record in rdr.deserialize::<GuildRecord>() {
            let record = record?;
            roster.insert(
                record.name.trim().to_string(),
                record.marker == GUILD_MARKER,
            );
        }

        Ok(roster)
    }

    /// Later rows for the same name replace the flag but keep the position
    fn insert(&mut self, name: String, has_guild: bool) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = has_guild,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, has_guild));
            }
        }
    }

    /// Guild flag for an exact name; unknown names have no guild
    pub fn has_guild(&self, name: &str) -> bool {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1)
            .unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names flagged with a guild, in CSV order
    pub fn guild_cities(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, has_guild)| *has_guild)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(csv: &str) -> Result<GuildRoster, StoreError> {
        GuildRoster::from_reader(csv.as_bytes())
    }

    #[test]
    fn test_marker_and_trimming() {
        let roster = roster(
            "\u{feff}도시명,문화권,조합\n 리스본 ,이베리아,○\n세비야,이베리아,×\n나폴리,이탈리아, ○\n",
        )
        .unwrap();

        assert_eq!(roster.len(), 3);
        assert!(roster.has_guild("리스본"));
        assert!(!roster.has_guild(" 리스본 "));
        assert!(!roster.has_guild("세비야"));
        // Marker is compared as-is
        assert!(!roster.has_guild("나폴리"));
        assert!(!roster.has_guild("unknown"));
        assert_eq!(roster.guild_cities(), vec!["리스본"]);
    }

    #[test]
    fn test_duplicate_name_last_row_wins() {
        let roster = roster("도시명,조합\nA,○\nB,○\nA,\n").unwrap();

        assert_eq!(roster.len(), 2);
        assert!(!roster.has_guild("A"));
        assert_eq!(roster.guild_cities(), vec!["B"]);
    }

    #[test]
    fn test_missing_column() {
        let err = roster("도시명,항구\nA,○\n").unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn("조합")));
    }

    #[test]
    fn test_short_row_is_fatal() {
        let err = roster("도시명,조합\nA,○\nB\n").unwrap_err();
        assert!(matches!(err, StoreError::Csv(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GuildRoster::load(dir.path().join("도시.csv")).unwrap_err();
        assert!(matches!(err, StoreError::MissingFile(_)));
    }
}
