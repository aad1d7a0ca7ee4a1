//! Sync-guild command - Write the CSV guild marker into the `HasGuild` column
//!
//! Database rows are matched to CSV rows by exact city name. Rows with no CSV
//! counterpart get `HasGuild = 0`.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use super::utils;
use crate::store::city_db::GUILD_COLUMN;
use crate::store::{CityDb, GuildRoster};

/// Summary of a sync-guild run
#[derive(Debug, Default)]
pub struct GuildSyncReport {
    /// Distinct city names in the CSV
    pub csv_cities: usize,
    /// CSV cities marked with a guild, in CSV order
    pub guild_cities: Vec<String>,
    /// Whether the column was (or, in a dry run, would be) added
    pub column_added: bool,
    pub db_rows: usize,
    /// Rows set to `HasGuild = 1`
    pub set_true: usize,
    /// Database names with no CSV row of the same name
    pub unmatched: Vec<String>,
}

/// Resolve the guild flag of every `(Id, Name)` row
///
/// A NULL or unknown name resolves to `false`.
pub fn resolve_flags(rows: &[(i64, Option<String>)], roster: &GuildRoster) -> Vec<(i64, bool)> {
    rows.iter()
        .map(|(id, name)| {
            let has_guild = name.as_deref().is_some_and(|n| roster.has_guild(n));
            (*id, has_guild)
        })
        .collect()
}

/// Database names that have no CSV counterpart
pub fn unmatched_names(rows: &[(i64, Option<String>)], roster: &GuildRoster) -> Vec<String> {
    rows.iter()
        .filter_map(|(_, name)| name.as_deref())
        .filter(|name| !roster.contains(name))
        .map(str::to_string)
        .collect()
}

/// Run the sync against already-loaded guild data
pub fn apply(db_path: &Path, roster: &GuildRoster, dry_run: bool) -> Result<GuildSyncReport> {
    let opened = if dry_run {
        CityDb::open_read_only(db_path)
    } else {
        CityDb::open(db_path)
    };
    let mut db =
        opened.with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    let column_added = if dry_run {
        !db.has_column(GUILD_COLUMN)?
    } else {
        db.ensure_guild_column()
            .with_context(|| format!("Failed to add {} column", GUILD_COLUMN))?
    };

    let rows = db
        .city_names()
        .with_context(|| format!("Failed to read cities from: {}", db_path.display()))?;
    let flags = resolve_flags(&rows, roster);

    if !dry_run {
        db.write_guild_flags(&flags)
            .context("Failed to update guild flags")?;
    }

    Ok(GuildSyncReport {
        csv_cities: roster.len(),
        guild_cities: roster
            .guild_cities()
            .into_iter()
            .map(str::to_string)
            .collect(),
        column_added,
        db_rows: rows.len(),
        set_true: flags.iter().filter(|(_, has_guild)| *has_guild).count(),
        unmatched: unmatched_names(&rows, roster),
    })
}

/// Load the CSV and run the sync
pub fn sync(csv_path: &Path, db_path: &Path, dry_run: bool) -> Result<GuildSyncReport> {
    let roster = GuildRoster::load(csv_path)
        .with_context(|| format!("Failed to load: {}", csv_path.display()))?;
    apply(db_path, &roster, dry_run)
}

/// Execute the sync-guild command
pub fn execute(csv_path: &Path, db_path: &Path, dry_run: bool) -> Result<()> {
    println!("{}", "Syncing guild flags from CSV...".green());
    println!("  CSV:      {}", csv_path.display());
    println!("  Database: {}", db_path.display());
    println!();

    let roster = GuildRoster::load(csv_path)
        .with_context(|| format!("Failed to load: {}", csv_path.display()))?;

    let guild_cities = roster.guild_cities();
    println!("Loaded {} cities from CSV", roster.len());
    println!("Cities with a guild: {}", guild_cities.len());
    if !guild_cities.is_empty() {
        println!(
            "  {}",
            utils::preview_names(&guild_cities, utils::PREVIEW_LIMIT)
        );
    }

    let report = apply(db_path, &roster, dry_run)?;

    if report.column_added {
        let verb = if dry_run { "Would add" } else { "Added" };
        println!("{} {} column", verb.yellow(), GUILD_COLUMN);
    }

    if !report.unmatched.is_empty() {
        println!(
            "\n{} {} database cities have no CSV row (set to 0):",
            "Note:".yellow(),
            report.unmatched.len()
        );
        println!("{}", format_unmatched(&report.unmatched));
    }

    if dry_run {
        println!(
            "\n{} {} of {} cities would have a guild. No changes made.",
            "(DRY-RUN)".blue(),
            report.set_true,
            report.db_rows
        );
    } else {
        println!(
            "\nDatabase updated: {} of {} cities have a guild",
            report.set_true.to_string().green(),
            report.db_rows
        );
    }

    Ok(())
}

/// Format unmatched database names as a table
pub fn format_unmatched(names: &[String]) -> String {
    let mut table = utils::new_table(&["City (database)"]);
    for name in names {
        table.add_row(vec![name.as_str()]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::city_db::test_support::create_cities_db;
    use rusqlite::Connection;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("도시.csv");
        fs::write(&path, content).unwrap();
        path
    }

    fn guild_flags(db_path: &Path) -> Vec<(i64, i64)> {
        let conn = Connection::open(db_path).unwrap();
        let mut stmt = conn
            .prepare("SELECT Id, HasGuild FROM Cities ORDER BY Id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        rows
    }

    #[test]
    fn test_adds_column_and_sets_flag() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        let conn = create_cities_db(&db_path);
        conn.execute("INSERT INTO Cities (Id, Name) VALUES (1, 'Rivermouth')", [])
            .unwrap();
        drop(conn);
        let csv_path = write_csv(dir.path(), "\u{feff}도시명,조합\nRivermouth,○\n");

        let report = sync(&csv_path, &db_path, false).unwrap();

        assert!(report.column_added);
        assert_eq!(report.set_true, 1);
        assert_eq!(guild_flags(&db_path), vec![(1, 1)]);
    }

    #[test]
    fn test_exact_name_matching_and_default_false() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        let conn = create_cities_db(&db_path);
        conn.execute_batch(
            r#"
            INSERT INTO Cities (Id, Name) VALUES
                (1, '리스본'),
                (2, '세비야 '),
                (3, '나폴리'),
                (4, '베네치아'),
                (5, '알렉산드리아');
            "#,
        )
        .unwrap();
        drop(conn);
        let csv_path = write_csv(
            dir.path(),
            "도시명,조합\n 리스본 ,○\n세비야,○\n나폴리,\n알렉산드리아, ○\n",
        );

        let report = sync(&csv_path, &db_path, false).unwrap();

        assert_eq!(report.csv_cities, 4);
        assert_eq!(report.guild_cities, vec!["리스본", "세비야"]);
        assert_eq!(report.set_true, 1);
        assert_eq!(report.unmatched, vec!["세비야 ", "베네치아"]);
        assert_eq!(
            guild_flags(&db_path),
            vec![(1, 1), (2, 0), (3, 0), (4, 0), (5, 0)]
        );
    }

    #[test]
    fn test_existing_column_is_kept() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        let conn = create_cities_db(&db_path);
        conn.execute_batch(
            r#"
            ALTER TABLE Cities ADD COLUMN HasGuild INTEGER NOT NULL DEFAULT 1;
            INSERT INTO Cities (Id, Name, HasGuild) VALUES (1, 'a', 1), (2, 'b', 0);
            "#,
        )
        .unwrap();
        drop(conn);
        let csv_path = write_csv(dir.path(), "도시명,조합\na,\nb,○\n");

        let report = sync(&csv_path, &db_path, false).unwrap();

        assert!(!report.column_added);
        assert_eq!(guild_flags(&db_path), vec![(1, 0), (2, 1)]);

        // Column definition untouched
        let conn = Connection::open(&db_path).unwrap();
        let (notnull, default): (i64, Option<String>) = conn
            .query_row(
                "SELECT \"notnull\", dflt_value FROM pragma_table_info('Cities') WHERE name = 'HasGuild'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(notnull, 1);
        assert_eq!(default.as_deref(), Some("1"));
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        let conn = create_cities_db(&db_path);
        conn.execute("INSERT INTO Cities (Id, Name) VALUES (1, 'Rivermouth')", [])
            .unwrap();
        drop(conn);
        let csv_path = write_csv(dir.path(), "도시명,조합\nRivermouth,○\n");

        let report = sync(&csv_path, &db_path, true).unwrap();

        assert!(report.column_added);
        assert_eq!(report.set_true, 1);
        let db = CityDb::open(&db_path).unwrap();
        assert!(!db.has_column(GUILD_COLUMN).unwrap());
    }

    #[test]
    fn test_dry_run_on_read_only_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        let conn = create_cities_db(&db_path);
        conn.execute("INSERT INTO Cities (Id, Name) VALUES (1, 'Rivermouth')", [])
            .unwrap();
        drop(conn);
        let mut perms = fs::metadata(&db_path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&db_path, perms).unwrap();
        let csv_path = write_csv(dir.path(), "도시명,조합\nRivermouth,○\n");

        let report = sync(&csv_path, &db_path, true).unwrap();

        assert!(report.column_added);
        assert_eq!(report.set_true, 1);
        assert_eq!(report.db_rows, 1);
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let dir = tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "도시명,조합\nRivermouth,○\n");

        let result = sync(&csv_path, &dir.path().join("cdshelper.db"), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_csv_is_fatal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cdshelper.db");
        create_cities_db(&db_path);

        let result = sync(&dir.path().join("도시.csv"), &db_path, false);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_flags_null_name() {
        let roster = GuildRoster::from_reader("도시명,조합\nA,○\n".as_bytes()).unwrap();
        let rows = vec![(1, Some("A".to_string())), (2, None)];

        assert_eq!(resolve_flags(&rows, &roster), vec![(1, true), (2, false)]);
        assert!(unmatched_names(&rows, &roster).is_empty());
    }
}
