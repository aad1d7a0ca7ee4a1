//! Sync-cities command - Copy coordinates and library flags from the database into cities.json
//!
//! For every JSON city whose `id` exists in the `Cities` table:
//! - `pixelX` / `pixelY` are overwritten when the database value is not NULL
//! - `hasLibrary` is always overwritten
//!
//! Cities without a matching id are left alone. The whole file is rewritten.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::utils;
use crate::store::city_json::{self, CityJson};
use crate::store::{CityDb, CityRow};

/// A single field value that the sync changes
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub id: i64,
    pub name: Option<String>,
    pub field: &'static str,
    /// `None` when the field was absent before the sync
    pub old: Option<Value>,
    pub new: Value,
}

/// Result of merging database rows into the JSON cities
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Entries whose id matched a database row
    pub updated: usize,
    /// Matched entries with at least one value that differs from before
    pub changed: usize,
    /// Field values that actually differ from before
    pub changes: Vec<FieldChange>,
}

/// Summary of a sync-cities run
#[derive(Debug, Default)]
pub struct CitySyncReport {
    pub db_rows: usize,
    pub json_entries: usize,
    pub updated: usize,
    /// Entries with at least one changed value
    pub changed: usize,
    /// Entries whose final pixelX and pixelY are both truthy
    pub with_coords: usize,
    pub changes: Vec<FieldChange>,
}

/// Index database rows by id; a repeated id keeps the last row
pub fn index_by_id(rows: Vec<CityRow>) -> HashMap<i64, CityRow> {
    rows.into_iter().map(|row| (row.id, row)).collect()
}

/// Apply database values to the JSON city list in place
pub fn merge_cities(cities: &mut [Value], source: &HashMap<i64, CityRow>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for city in cities.iter_mut() {
        let Some(row) = city_json::city_id(city).and_then(|id| source.get(&id)) else {
            continue;
        };
        let Some(obj) = city.as_object_mut() else {
            continue;
        };

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| row.name.clone());

        // NULL coordinates in the database never erase what the JSON has
        let mut updates = Vec::with_capacity(3);
        if let Some(x) = &row.pixel_x {
            updates.push(("pixelX", x.clone()));
        }
        if let Some(y) = &row.pixel_y {
            updates.push(("pixelY", y.clone()));
        }
        updates.push(("hasLibrary", Value::Bool(row.has_library)));

        let changes_before = outcome.changes.len();
        for (field, value) in updates {
            let old = obj.insert(field.to_string(), value.clone());
            if old.as_ref() != Some(&value) {
                outcome.changes.push(FieldChange {
                    id: row.id,
                    name: name.clone(),
                    field,
                    old,
                    new: value,
                });
            }
        }

        outcome.updated += 1;
        if outcome.changes.len() > changes_before {
            outcome.changed += 1;
        }
    }

    outcome
}

/// Run the sync: load both stores, merge, and rewrite the JSON unless `dry_run`
pub fn sync(db_path: &Path, json_path: &Path, dry_run: bool) -> Result<CitySyncReport> {
    let db = CityDb::open_read_only(db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    let rows = db
        .cities()
        .with_context(|| format!("Failed to read cities from: {}", db_path.display()))?;
    let db_rows = rows.len();
    let source = index_by_id(rows);

    let mut doc = CityJson::load(json_path)
        .with_context(|| format!("Failed to load: {}", json_path.display()))?;
    let json_entries = doc.cities.len();

    let outcome = merge_cities(&mut doc.cities, &source);

    if !dry_run {
        doc.save()
            .with_context(|| format!("Failed to write: {}", doc.path().display()))?;
    }

    let with_coords = doc
        .cities
        .iter()
        .filter(|c| city_json::has_coordinates(c))
        .count();

    Ok(CitySyncReport {
        db_rows,
        json_entries,
        updated: outcome.updated,
        changed: outcome.changed,
        with_coords,
        changes: outcome.changes,
    })
}

/// Execute the sync-cities command
pub fn execute(db_path: &Path, json_path: &Path, dry_run: bool) -> Result<()> {
    println!("{}", "Syncing cities.json from database...".green());
    println!("  Database: {}", db_path.display());
    println!("  JSON:     {}", json_path.display());
    println!();

    let report = sync(db_path, json_path, dry_run)?;

    println!("Loaded {} cities from database", report.db_rows);
    println!("Loaded {} cities from JSON", report.json_entries);
    println!(
        "Updated {} cities ({} with changed values)",
        report.updated.to_string().green(),
        report.changed
    );

    if dry_run {
        if !report.changes.is_empty() {
            println!("\n{}", format_changes(&report.changes));
        }
        println!(
            "\n{} {} not written.",
            "(DRY-RUN)".blue(),
            json_path.display()
        );
    } else {
        println!("Saved: {}", json_path.display());
    }

    println!("Cities with coordinates: {}", report.with_coords);

    Ok(())
}

/// Format the list of changed values as a table
pub fn format_changes(changes: &[FieldChange]) -> String {
    let mut table = utils::new_table(&["ID", "City", "Field", "Old", "New"]);

    for change in changes {
        table.add_row(vec![
            change.id.to_string(),
            change.name.clone().unwrap_or_else(|| "-".to_string()),
            change.field.to_string(),
            utils::display_value(change.old.as_ref()),
            utils::display_value(Some(&change.new)),
        ]);
    }

    table.to_string()
}
