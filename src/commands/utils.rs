//! Shared utilities for commands

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use serde_json::Value;

/// How many guild city names to show in the summary
pub const PREVIEW_LIMIT: usize = 10;

/// Join the first `limit` names, with a trailing "..." if any were cut
pub fn preview_names<S: AsRef<str>>(names: &[S], limit: usize) -> String {
    let shown: Vec<&str> = names.iter().take(limit).map(AsRef::as_ref).collect();
    let mut out = shown.join(", ");
    if names.len() > limit {
        out.push_str(", ...");
    }
    out
}

/// Render a JSON value compactly for table cells (`-` for a missing value)
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

/// Build a table with the shared preset
pub fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new).collect::<Vec<_>>());
    table
}
