// src/export/json_csv.rs

use crate::errors::{AppError, AppResult};
use crate::export::{EventExport, notify_export_success};
use crate::ui::messages::info;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Export JSON pretty-printed.
pub fn export_json(events: &[EventExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(events)?;

    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", events.len(), path);
    Ok(())
}

/// Export CSV (header from the serde field names).
pub fn export_csv(events: &[EventExport], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)?;
    for item in events {
        wtr.serialize(item)?;
    }
    wtr.flush()?;

    notify_export_success("CSV", events.len(), path);
    Ok(())
}

/// Read a JSON export back.
pub fn read_json(path: &Path) -> AppResult<Vec<EventExport>> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Validation(format!("{} is not a JSON export: {}", path.display(), e)))
}
