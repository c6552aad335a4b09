use crate::errors::AppResult;
use crate::export::{EventExport, ExportFormat, ensure_writable, export_csv, export_json};
use crate::models::snapshot::Snapshot;
use crate::ui::messages::warning;
use crate::utils::date::parse_period;
use crate::utils::path::absolute_file;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::core::views::events_between;
use crate::db::log::ttlog_quiet;

pub struct ExportLogic;

impl ExportLogic {
    /// Rows for the events of `snapshot` inside `range` (everything when `None` or "all").
    pub fn rows(snapshot: &Snapshot, range: Option<&str>) -> AppResult<Vec<EventExport>> {
        let bounds = match range {
            Some(r) => parse_period(r)?,
            None => None,
        };
        let (start, end) = bounds.unwrap_or((NaiveDate::MIN, NaiveDate::MAX));

        Ok(events_between(snapshot, start, end)
            .into_iter()
            .map(|e| EventExport::from_event(snapshot, e))
            .collect())
    }

    /// Export the events.
    ///
    /// - `file`: absolute path of the output file
    /// - `range`: `None`, `"all"` or `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and `a:b` ranges
    ///
    /// Returns how many events were written.
    pub fn export(
        conn: &Connection,
        snapshot: &Snapshot,
        format: ExportFormat,
        file: &str,
        range: Option<&str>,
        force: bool,
    ) -> AppResult<usize> {
        let path = absolute_file(file)?;
        let rows = Self::rows(snapshot, range)?;

        if rows.is_empty() {
            warning("No events found for the selected range. Nothing to export.");
            return Ok(0);
        }

        ensure_writable(&path, force)?;

        match format {
            ExportFormat::Csv => export_csv(&rows, &path)?,
            ExportFormat::Json => export_json(&rows, &path)?,
        }

        ttlog_quiet(
            conn,
            "export",
            format.as_str(),
            &format!("{} events to {}", rows.len(), path.display()),
        );
        Ok(rows.len())
    }
}
