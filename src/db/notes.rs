use crate::errors::{AppError, AppResult};
use crate::models::note::DayNote;
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};

pub fn get_note(conn: &Connection, date: NaiveDate) -> AppResult<Option<DayNote>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT text, updated_at FROM day_notes WHERE date = ?1",
            [date.format("%Y-%m-%d").to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    Ok(row.map(|(text, updated_at)| DayNote {
        date,
        text,
        updated_at,
    }))
}

pub fn set_note(conn: &Connection, date: NaiveDate, text: &str) -> AppResult<DayNote> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Note is empty; use --clear to remove it".into(),
        ));
    }

    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO day_notes (date, text, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(date) DO UPDATE SET text = excluded.text, updated_at = excluded.updated_at",
        params![date.format("%Y-%m-%d").to_string(), text, now],
    )?;

    Ok(DayNote {
        date,
        text: text.to_string(),
        updated_at: now,
    })
}

pub fn clear_note(conn: &Connection, date: NaiveDate) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM day_notes WHERE date = ?1",
        [date.format("%Y-%m-%d").to_string()],
    )?;
    Ok(n > 0)
}

pub fn clear_all_notes(conn: &Connection) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM day_notes", [])?)
}
