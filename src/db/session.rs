//! Persisted auth session, keyed by the configured storage key.

use crate::errors::AppResult;
use crate::models::session::Session;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, params};

pub fn save_session(conn: &Connection, storage_key: &str, session: &Session) -> AppResult<()> {
    let payload = serde_json::to_string(session)?;
    conn.execute(
        "INSERT INTO session (storage_key, payload, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(storage_key) DO UPDATE SET
            payload = excluded.payload,
            updated_at = excluded.updated_at",
        params![storage_key, payload, Local::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn load_session(conn: &Connection, storage_key: &str) -> AppResult<Option<Session>> {
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM session WHERE storage_key = ?1",
            [storage_key],
            |row| row.get(0),
        )
        .optional()?;

    match payload {
        Some(p) => Ok(Some(serde_json::from_str(&p)?)),
        None => Ok(None),
    }
}

pub fn clear_session(conn: &Connection, storage_key: &str) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM session WHERE storage_key = ?1", [storage_key])?;
    Ok(n > 0)
}
