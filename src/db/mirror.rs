//! Local mirror of the signed-in user's records.
//!
//! The mirror is a cache: the backend stays authoritative. Rows keep their
//! first-seen order (`seq`), updates overwrite in place (last write wins).

use crate::backend::{ChangeEvent, ChangeKind, Table};
use crate::errors::{AppError, AppResult};
use crate::models::category::EventCategory;
use crate::models::event::Event;
use crate::models::event_type::EventType;
use crate::models::snapshot::Snapshot;
use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

const META_OWNER: &str = "user_id";
const META_SYNCED_AT: &str = "synced_at";

fn mirror_table(table: Table) -> &'static str {
    match table {
        Table::Categories => "mirror_categories",
        Table::EventTypes => "mirror_event_types",
        Table::Events => "mirror_events",
    }
}

fn conversion_error(e: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

pub fn upsert_category(conn: &Connection, c: &EventCategory) -> AppResult<()> {
    conn.execute(
        "INSERT INTO mirror_categories (id, name, user_id, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, user_id = excluded.user_id, created_at = excluded.created_at",
        params![c.id, c.name, c.user_id, c.created_at],
    )?;
    Ok(())
}

pub fn upsert_event_type(conn: &Connection, t: &EventType) -> AppResult<()> {
    conn.execute(
        "INSERT INTO mirror_event_types (id, name, categoryid, user_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, categoryid = excluded.categoryid,
            user_id = excluded.user_id, created_at = excluded.created_at",
        params![t.id, t.name, t.category_id, t.user_id, t.created_at],
    )?;
    Ok(())
}

pub fn upsert_event(conn: &Connection, e: &Event) -> AppResult<()> {
    conn.execute(
        "INSERT INTO mirror_events (id, date, type, notes, timestamp, user_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            date = excluded.date, type = excluded.type, notes = excluded.notes,
            timestamp = excluded.timestamp, user_id = excluded.user_id",
        params![
            e.id,
            e.date_str(),
            e.kind,
            e.notes,
            e.timestamp.to_rfc3339(),
            e.user_id
        ],
    )?;
    Ok(())
}

pub fn delete_row(conn: &Connection, table: Table, id: &str) -> AppResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", mirror_table(table));
    Ok(conn.execute(&sql, [id])? > 0)
}

/// Drop the mirrored event types of one category (client-side cascade).
pub fn delete_types_of_category(conn: &Connection, category_id: &str) -> AppResult<usize> {
    Ok(conn.execute(
        "DELETE FROM mirror_event_types WHERE categoryid = ?1",
        [category_id],
    )?)
}

fn map_category(row: &Row) -> rusqlite::Result<EventCategory> {
    Ok(EventCategory {
        id: row.get("id")?,
        name: row.get("name")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
    })
}

fn map_event_type(row: &Row) -> rusqlite::Result<EventType> {
    Ok(EventType {
        id: row.get("id")?,
        name: row.get("name")?,
        category_id: row.get("categoryid")?,
        user_id: row.get("user_id")?,
        created_at: row.get("created_at")?,
    })
}

fn map_event(row: &Row) -> rusqlite::Result<Event> {
    let date_str: String = row.get("date")?;
    let ts_str: String = row.get("timestamp")?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(AppError::InvalidDate(date_str.clone())))?;
    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(AppError::InvalidTime(ts_str.clone())))?;

    Ok(Event {
        id: row.get("id")?,
        date,
        kind: row.get("type")?,
        notes: row.get("notes")?,
        timestamp,
        user_id: row.get("user_id")?,
    })
}

pub fn load_snapshot(conn: &Connection) -> AppResult<Snapshot> {
    let mut snapshot = Snapshot::default();

    let mut stmt = conn.prepare("SELECT * FROM mirror_categories ORDER BY seq ASC")?;
    for r in stmt.query_map([], map_category)? {
        snapshot.categories.push(r?);
    }

    let mut stmt = conn.prepare("SELECT * FROM mirror_event_types ORDER BY seq ASC")?;
    for r in stmt.query_map([], map_event_type)? {
        snapshot.event_types.push(r?);
    }

    let mut stmt = conn.prepare("SELECT * FROM mirror_events ORDER BY date ASC, timestamp ASC")?;
    for r in stmt.query_map([], map_event)? {
        snapshot.events.push(r?);
    }

    Ok(snapshot)
}

/// Replace the whole mirror with a freshly fetched snapshot.
pub fn replace_snapshot(conn: &Connection, snapshot: &Snapshot) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "DELETE FROM mirror_events;
         DELETE FROM mirror_event_types;
         DELETE FROM mirror_categories;",
    )?;

    for c in &snapshot.categories {
        upsert_category(&tx, c)?;
    }
    for t in &snapshot.event_types {
        upsert_event_type(&tx, t)?;
    }
    for e in &snapshot.events {
        upsert_event(&tx, e)?;
    }

    set_meta(&tx, META_SYNCED_AT, &Local::now().to_rfc3339())?;
    tx.commit()?;
    Ok(())
}

/// Remove every mirrored row (used when another user signs in).
pub fn clear(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        "DELETE FROM mirror_events;
         DELETE FROM mirror_event_types;
         DELETE FROM mirror_categories;
         DELETE FROM mirror_meta;",
    )?;
    Ok(())
}

/// Replay one realtime change into the mirror, in arrival order.
/// Returns `false` when the change carried nothing usable.
pub fn apply_change(conn: &Connection, change: &ChangeEvent) -> AppResult<bool> {
    match change.kind {
        ChangeKind::Insert | ChangeKind::Update => {
            let Some(record) = change.record.clone() else {
                return Ok(false);
            };
            match change.table {
                Table::Categories => upsert_category(conn, &serde_json::from_value(record)?)?,
                Table::EventTypes => upsert_event_type(conn, &serde_json::from_value(record)?)?,
                Table::Events => upsert_event(conn, &serde_json::from_value(record)?)?,
            }
            Ok(true)
        }
        ChangeKind::Delete => match change.row_id() {
            Some(id) => delete_row(conn, change.table, id),
            None => Ok(false),
        },
    }
}

fn set_meta(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO mirror_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn get_meta(conn: &Connection, key: &str) -> AppResult<Option<String>> {
    Ok(conn
        .query_row("SELECT value FROM mirror_meta WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?)
}

pub fn mirror_owner(conn: &Connection) -> AppResult<Option<String>> {
    get_meta(conn, META_OWNER)
}

pub fn set_mirror_owner(conn: &Connection, user_id: &str) -> AppResult<()> {
    set_meta(conn, META_OWNER, user_id)
}

pub fn last_synced_at(conn: &Connection) -> AppResult<Option<String>> {
    get_meta(conn, META_SYNCED_AT)
}

pub fn count_rows(conn: &Connection, table: Table) -> AppResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", mirror_table(table));
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}
