//! Schema migrations for the local database.
//!
//! Every migration is recorded in the `log` table as
//! `operation = 'migration_applied', target = <version>` and runs only once.

use rusqlite::{Connection, OptionalExtension, Result};
use tracing::info;

/// (version, description, SQL)
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20250301_0001_session",
        "Created session table",
        r#"
        CREATE TABLE IF NOT EXISTS session (
            storage_key TEXT PRIMARY KEY,
            payload     TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "#,
    ),
    (
        "20250301_0002_mirror",
        "Created mirror tables for categories, event types and events",
        r#"
        CREATE TABLE IF NOT EXISTS mirror_categories (
            seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            id         TEXT NOT NULL UNIQUE,
            name       TEXT NOT NULL,
            user_id    TEXT,
            created_at TEXT
        );

        CREATE TABLE IF NOT EXISTS mirror_event_types (
            seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            id         TEXT NOT NULL UNIQUE,
            name       TEXT NOT NULL,
            categoryid TEXT NOT NULL,
            user_id    TEXT,
            created_at TEXT
        );

        CREATE TABLE IF NOT EXISTS mirror_events (
            seq       INTEGER PRIMARY KEY AUTOINCREMENT,
            id        TEXT NOT NULL UNIQUE,
            date      TEXT NOT NULL,
            type      TEXT NOT NULL,
            notes     TEXT,
            timestamp TEXT NOT NULL,
            user_id   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_mirror_events_date ON mirror_events(date, timestamp);
        "#,
    ),
    (
        "20250315_0003_day_notes",
        "Created day_notes table",
        r#"
        CREATE TABLE IF NOT EXISTS day_notes (
            date       TEXT PRIMARY KEY,
            text       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ),
    (
        "20250402_0004_mirror_meta",
        "Created mirror_meta table",
        r#"
        CREATE TABLE IF NOT EXISTS mirror_meta (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    ),
];

/// Ensure that the `log` table exists; migrations are tracked in it.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, version: &str, description: &str, sql: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, description],
    )?;
    tx.commit()?;

    info!(version, "{}", description);
    Ok(())
}

/// Versions of every migration that has been applied, in order.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Public entry point: run all pending migrations. Returns how many ran.
///
/// Called from `init_db` on every open.
pub fn run_pending_migrations(conn: &Connection) -> Result<usize> {
    ensure_log_table(conn)?;

    let mut applied = 0;
    for (version, description, sql) in MIGRATIONS {
        if !is_applied(conn, version)? {
            apply(conn, version, description, sql)?;
            applied += 1;
        }
    }

    Ok(applied)
}
