#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, NaiveDate, Utc};
use healthlog::backend::MemoryBackend;
use healthlog::core::auth::SessionManager;
use healthlog::db::mirror;
use healthlog::db::pool::DbPool;
use healthlog::models::category::EventCategory;
use healthlog::models::event::Event;
use healthlog::models::event_type::EventType;
use healthlog::models::session::Session;
use healthlog::models::snapshot::Snapshot;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "s3cret-pass";
pub const STORAGE_KEY: &str = "health-tracker-auth";

pub fn hl() -> Command {
    cargo_bin_cmd!("healthlog")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_healthlog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

pub fn category(id: &str, name: &str) -> EventCategory {
    EventCategory {
        id: id.into(),
        name: name.into(),
        user_id: Some("u1".into()),
        created_at: None,
    }
}

pub fn event_type(id: &str, name: &str, category_id: &str) -> EventType {
    EventType {
        id: id.into(),
        name: name.into(),
        category_id: category_id.into(),
        user_id: Some("u1".into()),
        created_at: None,
    }
}

pub fn event(id: &str, day: &str, kind: &str, timestamp: &str, notes: Option<&str>) -> Event {
    Event {
        id: id.into(),
        date: date(day),
        kind: kind.into(),
        notes: notes.map(str::to_string),
        timestamp: ts(timestamp),
        user_id: Some("u1".into()),
    }
}

/// Restroom {Bathroom Visit #1, #2}, Symptom {Headache, Nausea} and a few
/// events in the first week of March 2025; "Dizziness" has no event type.
pub fn sample_snapshot() -> Snapshot {
    Snapshot {
        categories: vec![category("c1", "Restroom"), category("c2", "Symptom")],
        event_types: vec![
            event_type("t1", "Bathroom Visit #1", "c1"),
            event_type("t2", "Bathroom Visit #2", "c1"),
            event_type("t3", "Headache", "c2"),
            event_type("t4", "Nausea", "c2"),
        ],
        events: vec![
            event("e1", "2025-03-04", "Headache", "2025-03-04T14:00:00Z", Some("after lunch")),
            event("e2", "2025-03-04", "Bathroom Visit #1", "2025-03-04T08:00:00Z", None),
            event("e3", "2025-03-04", "Bathroom Visit #2", "2025-03-04T20:30:00Z", None),
            event("e4", "2025-03-06", "Nausea", "2025-03-06T09:15:00Z", None),
            event("e5", "2025-03-08", "Dizziness", "2025-03-08T11:00:00Z", None),
            event("e6", "2025-04-01", "Headache", "2025-04-01T10:00:00Z", None),
        ],
    }
}

/// Initialize the DB through the CLI and fill the mirror with `sample_snapshot`.
pub fn init_db_with_mirror(db_path: &str) {
    hl().args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    let pool = DbPool::open(db_path).expect("open db");
    mirror::replace_snapshot(&pool.conn, &sample_snapshot()).expect("seed mirror");
}

/// Backend with one registered account.
pub fn backend() -> MemoryBackend {
    MemoryBackend::new().with_user(EMAIL, PASSWORD)
}

/// Sign `EMAIL` in against `backend`, persisting the session in `pool`.
pub fn sign_in(backend: &MemoryBackend, pool: &DbPool) -> Session {
    SessionManager::new(backend, &pool.conn, STORAGE_KEY)
        .sign_in(EMAIL, PASSWORD, false)
        .expect("sign in")
}
