mod common;
use common::{event, sample_snapshot};
use healthlog::backend::{ChangeEvent, ChangeKind, Table};
use healthlog::core::watch::replay;
use healthlog::db::mirror;
use healthlog::db::pool::DbPool;
use healthlog::errors::AppError;
use serde_json::json;

fn change(kind: ChangeKind, record: serde_json::Value) -> ChangeEvent {
    let (record, old_record) = match kind {
        ChangeKind::Delete => (None, Some(record)),
        _ => (Some(record), None),
    };
    ChangeEvent {
        table: Table::Events,
        kind,
        record,
        old_record,
    }
}

#[test]
fn snapshot_survives_a_round_trip_in_taxonomy_order() {
    let pool = DbPool::in_memory().unwrap();
    let snapshot = sample_snapshot();
    mirror::replace_snapshot(&pool.conn, &snapshot).unwrap();

    let loaded = mirror::load_snapshot(&pool.conn).unwrap();
    assert_eq!(loaded.categories, snapshot.categories);
    assert_eq!(loaded.event_types, snapshot.event_types);
    assert_eq!(loaded.events.len(), snapshot.events.len());
    assert!(mirror::last_synced_at(&pool.conn).unwrap().is_some());

    // Replacing drops rows that vanished upstream.
    let mut smaller = snapshot.clone();
    smaller.events.truncate(2);
    mirror::replace_snapshot(&pool.conn, &smaller).unwrap();
    assert_eq!(mirror::count_rows(&pool.conn, Table::Events).unwrap(), 2);
}

#[test]
fn changes_replay_in_arrival_order_last_write_wins() {
    let pool = DbPool::in_memory().unwrap();

    let insert = json!({"id": "e9", "date": "2025-03-05", "type": "Headache",
        "notes": "mild", "timestamp": "2025-03-05T10:00:00Z", "user_id": "u1"});
    let update = json!({"id": "e9", "date": "2025-03-05", "type": "Nausea",
        "notes": "worse", "timestamp": "2025-03-05T10:00:00Z", "user_id": "u1"});

    let mut kinds = Vec::new();
    let applied = replay(
        &pool.conn,
        vec![
            Ok(change(ChangeKind::Insert, insert)),
            Ok(change(ChangeKind::Update, update)),
        ],
        |c| kinds.push(c.kind),
    )
    .unwrap();
    assert_eq!(applied, 2);
    assert_eq!(kinds, [ChangeKind::Insert, ChangeKind::Update]);

    let snap = mirror::load_snapshot(&pool.conn).unwrap();
    assert_eq!(snap.events.len(), 1);
    assert_eq!(snap.events[0].kind, "Nausea");
    assert_eq!(snap.events[0].notes.as_deref(), Some("worse"));

    replay(
        &pool.conn,
        vec![Ok(change(ChangeKind::Delete, json!({"id": "e9"})))],
        |_| {},
    )
    .unwrap();
    assert!(mirror::load_snapshot(&pool.conn).unwrap().events.is_empty());
}

#[test]
fn replay_stops_at_the_first_feed_error() {
    let pool = DbPool::in_memory().unwrap();
    let first = json!({"id": "e9", "date": "2025-03-05", "type": "Headache",
        "timestamp": "2025-03-05T10:00:00Z", "user_id": "u1"});
    let never = json!({"id": "e10", "date": "2025-03-05", "type": "Nausea",
        "timestamp": "2025-03-05T11:00:00Z", "user_id": "u1"});

    let mut calls = 0;
    let result = replay(
        &pool.conn,
        vec![
            Ok(change(ChangeKind::Insert, first)),
            Err(AppError::Realtime("socket closed".into())),
            Ok(change(ChangeKind::Insert, never)),
        ],
        |_| calls += 1,
    );

    assert!(matches!(result, Err(AppError::Realtime(_))));
    assert_eq!(calls, 1);
    let ids: Vec<String> = mirror::load_snapshot(&pool.conn)
        .unwrap()
        .events
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, ["e9"]);
}

#[test]
fn change_without_payload_is_ignored() {
    let pool = DbPool::in_memory().unwrap();
    let empty = ChangeEvent {
        table: Table::Events,
        kind: ChangeKind::Delete,
        record: None,
        old_record: None,
    };
    assert!(!mirror::apply_change(&pool.conn, &empty).unwrap());

    // Deleting a row the mirror never saw is not an error.
    let unknown = change(ChangeKind::Delete, json!({"id": "nope"}));
    assert!(!mirror::apply_change(&pool.conn, &unknown).unwrap());
}

#[test]
fn clear_forgets_rows_and_owner() {
    let pool = DbPool::in_memory().unwrap();
    mirror::replace_snapshot(&pool.conn, &sample_snapshot()).unwrap();
    mirror::set_mirror_owner(&pool.conn, "u1").unwrap();
    mirror::upsert_event(
        &pool.conn,
        &event("x", "2025-01-01", "Headache", "2025-01-01T00:00:00Z", None),
    )
    .unwrap();

    mirror::clear(&pool.conn).unwrap();
    assert!(mirror::mirror_owner(&pool.conn).unwrap().is_none());
    for t in Table::ALL {
        assert_eq!(mirror::count_rows(&pool.conn, t).unwrap(), 0);
    }
}

#[test]
fn migrations_run_once() {
    let pool = DbPool::in_memory().unwrap();
    let versions = healthlog::db::migrate::applied_versions(&pool.conn).unwrap();
    assert_eq!(versions.len(), 4);

    let again = healthlog::db::initialize::init_db(&pool.conn).unwrap();
    assert_eq!(again, 0);
}
