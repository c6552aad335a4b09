mod common;
use common::{backend, date, sign_in, temp_out};
use healthlog::backend::Table;
use healthlog::core::context::Context;
use healthlog::core::events::{EventInput, EventLogic};
use healthlog::core::export::ExportLogic;
use healthlog::core::import::ImportLogic;
use healthlog::core::sync::{fetch_snapshot, sync};
use healthlog::core::taxonomy::TaxonomyLogic;
use healthlog::db::log::load_log;
use healthlog::db::mirror;
use healthlog::db::pool::DbPool;
use healthlog::errors::AppError;
use healthlog::export::ExportFormat;
use healthlog::utils::time::local_instant;
use chrono::NaiveTime;
use std::fs;

fn input(type_ref: &str) -> EventInput {
    EventInput {
        type_ref: type_ref.into(),
        ..Default::default()
    }
}

#[test]
fn event_type_is_required_and_must_exist() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let err = EventLogic::add(&ctx, &snap, &input("  ")).unwrap_err();
    assert_eq!(err.to_string(), "Please select an event type");

    assert!(matches!(
        EventLogic::add(&ctx, &snap, &input("Migraine")),
        Err(AppError::NotFound(_))
    ));

    // Headache lives in Symptom, not Restroom.
    let wrong_category = EventInput {
        category_ref: Some("Restroom".into()),
        ..input("Headache")
    };
    assert!(EventLogic::add(&ctx, &snap, &wrong_category).is_err());
    assert!(be.rows(Table::Events).is_empty());
}

#[test]
fn add_stores_the_type_name_date_and_local_time() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let at = NaiveTime::from_hms_opt(7, 45, 0).unwrap();
    let ev = EventLogic::add(
        &ctx,
        &snap,
        &EventInput {
            type_ref: "bathroom visit #1".into(),
            category_ref: Some("Restroom".into()),
            notes: Some("  early  ".into()),
            date: Some(date("2025-03-04")),
            time: Some(at),
        },
    )
    .unwrap();

    assert_eq!(ev.kind, "Bathroom Visit #1");
    assert_eq!(ev.date, date("2025-03-04"));
    assert_eq!(ev.notes.as_deref(), Some("early"));
    assert_eq!(ev.timestamp, local_instant(date("2025-03-04"), at).unwrap());
    assert_eq!(ev.time_str(), "07:45");
    assert_eq!(ev.user_id.as_deref(), Some(ctx.user_id()));

    // Mirror and audit log follow.
    assert_eq!(mirror::load_snapshot(&pool.conn).unwrap().events, vec![ev.clone()]);
    assert!(load_log(&pool.conn).unwrap().iter().any(|l| l.operation == "add" && l.target == ev.id));
}

#[test]
fn blank_notes_are_not_stored() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let ev = EventLogic::add(
        &ctx,
        &snap,
        &EventInput {
            notes: Some("   ".into()),
            ..input("Nausea")
        },
    )
    .unwrap();
    assert!(ev.notes.is_none());
}

#[test]
fn edit_changes_type_and_notes_but_keeps_date_and_timestamp() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let original = EventLogic::add(
        &ctx,
        &snap,
        &EventInput {
            date: Some(date("2025-02-01")),
            ..input("Headache")
        },
    )
    .unwrap();

    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let edited =
        EventLogic::edit(&ctx, &snap, &original.id, Some("Nausea"), Some("with dizziness")).unwrap();

    assert_eq!(edited.id, original.id);
    assert_eq!(edited.kind, "Nausea");
    assert_eq!(edited.notes.as_deref(), Some("with dizziness"));
    assert_eq!(edited.date, original.date);
    assert_eq!(edited.timestamp, original.timestamp);

    let cleared = EventLogic::edit(&ctx, &snap, &original.id, None, Some("")).unwrap();
    assert!(cleared.notes_text().is_none());

    assert!(matches!(
        EventLogic::edit(&ctx, &snap, &original.id, None, None),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        EventLogic::edit(&ctx, &snap, "evt-missing", Some("Nausea"), None),
        Err(AppError::NotFound(_))
    ));
    assert!(EventLogic::edit(&ctx, &snap, &original.id, Some("Migraine"), None).is_err());
}

#[test]
fn delete_removes_the_event_everywhere() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let ev = EventLogic::add(&ctx, &snap, &input("Headache")).unwrap();
    EventLogic::delete(&ctx, &ev.id).unwrap();

    assert!(be.rows(Table::Events).is_empty());
    assert!(mirror::load_snapshot(&pool.conn).unwrap().events.is_empty());
    assert!(matches!(
        EventLogic::delete(&ctx, &ev.id),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn backend_errors_keep_the_raw_message() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    be.fail_next("duplicate key value violates unique constraint");
    let err = EventLogic::add(&ctx, &snap, &input("Headache")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "duplicate key value violates unique constraint (HTTP 500)"
    );
    assert!(mirror::load_snapshot(&pool.conn).unwrap().events.is_empty());
}

#[test]
fn export_then_import_restores_deleted_events() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();

    let kept = EventLogic::add(
        &ctx,
        &snap,
        &EventInput {
            notes: Some("keep me".into()),
            date: Some(date("2025-03-04")),
            ..input("Headache")
        },
    )
    .unwrap();
    EventLogic::add(
        &ctx,
        &snap,
        &EventInput {
            date: Some(date("2024-12-31")),
            ..input("Nausea")
        },
    )
    .unwrap();

    let snap = sync(&ctx).unwrap();
    let out = temp_out("events_roundtrip", "json");
    let written =
        ExportLogic::export(&pool.conn, &snap, ExportFormat::Json, &out, Some("2025"), true).unwrap();
    assert_eq!(written, 1);

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("\"category\": \"Symptom\""));
    assert!(content.contains("keep me"));

    EventLogic::delete(&ctx, &kept.id).unwrap();
    let restored = ImportLogic::import(&ctx, &out).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id, kept.id);
    assert_eq!(restored[0].timestamp, kept.timestamp);

    // Importing again merges on id instead of duplicating.
    ImportLogic::import(&ctx, &out).unwrap();
    assert_eq!(be.rows(Table::Events).len(), 2);
}

#[test]
fn export_rejects_relative_paths_and_bad_ranges() {
    let snap = common::sample_snapshot();
    let pool = DbPool::in_memory().unwrap();

    assert!(ExportLogic::export(&pool.conn, &snap, ExportFormat::Csv, "out.csv", None, true).is_err());
    assert!(ExportLogic::rows(&snap, Some("2025-13")).is_err());
    assert!(ExportLogic::rows(&snap, Some("2025:2025-03")).is_err());

    assert_eq!(ExportLogic::rows(&snap, Some("2025-03")).unwrap().len(), 5);
    assert_eq!(ExportLogic::rows(&snap, Some("2025-03-04:2025-03-06")).unwrap().len(), 4);
    assert_eq!(ExportLogic::rows(&snap, Some("all")).unwrap().len(), 6);
    assert_eq!(ExportLogic::rows(&snap, None).unwrap().len(), 6);
}
