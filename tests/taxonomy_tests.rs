mod common;
use common::{backend, sign_in};
use healthlog::backend::{Backend, Filter, Table};
use healthlog::core::context::Context;
use healthlog::core::sync::{fetch_snapshot, sync};
use healthlog::core::taxonomy::{SeedReport, TaxonomyLogic};
use healthlog::db::mirror;
use healthlog::db::pool::DbPool;
use healthlog::errors::AppError;
use serde_json::json;

#[test]
fn seed_creates_the_default_taxonomy_once() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    let first = TaxonomyLogic::seed(&ctx).unwrap();
    assert_eq!(
        first,
        SeedReport {
            categories_created: 2,
            types_created: 4
        }
    );
    assert_eq!(TaxonomyLogic::seed(&ctx).unwrap(), SeedReport::default());

    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let names: Vec<&str> = snap.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Restroom", "Symptom"]);

    let restroom = snap.resolve_category("restroom").unwrap();
    let types: Vec<&str> = snap.types_in(&restroom.id).map(|t| t.name.as_str()).collect();
    assert_eq!(types, ["Bathroom Visit #1", "Bathroom Visit #2"]);

    // Every row carries the owner.
    assert!(
        be.rows(Table::EventTypes)
            .iter()
            .all(|r| r["user_id"] == json!(ctx.user_id()))
    );
}

#[test]
fn category_names_are_required_and_unique() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    let err = TaxonomyLogic::add_category(&ctx, "   ").unwrap_err();
    assert_eq!(err.to_string(), "Please enter a category name");

    let c = TaxonomyLogic::add_category(&ctx, "  Sleep ").unwrap();
    assert_eq!(c.name, "Sleep");
    assert!(matches!(
        TaxonomyLogic::add_category(&ctx, "sleep"),
        Err(AppError::Validation(_))
    ));

    // Written through to the mirror.
    let mirrored = mirror::load_snapshot(&pool.conn).unwrap();
    assert_eq!(mirrored.categories, vec![c]);
}

#[test]
fn type_names_are_unique_within_a_category_only() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    let pain = TaxonomyLogic::add_category(&ctx, "Pain").unwrap();
    let other = TaxonomyLogic::add_category(&ctx, "Other").unwrap();

    TaxonomyLogic::add_event_type(&ctx, &pain, "Back").unwrap();
    assert!(TaxonomyLogic::add_event_type(&ctx, &pain, "back").is_err());
    assert!(TaxonomyLogic::add_event_type(&ctx, &other, "Back").is_ok());

    let err = TaxonomyLogic::add_event_type(&ctx, &pain, "").unwrap_err();
    assert_eq!(err.to_string(), "Please enter an event type name");
}

#[test]
fn deleting_a_category_removes_its_types_first() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    TaxonomyLogic::seed(&ctx).unwrap();
    sync(&ctx).unwrap();

    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let restroom = snap.resolve_category("Restroom").unwrap();

    let removed = TaxonomyLogic::delete_category(&ctx, restroom).unwrap();
    assert_eq!(removed, 2);

    let after = fetch_snapshot(&be, &ctx.session).unwrap();
    assert_eq!(after.categories.len(), 1);
    assert_eq!(after.event_types.len(), 2);
    assert!(after.event_types.iter().all(|t| t.category_id != restroom.id));

    let mirrored = mirror::load_snapshot(&pool.conn).unwrap();
    assert_eq!(mirrored.categories.len(), 1);
    assert_eq!(mirrored.event_types.len(), 2);
}

#[test]
fn cascade_failure_leaves_the_category_in_place() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let symptom = snap.resolve_category("Symptom").unwrap();

    be.fail_next("connection reset");
    let err = TaxonomyLogic::delete_category(&ctx, symptom).unwrap_err();
    assert_eq!(err.to_string(), "connection reset (HTTP 500)");
    assert_eq!(fetch_snapshot(&be, &ctx.session).unwrap().categories.len(), 2);
}

#[test]
fn deleting_a_type_keeps_its_events_as_orphans() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    TaxonomyLogic::seed(&ctx).unwrap();
    be.insert(
        &ctx.session,
        Table::Events,
        json!({"date": "2025-03-04", "type": "Nausea", "timestamp": "2025-03-04T10:00:00Z",
               "user_id": ctx.user_id()}),
    )
    .unwrap();

    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let nausea = snap.resolve_event_type("nausea", None).unwrap();
    assert_eq!(snap.events_of_type(&nausea.name), 1);

    TaxonomyLogic::delete_event_type(&ctx, nausea).unwrap();

    let after = fetch_snapshot(&be, &ctx.session).unwrap();
    assert_eq!(after.events.len(), 1);
    assert!(after.is_orphan(&after.events[0]));
    assert!(matches!(
        TaxonomyLogic::delete_event_type(&ctx, nausea),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn deleting_a_shared_type_name_needs_the_id() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);

    TaxonomyLogic::seed(&ctx).unwrap();
    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    let restroom = snap.resolve_category("Restroom").unwrap();
    let second = TaxonomyLogic::add_event_type(&ctx, restroom, "Headache").unwrap();

    for ts in ["2025-03-04T10:00:00Z", "2025-03-04T18:00:00Z"] {
        be.insert(
            &ctx.session,
            Table::Events,
            json!({"date": "2025-03-04", "type": "Headache", "timestamp": ts,
                   "user_id": ctx.user_id()}),
        )
        .unwrap();
    }

    let snap = fetch_snapshot(&be, &ctx.session).unwrap();
    assert!(matches!(
        snap.resolve_single_event_type("headache"),
        Err(AppError::Ambiguous(_))
    ));

    // Removing one of the two leaves the name matched by the other.
    let by_id = snap.resolve_single_event_type(&second.id).unwrap();
    assert_eq!(by_id.category_id, restroom.id);
    assert_eq!(snap.events_orphaned_by(by_id), 0);

    TaxonomyLogic::delete_event_type(&ctx, by_id).unwrap();

    let after = fetch_snapshot(&be, &ctx.session).unwrap();
    assert!(after.events.iter().all(|e| !after.is_orphan(e)));
    let last = after.resolve_single_event_type("Headache").unwrap();
    assert_ne!(last.id, second.id);
    assert_eq!(after.events_orphaned_by(last), 2);
}

#[test]
fn users_never_see_each_other_rows() {
    let be = backend().with_user("bob@example.com", "bob-password");
    let pool = DbPool::in_memory().unwrap();
    let ctx = Context::new(&be, sign_in(&be, &pool), &pool.conn);
    TaxonomyLogic::seed(&ctx).unwrap();

    let bob = be.sign_in("bob@example.com", "bob-password").unwrap();
    assert!(fetch_snapshot(&be, &bob).unwrap().categories.is_empty());

    // Deleting someone else's row is a no-op.
    let id = fetch_snapshot(&be, &ctx.session).unwrap().categories[0].id.clone();
    let n = be
        .delete(&bob, Table::Categories, &[Filter::eq("id", &id)])
        .unwrap();
    assert_eq!(n, 0);

    // Stamping a foreign owner is refused.
    let err = be
        .insert(&bob, Table::Categories, json!({"name": "x", "user_id": ctx.user_id()}))
        .unwrap_err();
    assert!(err.to_string().contains("row-level security"));
}
