mod common;
use common::{EMAIL, PASSWORD, STORAGE_KEY, backend, sample_snapshot, sign_in};
use healthlog::backend::Backend;
use healthlog::core::auth::SessionManager;
use healthlog::db::pool::DbPool;
use healthlog::db::{mirror, notes, session};
use healthlog::errors::AppError;
use healthlog::models::session::AuthEvent;
use std::cell::RefCell;

#[test]
fn sign_in_persists_the_session() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();

    let s = sign_in(&be, &pool);
    assert_eq!(s.email.as_deref(), Some(EMAIL));

    let stored = session::load_session(&pool.conn, STORAGE_KEY).unwrap();
    assert_eq!(stored, Some(s.clone()));

    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);
    assert_eq!(mgr.require().unwrap(), s);
}

#[test]
fn wrong_password_surfaces_the_backend_message() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);

    let err = mgr.sign_in(EMAIL, "nope-nope", false).unwrap_err();
    assert_eq!(err.to_string(), "Invalid login credentials (HTTP 400)");
    assert!(matches!(mgr.require(), Err(AppError::NotAuthenticated)));
}

#[test]
fn login_with_create_falls_back_to_sign_up() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);

    assert!(mgr.sign_in("new@example.com", "another-pass", false).is_err());

    let s = mgr.sign_in("new@example.com", "another-pass", true).unwrap();
    assert_eq!(s.email.as_deref(), Some("new@example.com"));

    // The account now exists for a plain login.
    assert!(be.sign_in("new@example.com", "another-pass").is_ok());
}

#[test]
fn sign_up_never_falls_back() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);

    let err = mgr.sign_up(EMAIL, PASSWORD).unwrap_err();
    assert!(err.to_string().contains("User already registered"));

    let err = mgr.sign_up("short@example.com", "123").unwrap_err();
    assert!(err.to_string().contains("at least 6 characters"));
}

#[test]
fn credentials_are_validated_locally() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);

    assert!(matches!(mgr.sign_in("not-an-email", PASSWORD, false), Err(AppError::Validation(_))));
    assert!(matches!(mgr.sign_up(EMAIL, ""), Err(AppError::Validation(_))));
}

#[test]
fn expiring_session_is_refreshed_and_reported() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mut s = sign_in(&be, &pool);

    s.expires_at = 0;
    session::save_session(&pool.conn, STORAGE_KEY, &s).unwrap();

    let events = RefCell::new(Vec::new());
    let mut mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);
    mgr.on_auth_state_change(|e, _| events.borrow_mut().push(e));

    let fresh = mgr.current().unwrap().unwrap();
    assert_ne!(fresh.access_token, s.access_token);
    assert!(!fresh.needs_refresh());
    assert_eq!(
        session::load_session(&pool.conn, STORAGE_KEY).unwrap(),
        Some(fresh)
    );
    drop(mgr);
    assert_eq!(events.into_inner(), vec![AuthEvent::TokenRefreshed]);
}

#[test]
fn rejected_refresh_signs_out() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let mut s = sign_in(&be, &pool);

    s.expires_at = 0;
    s.refresh_token = "revoked".into();
    session::save_session(&pool.conn, STORAGE_KEY, &s).unwrap();

    let mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);
    assert!(matches!(mgr.require(), Err(AppError::NotAuthenticated)));
    assert!(session::load_session(&pool.conn, STORAGE_KEY).unwrap().is_none());
}

#[test]
fn sign_out_forgets_the_session() {
    let be = backend();
    let pool = DbPool::in_memory().unwrap();
    let s = sign_in(&be, &pool);

    let events = RefCell::new(Vec::new());
    let mut mgr = SessionManager::new(&be, &pool.conn, STORAGE_KEY);
    mgr.on_auth_state_change(|e, session| events.borrow_mut().push((e, session.is_some())));

    assert!(mgr.sign_out().unwrap());
    assert!(!mgr.sign_out().unwrap());
    drop(mgr);

    assert_eq!(events.into_inner(), vec![(AuthEvent::SignedOut, false)]);
    // The old token is dead on the backend too.
    assert!(be.select(&s, healthlog::backend::Table::Events, &[]).is_err());
}

#[test]
fn another_user_starts_with_an_empty_mirror() {
    let be = backend().with_user("bob@example.com", "bob-password");
    let pool = DbPool::in_memory().unwrap();

    sign_in(&be, &pool);
    mirror::replace_snapshot(&pool.conn, &sample_snapshot()).unwrap();
    notes::set_note(&pool.conn, common::date("2025-03-04"), "slept badly").unwrap();

    // Same user again: nothing is lost.
    sign_in(&be, &pool);
    assert_eq!(mirror::load_snapshot(&pool.conn).unwrap().events.len(), 6);

    SessionManager::new(&be, &pool.conn, STORAGE_KEY)
        .sign_in("bob@example.com", "bob-password", false)
        .unwrap();
    assert!(mirror::load_snapshot(&pool.conn).unwrap().events.is_empty());
    assert!(notes::get_note(&pool.conn, common::date("2025-03-04")).unwrap().is_none());
}
