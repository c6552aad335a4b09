pub mod add;
pub mod auth;
pub mod category;
pub mod config;
pub mod db;
pub mod day;
pub mod del;
pub mod edit;
pub mod event_type;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod log;
pub mod month;
pub mod note;
pub mod seed;
pub mod sync;
pub mod watch;
pub mod week;

use crate::backend::{Backend, RestBackend};
use crate::config::Config;
use crate::core::auth::SessionManager;
use crate::core::context::Context;
use crate::core::sync::refresh_mirror;
use crate::db::log::ttlog_quiet;
use crate::db::mirror;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::session::AuthEvent;
use crate::models::snapshot::Snapshot;
use crate::ui::messages::warning;
use rusqlite::Connection;

/// Backend client for `what`; refused in offline mode.
pub(crate) fn backend(cfg: &Config, offline: bool, what: &str) -> AppResult<RestBackend> {
    if offline {
        return Err(AppError::Offline(what.to_string()));
    }
    RestBackend::from_config(cfg)
}

/// Session manager whose auth-state changes land in the audit log.
pub(crate) fn session_manager<'a>(
    backend: &'a dyn Backend,
    conn: &'a Connection,
    cfg: &Config,
) -> SessionManager<'a> {
    let mut mgr = SessionManager::new(backend, conn, &cfg.storage_key);
    mgr.on_auth_state_change(move |event, session| {
        let target = session.map(|s| s.display_name().to_string()).unwrap_or_default();
        let (op, msg) = match event {
            AuthEvent::SignedIn => ("login", "signed in"),
            AuthEvent::SignedOut => ("logout", "signed out"),
            AuthEvent::TokenRefreshed => ("token_refreshed", "session refreshed"),
        };
        ttlog_quiet(conn, op, &target, msg);
    });
    mgr
}

/// Open the database, require a session and run `f` against the backend.
pub(crate) fn with_context<T, F>(cfg: &Config, offline: bool, what: &str, f: F) -> AppResult<T>
where
    F: FnOnce(&Context) -> AppResult<T>,
{
    let backend = backend(cfg, offline, what)?;
    let pool = DbPool::open(&cfg.database)?;
    let session = session_manager(&backend, &pool.conn, cfg).require()?;

    let ctx = Context::new(&backend, session, &pool.conn);
    f(&ctx)
}

/// Snapshot for a view: fresh from the backend (mirror refreshed) or,
/// offline, from the mirror.
pub(crate) fn view_snapshot(cfg: &Config, offline: bool) -> AppResult<(DbPool, Snapshot)> {
    let pool = DbPool::open(&cfg.database)?;

    if offline {
        if mirror::last_synced_at(&pool.conn)?.is_none() {
            warning("The local mirror has never been synced; run `healthlog sync` while online.");
        }
        let snapshot = mirror::load_snapshot(&pool.conn)?;
        return Ok((pool, snapshot));
    }

    let backend = RestBackend::from_config(cfg)?;
    let snapshot = {
        let session = session_manager(&backend, &pool.conn, cfg).require()?;
        let ctx = Context::new(&backend, session, &pool.conn);
        refresh_mirror(&ctx)?
    };
    Ok((pool, snapshot))
}
