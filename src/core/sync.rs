//! Fetching the signed-in user's records and keeping the mirror in step.

use crate::backend::{Backend, Filter, Table};
use crate::core::context::Context;
use crate::db::{log::ttlog_quiet, mirror};
use crate::errors::AppResult;
use crate::models::session::Session;
use crate::models::snapshot::Snapshot;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Decode backend rows into records.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> AppResult<Vec<T>> {
    Ok(serde_json::from_value(Value::Array(rows))?)
}

pub fn decode_row<T: DeserializeOwned>(row: Value) -> AppResult<T> {
    Ok(serde_json::from_value(row)?)
}

pub fn select_owned<T: DeserializeOwned>(
    backend: &dyn Backend,
    session: &Session,
    table: Table,
    extra: &[Filter],
) -> AppResult<Vec<T>> {
    let mut filters = vec![Filter::owner(session)];
    filters.extend_from_slice(extra);
    decode_rows(backend.select(session, table, &filters)?)
}

/// Categories, event types and events of the session's user.
pub fn fetch_snapshot(backend: &dyn Backend, session: &Session) -> AppResult<Snapshot> {
    let snapshot = Snapshot {
        categories: select_owned(backend, session, Table::Categories, &[])?,
        event_types: select_owned(backend, session, Table::EventTypes, &[])?,
        events: select_owned(backend, session, Table::Events, &[])?,
    };

    debug!(
        categories = snapshot.categories.len(),
        event_types = snapshot.event_types.len(),
        events = snapshot.events.len(),
        "snapshot fetched"
    );
    Ok(snapshot)
}

/// Fetch a fresh snapshot and make it the new mirror.
pub fn refresh_mirror(ctx: &Context) -> AppResult<Snapshot> {
    let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;
    mirror::replace_snapshot(ctx.conn, &snapshot)?;
    mirror::set_mirror_owner(ctx.conn, ctx.user_id())?;
    Ok(snapshot)
}

/// `sync` command: refresh the mirror and record it in the audit log.
pub fn sync(ctx: &Context) -> AppResult<Snapshot> {
    let snapshot = refresh_mirror(ctx)?;
    ttlog_quiet(
        ctx.conn,
        "sync",
        "",
        &format!(
            "{} categories, {} event types, {} events",
            snapshot.categories.len(),
            snapshot.event_types.len(),
            snapshot.events.len()
        ),
    );
    Ok(snapshot)
}
