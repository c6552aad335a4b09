//! Event form: add, edit, delete.

use crate::backend::Table;
use crate::core::context::Context;
use crate::core::sync::decode_row;
use crate::db::{log::ttlog_quiet, mirror};
use crate::errors::{AppError, AppResult};
use crate::models::event::{Event, EventPatch, NewEvent};
use crate::models::snapshot::Snapshot;
use crate::utils::date::today;
use crate::utils::time::local_instant;
use chrono::{NaiveDate, NaiveTime, Utc};

/// Values collected by the `add` command.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub type_ref: String,
    pub category_ref: Option<String>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

fn clean_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Resolve the event type the form refers to; the stored value is its name.
fn resolve_type_name(
    snapshot: &Snapshot,
    type_ref: &str,
    category_ref: Option<&str>,
) -> AppResult<String> {
    if type_ref.trim().is_empty() {
        return Err(AppError::Validation("Please select an event type".into()));
    }

    let category_id = match category_ref {
        Some(r) => Some(snapshot.resolve_category(r)?.id.clone()),
        None => None,
    };

    let et = snapshot.resolve_event_type(type_ref.trim(), category_id.as_deref())?;
    Ok(et.name.clone())
}

pub struct EventLogic;

impl EventLogic {
    pub fn add(ctx: &Context, snapshot: &Snapshot, input: &EventInput) -> AppResult<Event> {
        let kind = resolve_type_name(snapshot, &input.type_ref, input.category_ref.as_deref())?;

        let date = input.date.unwrap_or_else(today);
        let timestamp = match input.time {
            Some(t) => local_instant(date, t)?,
            None => Utc::now(),
        };

        let payload = NewEvent {
            date,
            kind,
            notes: clean_notes(input.notes.as_deref()),
            timestamp,
            user_id: ctx.user_id().to_string(),
        };

        let row = ctx
            .backend
            .insert(&ctx.session, Table::Events, serde_json::to_value(&payload)?)?;
        let event: Event = decode_row(row)?;

        mirror::upsert_event(ctx.conn, &event)?;
        ttlog_quiet(
            ctx.conn,
            "add",
            &event.id,
            &format!("{} {} {}", event.date_str(), event.time_str(), event.kind),
        );
        Ok(event)
    }

    /// Change type and/or notes; date and timestamp stay as they were.
    pub fn edit(
        ctx: &Context,
        snapshot: &Snapshot,
        id: &str,
        type_ref: Option<&str>,
        notes: Option<&str>,
    ) -> AppResult<Event> {
        let current = snapshot
            .event(id)
            .ok_or_else(|| AppError::NotFound(format!("event '{}'", id)))?;

        let patch = EventPatch {
            kind: match type_ref {
                Some(t) => Some(resolve_type_name(snapshot, t, None)?),
                None => None,
            },
            // An empty --notes clears the field.
            notes: notes.map(|n| n.trim().to_string()),
        };

        if patch.is_empty() {
            return Err(AppError::Validation(
                "Nothing to change: pass --type and/or --notes".into(),
            ));
        }

        let row = ctx.backend.update(
            &ctx.session,
            Table::Events,
            &current.id,
            serde_json::to_value(&patch)?,
        )?;
        let event: Event = decode_row(row)?;

        mirror::upsert_event(ctx.conn, &event)?;
        ttlog_quiet(
            ctx.conn,
            "edit",
            &event.id,
            &format!("{} {}", event.date_str(), event.kind),
        );
        Ok(event)
    }

    pub fn delete(ctx: &Context, id: &str) -> AppResult<()> {
        let removed = ctx
            .backend
            .delete(&ctx.session, Table::Events, &ctx.own_row(id))?;
        if removed == 0 {
            return Err(AppError::NotFound(format!("event '{}'", id)));
        }

        mirror::delete_row(ctx.conn, Table::Events, id)?;
        ttlog_quiet(ctx.conn, "del", id, "event deleted");
        Ok(())
    }
}
