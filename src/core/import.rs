//! Restore events from a JSON export (ids preserved, merged on id).

use crate::backend::Table;
use crate::core::context::Context;
use crate::core::sync::decode_rows;
use crate::db::{log::ttlog_quiet, mirror};
use crate::errors::AppResult;
use crate::export::read_json;
use crate::models::event::Event;
use crate::utils::path::absolute_file;

pub struct ImportLogic;

impl ImportLogic {
    /// Returns the events now stored on the backend.
    pub fn import(ctx: &Context, file: &str) -> AppResult<Vec<Event>> {
        let path = absolute_file(file)?;

        let events = read_json(&path)?
            .into_iter()
            .map(|row| row.into_event(ctx.user_id()))
            .collect::<AppResult<Vec<Event>>>()?;

        if events.is_empty() {
            return Ok(Vec::new());
        }

        let rows = events
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        let stored: Vec<Event> =
            decode_rows(ctx.backend.upsert(&ctx.session, Table::Events, rows)?)?;

        for e in &stored {
            mirror::upsert_event(ctx.conn, e)?;
        }

        ttlog_quiet(
            ctx.conn,
            "import",
            "events",
            &format!("{} events from {}", stored.len(), path.display()),
        );
        Ok(stored)
    }
}
