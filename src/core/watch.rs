//! Realtime replay: change feed → local mirror.

use crate::backend::realtime::RealtimeChannel;
use crate::backend::{ChangeEvent, Table};
use crate::config::Config;
use crate::db::{log::ttlog_quiet, mirror};
use crate::errors::AppResult;
use crate::models::session::Session;
use rusqlite::Connection;
use tracing::{debug, info};

/// Apply changes in arrival order; the last write for a row wins.
/// Stops at the first feed error. `on_change` runs after each change reached
/// the mirror. Returns how many changes were replayed.
pub fn replay<I, F>(conn: &Connection, changes: I, mut on_change: F) -> AppResult<usize>
where
    I: IntoIterator<Item = AppResult<ChangeEvent>>,
    F: FnMut(&ChangeEvent),
{
    let mut seen = 0;
    for change in changes {
        let change = change?;
        let applied = mirror::apply_change(conn, &change)?;
        debug!(kind = change.kind.as_str(), applied, "change replayed");
        seen += 1;
        on_change(&change);
    }
    Ok(seen)
}

pub struct WatchLogic;

impl WatchLogic {
    /// Follow the `events` feed until the server closes it or `max` changes arrived.
    /// `on_change` runs after each change reached the mirror.
    pub fn run<F>(
        cfg: &Config,
        session: &Session,
        conn: &Connection,
        max: Option<usize>,
        on_change: F,
    ) -> AppResult<usize>
    where
        F: FnMut(&ChangeEvent),
    {
        let mut channel =
            RealtimeChannel::subscribe(&cfg.backend_url, &cfg.anon_key, session, Table::Events)?;
        ttlog_quiet(conn, "watch", Table::Events.name(), "subscribed to realtime changes");

        let mut closed = false;
        let feed = std::iter::from_fn(|| match channel.next_change() {
            Ok(Some(change)) => Some(Ok(change)),
            Ok(None) => {
                closed = true;
                None
            }
            Err(e) => Some(Err(e)),
        });
        let seen = replay(conn, feed.take(max.unwrap_or(usize::MAX)), on_change)?;

        if closed {
            info!("realtime feed closed by the server");
            return Ok(seen);
        }
        channel.close()?;
        Ok(seen)
    }
}
