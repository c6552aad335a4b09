use super::with_context;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::sync::sync;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let snapshot = with_context(cfg, cli.offline, "sync", sync)?;
    success(format!(
        "Mirror refreshed: {} categories, {} event types, {} events",
        snapshot.categories.len(),
        snapshot.event_types.len(),
        snapshot.events.len()
    ));
    Ok(())
}
