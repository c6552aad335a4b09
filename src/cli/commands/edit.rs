use super::with_context;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::events::EventLogic;
use crate::core::sync::fetch_snapshot;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Edit {
        id,
        event_type,
        notes,
    } = &cli.command
    {
        with_context(cfg, cli.offline, "edit", |ctx| {
            let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;
            let ev = EventLogic::edit(ctx, &snapshot, id, event_type.as_deref(), notes.as_deref())?;

            success(format!("Event {} updated: {}", ev.id, ev.kind));
            Ok(())
        })?;
    }

    Ok(())
}
