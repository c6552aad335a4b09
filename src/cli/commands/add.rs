use super::with_context;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::events::{EventInput, EventLogic};
use crate::core::sync::fetch_snapshot;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::date;
use crate::utils::time::parse_optional_time;

/// Log a new event.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Add {
        event_type,
        category,
        notes,
        date: date_arg,
        time,
    } = &cli.command
    {
        //
        // 1. Parse date / time (optional)
        //
        let d = match date_arg {
            Some(s) => Some(date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?),
            None => None,
        };
        let t = parse_optional_time(time.as_ref())?;

        let input = EventInput {
            type_ref: event_type.clone(),
            category_ref: category.clone(),
            notes: notes.clone(),
            date: d,
            time: t,
        };

        //
        // 2. Validate against the current taxonomy and insert
        //
        with_context(cfg, cli.offline, "add", |ctx| {
            let snapshot = fetch_snapshot(ctx.backend, &ctx.session)?;
            let ev = EventLogic::add(ctx, &snapshot, &input)?;

            success(format!(
                "Event logged: {} on {} at {} (id {})",
                ev.kind,
                ev.date_str(),
                ev.time_str(),
                ev.id
            ));
            Ok(())
        })?;
    }

    Ok(())
}
