use super::with_context;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::events::EventLogic;
use crate::errors::AppResult;
use crate::ui::messages::{confirm, info, success};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = &cli.command {
        //
        // Confirmation prompt
        //
        if !*yes && !confirm("Do you want to remove this event? It cannot be undone.") {
            info("Operation cancelled.");
            return Ok(());
        }

        with_context(cfg, cli.offline, "del", |ctx| EventLogic::delete(ctx, id))?;
        success(format!("Event {} has been deleted.", id));
    }

    Ok(())
}
