use super::with_context;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::import::ImportLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Import { file } = &cli.command {
        let stored = with_context(cfg, cli.offline, "import", |ctx| {
            ImportLogic::import(ctx, file)
        })?;

        if stored.is_empty() {
            info("Nothing to import.");
        } else {
            success(format!("Imported {} events", stored.len()));
        }
    }
    Ok(())
}
