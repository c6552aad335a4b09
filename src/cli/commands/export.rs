use super::view_snapshot;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::export::ExportLogic;
use crate::errors::AppResult;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = &cli.command
    {
        let (pool, snapshot) = view_snapshot(cfg, cli.offline)?;
        ExportLogic::export(&pool.conn, &snapshot, *format, file, range.as_deref(), *force)?;
    }
    Ok(())
}
