use super::{backend, session_manager};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::context::Context;
use crate::core::sync::refresh_mirror;
use crate::core::watch::WatchLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREY, RESET};
use chrono::Local;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { max } = &cli.command {
        let backend = backend(cfg, cli.offline, "watch")?;
        let pool = DbPool::open(&cfg.database)?;
        let session = session_manager(&backend, &pool.conn, cfg).require()?;

        // Start from a fresh mirror; the feed only carries what happens next.
        let ctx = Context::new(&backend, session, &pool.conn);
        refresh_mirror(&ctx)?;

        info("Watching for changes (Ctrl-C to stop)…");
        let seen = WatchLogic::run(cfg, &ctx.session, &pool.conn, *max, |change| {
            let what = change
                .record
                .as_ref()
                .or(change.old_record.as_ref())
                .and_then(|r| r.get("type"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            println!(
                "{GREY}{}{RESET}  {:<6}  {}  {}",
                Local::now().format("%H:%M:%S"),
                change.kind.as_str(),
                change.row_id().unwrap_or("?"),
                what
            );
        })?;

        success(format!("Feed closed after {} change(s)", seen));
    }

    Ok(())
}
