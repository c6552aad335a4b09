use super::with_context;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::taxonomy::TaxonomyLogic;
use crate::db::log::ttlog_quiet;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    with_context(cfg, cli.offline, "seed", |ctx| {
        let report = TaxonomyLogic::seed(ctx)?;

        if report.categories_created == 0 && report.types_created == 0 {
            info("Default categories and event types already exist.");
        } else {
            ttlog_quiet(
                ctx.conn,
                "seed",
                "",
                &format!(
                    "{} categories, {} event types",
                    report.categories_created, report.types_created
                ),
            );
            success(format!(
                "Created {} categories and {} event types",
                report.categories_created, report.types_created
            ));
        }
        Ok(())
    })
}
