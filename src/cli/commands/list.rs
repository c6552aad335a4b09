use super::view_snapshot;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::views::{events_between, orphans};
use crate::errors::AppResult;
use crate::ui::messages::{info, warning};
use crate::utils::colors::{colorize_optional, paint_category};
use crate::utils::date::{current_month_bounds, parse_period};
use crate::utils::table::Table;
use chrono::NaiveDate;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::List { period, orphans: only_orphans } = &cli.command {
        let (start, end) = match period {
            Some(p) => parse_period(p)?.unwrap_or((NaiveDate::MIN, NaiveDate::MAX)),
            None => current_month_bounds(),
        };

        let (_pool, snapshot) = view_snapshot(cfg, cli.offline)?;
        let mut events = events_between(&snapshot, start, end);
        let orphaned = orphans(&snapshot, &events);

        if *only_orphans {
            events = orphaned.clone();
        }

        if events.is_empty() {
            info("No events found for the selected period.");
            return Ok(());
        }

        let mut table = Table::new(&["DATE", "TIME", "CATEGORY", "TYPE", "NOTES", "ID"]);
        for e in &events {
            let category = snapshot.category_name_for(&e.kind);
            table.add_row(vec![
                e.date_str(),
                e.time_str(),
                if category.is_empty() {
                    colorize_optional("--")
                } else {
                    paint_category(cfg, &category, &category)
                },
                e.kind.clone(),
                e.notes_text().unwrap_or_default().to_string(),
                e.id.clone(),
            ]);
        }
        print!("{}", table.render());
        println!("\n{} event(s)", events.len());

        if !*only_orphans && !orphaned.is_empty() {
            warning(format!(
                "{} event(s) refer to an event type that no longer exists (use --orphans)",
                orphaned.len()
            ));
        }
    }

    Ok(())
}
