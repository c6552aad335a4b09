use super::view_snapshot;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::views::{week_bounds, weekly_summary};
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::colors::paint_category;
use crate::utils::date;
use crate::utils::formatting::average;
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Week { offset } = &cli.command {
        let week_start = cfg.week_start()?;
        let (start, end) = week_bounds(date::today(), *offset, week_start)?;

        let (_pool, snapshot) = view_snapshot(cfg, cli.offline)?;
        let summary = weekly_summary(&snapshot, start, end);

        header(format!(
            "Week {} → {}",
            summary.start_date.format("%b %-d"),
            summary.end_date.format("%b %-d, %Y")
        ));
        println!("Total events: {}\n", summary.total_events);

        if !summary.categories.is_empty() {
            let mut table = Table::new(&["CATEGORY", "TOTAL", "AVG/DAY"]);
            for c in &summary.categories {
                table.add_row(vec![
                    paint_category(cfg, &c.name, &c.name),
                    c.total.to_string(),
                    average(c.average),
                ]);
            }
            print!("{}", table.render());
        }

        if !summary.events_by_type.is_empty() {
            println!("\nBy event type:");
            for (kind, count) in &summary.events_by_type {
                println!("  {:<24} {}", kind, count);
            }
        }
    }

    Ok(())
}
