use super::view_snapshot;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::views::{category_summary, day_events};
use crate::db::notes::get_note;
use crate::errors::{AppError, AppResult};
use crate::models::snapshot::Snapshot;
use crate::models::summary::CategoryCount;
use crate::ui::messages::header;
use crate::utils::colors::{GREY, RESET, paint_category};
use crate::utils::date;
use crate::utils::formatting::{bold, wrap_indented};
use chrono::NaiveDate;

const NOTES_WIDTH: usize = 72;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Day { date: date_arg } = &cli.command {
        let d = match date_arg {
            Some(s) => date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => date::today(),
        };

        let (pool, snapshot) = view_snapshot(cfg, cli.offline)?;
        print_day(cfg, &snapshot, d);

        if let Some(note) = get_note(&pool.conn, d)? {
            println!("\n📝 {}", bold("Note"));
            println!("{}", wrap_indented(&note.text, NOTES_WIDTH, "   "));
        }
    }

    Ok(())
}

pub(crate) fn format_summary(cfg: &Config, summary: &[CategoryCount]) -> String {
    summary
        .iter()
        .map(|c| paint_category(cfg, &c.name, &format!("{} {}", c.name, c.count)))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn print_day(cfg: &Config, snapshot: &Snapshot, d: NaiveDate) {
    header(d.format("%A, %B %-d, %Y"));

    let events = day_events(snapshot, d);
    if events.is_empty() {
        println!("No events for this day");
        return;
    }

    for e in &events {
        let category = snapshot.category_name_for(&e.kind);
        let label = if category.is_empty() {
            format!("{} {GREY}(type no longer exists){RESET}", e.kind)
        } else {
            paint_category(cfg, &category, &format!("{}: {}", category, e.kind))
        };

        println!("{}  {}  {GREY}[{}]{RESET}", e.time_str(), label, e.id);
        if let Some(notes) = e.notes_text() {
            println!("{}", wrap_indented(notes, NOTES_WIDTH, "       "));
        }
    }

    let summary = category_summary(snapshot, &events);
    println!();
    println!("Total: {}", events.len());
    if !summary.is_empty() {
        println!("By category: {}", format_summary(cfg, &summary));
    }
}
