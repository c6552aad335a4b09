use super::day::format_summary;
use super::view_snapshot;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::views::month_calendar;
use crate::errors::{AppError, AppResult};
use crate::models::summary::MonthCalendar;
use crate::ui::messages::header;
use crate::utils::colors::{GREY, RESET};
use crate::utils::date;
use crate::utils::formatting::pad_left;
use chrono::{Datelike, NaiveDate, Weekday};

const CELL: usize = 8;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Month { month, offset } = &cli.command {
        let (y, m) = match month {
            Some(s) => date::parse_month(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => {
                let t = date::today();
                (t.year(), t.month())
            }
        };
        let (y, m) = date::shift_month(y, m, *offset)?;
        let week_start = cfg.week_start()?;

        let (_pool, snapshot) = view_snapshot(cfg, cli.offline)?;
        let cal = month_calendar(&snapshot, y, m, week_start)
            .ok_or_else(|| AppError::InvalidDate(format!("{}-{:02}", y, m)))?;

        print_grid(&cal, week_start);

        println!();
        let mut any = false;
        for day in cal.days().filter(|d| d.total > 0) {
            any = true;
            println!(
                "{}  {:>2} event(s)  {}",
                day.date.format("%a %d"),
                day.total,
                format_summary(cfg, &day.summary)
            );
        }
        if !any {
            println!("No events this month");
        } else {
            println!("\nTotal: {}", cal.total_events());
        }
    }

    Ok(())
}

fn print_grid(cal: &MonthCalendar, week_start: Weekday) {
    let title = NaiveDate::from_ymd_opt(cal.year, cal.month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    header(title);

    let mut wd = week_start;
    let mut line = String::new();
    for _ in 0..7 {
        line.push_str(&pad_left(&wd.to_string(), CELL));
        wd = wd.succ();
    }
    println!("{}", line);

    for week in &cal.weeks {
        let mut line = String::new();
        for cell in week {
            let text = match cell {
                Some(d) if d.total > 0 => format!("{} ({})", d.date.day(), d.total),
                Some(d) => format!("{GREY}{}{RESET}", d.date.day()),
                None => String::new(),
            };
            line.push_str(&pad_left(&text, CELL));
        }
        println!("{}", line);
    }
}
