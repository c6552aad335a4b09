//! Daily / weekly / monthly aggregations. Pure functions over a `Snapshot`.

use crate::errors::{AppError, AppResult};
use crate::models::event::Event;
use crate::models::snapshot::Snapshot;
use crate::models::summary::{
    CategoryCount, CategoryStats, DayCell, MonthCalendar, WeeklySummary,
};
use crate::utils::date::{month_last_day, start_of_week, weekday_column};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// Events attributed to `date`, ordered by timestamp.
pub fn day_events(snapshot: &Snapshot, date: NaiveDate) -> Vec<&Event> {
    let mut events: Vec<&Event> = snapshot.events.iter().filter(|e| e.date == date).collect();
    events.sort_by_key(|e| e.timestamp);
    events
}

/// Events with `start <= date <= end`, ordered by date then timestamp.
pub fn events_between(snapshot: &Snapshot, start: NaiveDate, end: NaiveDate) -> Vec<&Event> {
    let mut events: Vec<&Event> = snapshot
        .events
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .collect();
    events.sort_by_key(|e| (e.date, e.timestamp));
    events
}

/// Events whose type name matches no event type.
pub fn orphans<'a>(snapshot: &'a Snapshot, events: &[&'a Event]) -> Vec<&'a Event> {
    events
        .iter()
        .copied()
        .filter(|e| snapshot.is_orphan(e))
        .collect()
}

/// Count per category, in taxonomy order; categories without events are left out.
pub fn category_summary(snapshot: &Snapshot, events: &[&Event]) -> Vec<CategoryCount> {
    snapshot
        .categories
        .iter()
        .filter_map(|c| {
            let count = events
                .iter()
                .filter(|e| {
                    snapshot
                        .category_for_type(&e.kind)
                        .is_some_and(|cat| cat.id == c.id)
                })
                .count();
            (count > 0).then(|| CategoryCount {
                name: c.name.clone(),
                count,
            })
        })
        .collect()
}

/// Week containing `today` moved by `offset` weeks: (first day, last day).
pub fn week_bounds(
    today: NaiveDate,
    offset: i64,
    week_start: Weekday,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let out_of_range = || AppError::InvalidDate(format!("week offset {} is out of range", offset));

    let shift = Duration::try_weeks(offset).ok_or_else(out_of_range)?;
    let start = start_of_week(today, week_start)
        .checked_add_signed(shift)
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_signed(Duration::days(6))
        .ok_or_else(out_of_range)?;
    Ok((start, end))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn weekly_summary(snapshot: &Snapshot, start: NaiveDate, end: NaiveDate) -> WeeklySummary {
    let events = events_between(snapshot, start, end);

    let mut events_by_type: BTreeMap<String, usize> = BTreeMap::new();
    for e in &events {
        *events_by_type.entry(e.kind.clone()).or_default() += 1;
    }

    // Only categories with at least one event, in taxonomy order.
    let categories = category_summary(snapshot, &events)
        .into_iter()
        .map(|c| CategoryStats {
            average: round1(c.count as f64 / 7.0),
            total: c.count,
            name: c.name,
        })
        .collect();

    WeeklySummary {
        start_date: start,
        end_date: end,
        total_events: events.len(),
        events_by_type,
        categories,
    }
}

pub fn month_calendar(
    snapshot: &Snapshot,
    year: i32,
    month: u32,
    week_start: Weekday,
) -> Option<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last_day = month_last_day(year, month)?;

    let mut weeks: Vec<[Option<DayCell>; 7]> = Vec::new();
    let mut row: [Option<DayCell>; 7] = Default::default();

    for day in 1..=last_day {
        let date = first.with_day(day)?;
        let col = weekday_column(date, week_start);

        if col == 0 && day != 1 {
            weeks.push(std::mem::take(&mut row));
        }

        let events = day_events(snapshot, date);
        row[col] = Some(DayCell {
            date,
            total: events.len(),
            summary: category_summary(snapshot, &events),
        });
    }
    weeks.push(row);

    Some(MonthCalendar { year, month, weeks })
}
