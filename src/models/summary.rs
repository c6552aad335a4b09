use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-category tally, kept in taxonomy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub name: String,
    pub total: usize,
    /// Daily average over the 7 days of the week, one decimal.
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_events: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub total: usize,
    pub summary: Vec<CategoryCount>,
}

/// A month laid out as calendar rows; `None` pads days outside the month.
#[derive(Debug, Clone)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<DayCell>; 7]>,
}

impl MonthCalendar {
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flat_map(|w| w.iter().flatten())
    }

    pub fn total_events(&self) -> usize {
        self.days().map(|d| d.total).sum()
    }
}
