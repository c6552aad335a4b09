//! Time utilities: parsing HH:MM and turning local wall-clock times into instants.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

pub fn parse_optional_time(input: Option<&String>) -> AppResult<Option<NaiveTime>> {
    if let Some(s) = input {
        let t = parse_time(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))?;
        Ok(Some(t))
    } else {
        Ok(None)
    }
}

/// Instant of `time` on `date` in the local timezone.
pub fn local_instant(date: NaiveDate, time: NaiveTime) -> AppResult<DateTime<Utc>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::InvalidTime(format!("{} {} does not exist locally", date, time)))
}
