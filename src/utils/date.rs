use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// "YYYY-MM" → (year, month)
pub fn parse_month(s: &str) -> Option<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
    Some((d.year(), d.month()))
}

/// Move (year, month) by `offset` months.
pub fn shift_month(year: i32, month: u32, offset: i32) -> AppResult<(i32, u32)> {
    let idx = year
        .checked_mul(12)
        .and_then(|v| v.checked_add(month as i32 - 1))
        .and_then(|v| v.checked_add(offset))
        .ok_or_else(|| AppError::InvalidDate(format!("month offset {} is out of range", offset)))?;
    Ok((idx.div_euclid(12), (idx.rem_euclid(12) + 1) as u32))
}

pub fn month_last_day(y: i32, m: u32) -> Option<u32> {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 => {
            let leap = (y % 4 == 0 && y % 100 != 0) || (y % 400 == 0);
            Some(if leap { 29 } else { 28 })
        }
        _ => None,
    }
}

/// Most recent `week_start` on or before `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() as i64
        - week_start.num_days_from_monday() as i64)
        % 7;
    date - Duration::days(back)
}

/// Column (0..7) of `date` in a week starting on `week_start`.
pub fn weekday_column(date: NaiveDate, week_start: Weekday) -> usize {
    ((7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7) as usize
}

fn bounds_of(part: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidDate(part.to_string());

    match part.len() {
        // YYYY
        4 => {
            let y: i32 = part.parse().map_err(|_| invalid())?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(invalid)?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(invalid)?;
            Ok((d1, d2))
        }
        // YYYY-MM
        7 => {
            let (y, m) = parse_month(part).ok_or_else(invalid)?;
            let last = month_last_day(y, m).ok_or_else(invalid)?;
            let d1 = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?;
            let d2 = NaiveDate::from_ymd_opt(y, m, last).ok_or_else(invalid)?;
            Ok((d1, d2))
        }
        // YYYY-MM-DD
        10 => {
            let d = parse_date(part).ok_or_else(invalid)?;
            Ok((d, d))
        }
        _ => Err(invalid()),
    }
}

/// Parse a period / range expression.
///
/// Supports:
/// - `all` (no bounds, returns `None`)
/// - YYYY, YYYY-MM, YYYY-MM-DD
/// - any `start:end` pair of the above (same format on both sides)
pub fn parse_period(r: &str) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
    let r = r.trim();
    if r.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    if let Some((start_raw, end_raw)) = r.split_once(':') {
        let (start, end) = (start_raw.trim(), end_raw.trim());
        if start.len() != end.len() {
            return Err(AppError::InvalidDate(format!(
                "{}: start and end must have the same format",
                r
            )));
        }

        let (d1, _) = bounds_of(start)?;
        let (_, d2) = bounds_of(end)?;
        if d1 > d2 {
            return Err(AppError::InvalidDate(format!("{}: start is after end", r)));
        }
        return Ok(Some((d1, d2)));
    }

    bounds_of(r).map(Some)
}

/// Bounds of the current month.
pub fn current_month_bounds() -> (NaiveDate, NaiveDate) {
    let t = today();
    let first = t.with_day(1).unwrap_or(t);
    let last = month_last_day(t.year(), t.month())
        .and_then(|d| t.with_day(d))
        .unwrap_or(t);
    (first, last)
}
