//! Calendar helpers: period parsing for listings and local-midnight arithmetic.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeDelta, TimeZone, Utc};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// First instant of `date` in `tz`, as UTC.
///
/// When the zone skips midnight (DST gap) the first valid instant of the hour
/// after is used.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> AppResult<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| AppError::InvalidDate(date.to_string()))?;

    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::AmbiguousTime(format!("midnight of {}", date)))
}

/// Local midnight that closes the calendar day of `ts`.
pub fn next_midnight<Tz: TimeZone>(tz: &Tz, ts: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
    let day = ts.with_timezone(tz).date_naive();
    let next = day
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::InvalidDate(day.to_string()))?;
    start_of_day(tz, next)
}

pub fn local_date<Tz: TimeZone>(tz: &Tz, ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date - Days::new(offset)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month preceding `date`'s month.
pub fn previous_month_end(date: NaiveDate) -> NaiveDate {
    month_start(date) - Days::new(1)
}

/// Every day in `[from, to]`, both ends included.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

pub fn all_days_of_month(year: i32, month: u32) -> AppResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::InvalidDate(format!("{year}-{month:02}")))?;
    Ok(first.iter_days().take_while(|d| d.month() == month).collect())
}

pub fn all_days_of_year(year: i32) -> AppResult<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::InvalidDate(year.to_string()))?;
    Ok(first.iter_days().take_while(|d| d.year() == year).collect())
}

/// Expand `YYYY`, `YYYY-MM` or `YYYY-MM-DD` into the days it covers.
pub fn generate_from_period(p: &str) -> AppResult<Vec<NaiveDate>> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Ok(vec![d]);
    }

    // YYYY-MM
    if let Some(dm) = parse_date(&format!("{p}-01")) {
        return all_days_of_month(dm.year(), dm.month());
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
    {
        return all_days_of_year(year);
    }

    Err(AppError::InvalidDate(format!("Invalid period: {}", p)))
}

/// Expand `START:END`, where both sides use any `generate_from_period` format.
pub fn generate_range(start: &str, end: &str) -> AppResult<Vec<NaiveDate>> {
    let s = generate_from_period(start)?;
    let e = generate_from_period(end)?;

    match (s.first(), e.last()) {
        (Some(first), Some(last)) if first <= last => Ok(days_between(*first, *last)),
        _ => Err(AppError::InvalidDate(format!("Invalid range: {start}:{end}"))),
    }
}

pub fn current_month_dates() -> AppResult<Vec<NaiveDate>> {
    let today = today();
    all_days_of_month(today.year(), today.month())
}
