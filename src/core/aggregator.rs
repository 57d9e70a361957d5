//! Period totals over stored per-day records. Weeks run Monday to Sunday.

use crate::models::period::Period;
use crate::models::work_record::WorkRecord;
use crate::utils::date::{month_start, previous_month_end, week_start};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Sum of valid record durations for one day.
pub fn day_total(records: &[WorkRecord]) -> i64 {
    records
        .iter()
        .filter(|r| r.validate().is_ok())
        .map(|r| r.duration)
        .sum()
}

pub fn period_start(base: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Week => week_start(base),
        Period::Month => month_start(base),
    }
}

/// Sum over every day in `[period_start(base), base]`.
pub fn period_total(
    by_day: &BTreeMap<NaiveDate, Vec<WorkRecord>>,
    base: NaiveDate,
    period: Period,
) -> i64 {
    by_day
        .range(period_start(base, period)..=base)
        .map(|(_, records)| day_total(records))
        .sum()
}

/// Full previous week (Monday–Sunday) or full previous calendar month.
pub fn previous_period_total(
    by_day: &BTreeMap<NaiveDate, Vec<WorkRecord>>,
    base: NaiveDate,
    period: Period,
) -> i64 {
    let previous_end = match period {
        Period::Week => week_start(base) - Days::new(1),
        Period::Month => previous_month_end(base),
    };
    period_total(by_day, previous_end, period)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub day: i64,
    pub week: i64,
    pub last_week: i64,
    pub month: i64,
    pub last_month: i64,
}

pub fn totals(by_day: &BTreeMap<NaiveDate, Vec<WorkRecord>>, base: NaiveDate) -> Totals {
    Totals {
        day: by_day.get(&base).map(|r| day_total(r)).unwrap_or(0),
        week: period_total(by_day, base, Period::Week),
        last_week: previous_period_total(by_day, base, Period::Week),
        month: period_total(by_day, base, Period::Month),
        last_month: previous_period_total(by_day, base, Period::Month),
    }
}

/// Earliest day `totals(base)` reads.
pub fn totals_window_start(base: NaiveDate) -> NaiveDate {
    let last_week = week_start(base) - Days::new(7);
    let last_month = month_start(previous_month_end(base));
    last_week.min(last_month)
}
