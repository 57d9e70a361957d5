//! Template parameters of the daily report email.

use crate::core::aggregator::{self, Totals};
use crate::db::records::load_records_between;
use crate::db::store::KvStore;
use crate::errors::AppResult;
use crate::models::work_record::WorkRecord;
use crate::utils::time::hours_1dp;
use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

pub const NO_RECORD: &str = "--:--";

/// Flat parameter object handed to the email template. Every value is a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParams {
    pub to_email: String,
    pub to_name: String,
    pub from_name: String,
    pub date: String,
    pub weekday: String,
    pub start_time: String,
    pub end_time: String,
    pub total_hours: String,
    pub total_sessions: String,
    pub week_hours: String,
    pub last_week_hours: String,
    pub month_hours: String,
    pub last_month_hours: String,
    pub message: String,
}

/// Closing line of the report, chosen by how long the day was.
pub fn time_based_message(total_seconds: i64, has_records: bool) -> &'static str {
    if !has_records {
        return "No work was recorded on this day.";
    }

    let hours = total_seconds as f64 / 3600.0;
    if hours < 4.0 {
        "A short day today. See you tomorrow!"
    } else if hours < 8.0 {
        "Thanks for your work today!"
    } else if hours < 10.0 {
        "A productive day. Get some rest!"
    } else {
        "That was a long day. Take a proper break!"
    }
}

/// Build the report for `day` from the records it and its week/month hold.
pub fn build_report<S: KvStore, Tz: TimeZone>(
    store: &S,
    tz: &Tz,
    day: NaiveDate,
    to_email: &str,
    from_name: &str,
) -> AppResult<ReportParams>
where
    Tz::Offset: std::fmt::Display,
{
    let by_day = load_records_between(store, aggregator::totals_window_start(day), day)?;
    let totals = aggregator::totals(&by_day, day);
    let records: &[WorkRecord] = by_day.get(&day).map(Vec::as_slice).unwrap_or(&[]);

    Ok(assemble(tz, day, records, &totals, to_email, from_name))
}

pub fn assemble<Tz: TimeZone>(
    tz: &Tz,
    day: NaiveDate,
    records: &[WorkRecord],
    totals: &Totals,
    to_email: &str,
    from_name: &str,
) -> ReportParams
where
    Tz::Offset: std::fmt::Display,
{
    let hhmm = |ts: chrono::DateTime<chrono::Utc>| ts.with_timezone(tz).format("%H:%M").to_string();

    let start_time = records
        .iter()
        .map(|r| r.start_time)
        .min()
        .map(hhmm)
        .unwrap_or_else(|| NO_RECORD.to_string());
    let end_time = records
        .iter()
        .map(|r| r.end_time)
        .max()
        .map(hhmm)
        .unwrap_or_else(|| NO_RECORD.to_string());

    ReportParams {
        to_email: to_email.to_string(),
        to_name: to_email.split('@').next().unwrap_or_default().to_string(),
        from_name: from_name.to_string(),
        date: day.format("%Y-%m-%d").to_string(),
        weekday: day.format("%a").to_string(),
        start_time,
        end_time,
        total_hours: hours_1dp(totals.day),
        total_sessions: records.len().to_string(),
        week_hours: hours_1dp(totals.week),
        last_week_hours: hours_1dp(totals.last_week),
        month_hours: hours_1dp(totals.month),
        last_month_hours: hours_1dp(totals.last_month),
        message: time_based_message(totals.day, !records.is_empty()).to_string(),
    }
}
