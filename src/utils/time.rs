//! Time utilities: parsing HH:MM, formatting second counters and hour totals.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

/// Validate an auto-stop value given on the command line.
pub fn parse_hours(s: &str) -> AppResult<f64> {
    let h: f64 = s
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidHours(s.to_string()))?;
    if !h.is_finite() || h < 0.0 {
        return Err(AppError::InvalidHours(s.to_string()));
    }
    Ok(h)
}

/// `HH:MM:SS` counter, as shown for a running session.
pub fn format_hms(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Hours rounded to one decimal, e.g. `10800` → `"3.0"`.
pub fn hours_1dp(seconds: i64) -> String {
    format!("{:.1}", seconds as f64 / 3600.0)
}
