use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Live state of the tracker, persisted under the `workStatus` key.
///
/// Invariants:
/// - `is_working == start_time.is_some()`
/// - while working: `total_today == saved_total_today + current_session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStatus {
    pub is_working: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub current_session: i64,
    pub total_today: i64,
    pub saved_total_today: i64,
    #[serde(default)]
    pub auto_stop_hours: f64,

    /// Calendar day `total_today` refers to.
    #[serde(default)]
    pub day: Option<NaiveDate>,
    /// Pending auto-stop deadline, if any.
    #[serde(default)]
    pub auto_stop_at: Option<DateTime<Utc>>,
    /// When the user actually started; `start_time` moves to midnight on a split.
    #[serde(default)]
    pub session_start: Option<DateTime<Utc>>,
}

impl Default for WorkStatus {
    fn default() -> Self {
        Self {
            is_working: false,
            start_time: None,
            current_session: 0,
            total_today: 0,
            saved_total_today: 0,
            auto_stop_hours: 0.0,
            day: None,
            auto_stop_at: None,
            session_start: None,
        }
    }
}

impl WorkStatus {
    pub fn is_consistent(&self) -> bool {
        if self.is_working != self.start_time.is_some() {
            return false;
        }
        if self.current_session < 0 || self.saved_total_today < 0 {
            return false;
        }
        !self.is_working || self.total_today == self.saved_total_today + self.current_session
    }

    /// Stopped status carrying the day's closed total forward.
    pub fn idle(day: NaiveDate, total_today: i64, auto_stop_hours: f64) -> Self {
        Self {
            total_today,
            saved_total_today: total_today,
            auto_stop_hours,
            day: Some(day),
            ..Self::default()
        }
    }
}
