use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound (exclusive) of a single record: one record never covers a whole day.
pub const MAX_RECORD_SECONDS: i64 = 86_400;

/// A closed work session scoped to a single calendar date.
///
/// The interval is half-open: `[start_time, end_time)`. A record cut at midnight
/// ends exactly at `00:00:00.000` of the following day and still belongs to the
/// day of `start_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration: i64, // seconds, floored
}

impl WorkRecord {
    /// Build a record from its bounds, computing the floored duration.
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> AppResult<Self> {
        let record = Self {
            start_time,
            end_time,
            duration: floor_seconds(start_time, end_time),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check every invariant a record must satisfy before it is persisted.
    pub fn validate(&self) -> AppResult<()> {
        if self.end_time < self.start_time {
            return Err(AppError::InvalidRecord(format!(
                "end {} is before start {}",
                self.end_time.to_rfc3339(),
                self.start_time.to_rfc3339()
            )));
        }

        if self.duration < 0 || self.duration >= MAX_RECORD_SECONDS {
            return Err(AppError::InvalidRecord(format!(
                "duration {}s out of range [0, {})",
                self.duration, MAX_RECORD_SECONDS
            )));
        }

        let expected = floor_seconds(self.start_time, self.end_time);
        if self.duration != expected {
            return Err(AppError::InvalidRecord(format!(
                "duration {}s does not match interval ({}s)",
                self.duration, expected
            )));
        }

        Ok(())
    }

    /// Calendar date the record belongs to, in the given zone.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.start_time.with_timezone(tz).date_naive()
    }
}

/// `floor((end - start) / 1000)` on millisecond timestamps.
pub fn floor_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_milliseconds().div_euclid(1000)
}
