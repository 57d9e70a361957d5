//! Named alarms with one-shot or periodic semantics.
//!
//! Alarms are polled, not pushed: the owner calls `take_due(now)` from its tick
//! loop. A late poll fires each due alarm once, with its original due time;
//! periodic alarms skip the periods they missed.

use crate::errors::{AppError, AppResult};
use crate::utils::date::start_of_day;
use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlarmName {
    AutoStop,
    Midnight,
    EmailReport,
}

impl fmt::Display for AlarmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlarmName::AutoStop => "autoStop",
            AlarmName::Midnight => "midnight",
            AlarmName::EmailReport => "emailReport",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub due: DateTime<Utc>,
    pub period: Option<TimeDelta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub name: AlarmName,
    pub due: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Alarms {
    alarms: BTreeMap<AlarmName, Alarm>,
}

impl Alarms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an alarm.
    pub fn set(&mut self, name: AlarmName, due: DateTime<Utc>, period: Option<TimeDelta>) {
        self.alarms.insert(name, Alarm { due, period });
    }

    pub fn clear(&mut self, name: AlarmName) -> bool {
        self.alarms.remove(&name).is_some()
    }

    pub fn get(&self, name: AlarmName) -> Option<&Alarm> {
        self.alarms.get(&name)
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.alarms.values().map(|a| a.due).min()
    }

    /// Remove or reschedule every alarm due at `now`, returning them in due order.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<Fired> {
        let mut fired: Vec<Fired> = Vec::new();
        let mut expired = Vec::new();

        for (name, alarm) in self.alarms.iter_mut() {
            if alarm.due > now {
                continue;
            }
            fired.push(Fired {
                name: *name,
                due: alarm.due,
            });

            match alarm.period {
                Some(period) if period > TimeDelta::zero() => {
                    while alarm.due <= now {
                        alarm.due += period;
                    }
                }
                _ => expired.push(*name),
            }
        }

        for name in expired {
            self.alarms.remove(&name);
        }

        fired.sort_by_key(|f| f.due);
        fired
    }
}

/// Next occurrence of the local wall-clock `time` strictly after `now`.
pub fn next_daily<Tz: TimeZone>(
    tz: &Tz,
    time: NaiveTime,
    now: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    let today = now.with_timezone(tz).date_naive();

    for offset in 0..=2u64 {
        let day = today
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| AppError::InvalidDate(today.to_string()))?;
        let candidate = match tz.from_local_datetime(&day.and_time(time)).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            // Wall-clock time skipped by a DST change.
            None => {
                start_of_day(tz, day)? + TimeDelta::seconds(time.num_seconds_from_midnight() as i64)
            }
        };
        if candidate > now {
            return Ok(candidate);
        }
    }

    Err(AppError::AmbiguousTime(format!("next {} after {}", time, now)))
}
