//! Closed command set accepted by the tracker, and what it answers.

use crate::models::work_record::WorkRecord;
use crate::models::work_status::WorkStatus;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a session; `auto_stop_hours` overrides the stored preference.
    StartWork { auto_stop_hours: Option<f64> },
    StopWork,
    /// Recompute counters. Catching up with the clock (midnight split,
    /// auto-stop, day reset) is persisted like any other command.
    GetStatus,
    /// Reschedule (or cancel with `0`) the auto-stop of the open session.
    SetAutoStop { hours: f64 },
    /// Periodic timer callback: recompute and persist counters.
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Started,
    AlreadyWorking,
    Stopped { records: Vec<WorkRecord> },
    AlreadyStopped,
    AutoStopScheduled { at: Option<DateTime<Utc>> },
    AutoStopCleared,
    Status,
}

/// Side effects of catching up with wall-clock time before a command runs.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    MidnightSplit { records: Vec<WorkRecord> },
    AutoStopped { at: DateTime<Utc>, records: Vec<WorkRecord> },
    DayReset { day: NaiveDate },
    ClockSkew { stored_start: DateTime<Utc> },
    TailDiscarded { start: DateTime<Utc>, restored: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub outcome: Outcome,
    pub events: Vec<TrackerEvent>,
    pub status: WorkStatus,
}
