//! Running-session arithmetic: `tick(status, now) -> status'`.

use crate::models::work_record::floor_seconds;
use crate::models::work_status::WorkStatus;
use crate::utils::date::local_date;
use chrono::{DateTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Not working. Totals are reset when the status belongs to an earlier day.
    Idle(WorkStatus),
    /// Counters recomputed from the stored start time.
    Running(WorkStatus),
    /// The open session started on an earlier calendar day and must be split
    /// before ticking resumes.
    CrossedMidnight,
}

/// Recompute the counters of `status` at `now`.
///
/// A start time in the future (clock skew) is clamped to `now`.
pub fn tick<Tz: TimeZone>(status: &WorkStatus, now: DateTime<Utc>, tz: &Tz) -> Tick {
    let today = local_date(tz, now);

    let Some(start) = status.start_time.filter(|_| status.is_working) else {
        let mut next = status.clone();
        next.is_working = false;
        next.start_time = None;
        next.current_session = 0;
        next.auto_stop_at = None;
        next.session_start = None;
        if next.day != Some(today) {
            next.total_today = 0;
            next.saved_total_today = 0;
            next.day = Some(today);
        }
        return Tick::Idle(next);
    };

    let start = start.min(now);
    if local_date(tz, start) != today {
        return Tick::CrossedMidnight;
    }

    let mut next = status.clone();
    if next.day != Some(today) {
        next.saved_total_today = 0;
    }
    next.start_time = Some(start);
    next.session_start = next.session_start.map(|s| s.min(now));
    next.current_session = floor_seconds(start, now);
    next.total_today = next.saved_total_today + next.current_session;
    next.day = Some(today);
    Tick::Running(next)
}
