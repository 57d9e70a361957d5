//! Midnight splitting: a session never produces a record that spans two days.

use crate::errors::{AppError, AppResult};
use crate::models::work_record::{WorkRecord, floor_seconds};
use crate::models::work_status::WorkStatus;
use crate::utils::date::{local_date, next_midnight};
use chrono::{DateTime, TimeZone, Utc};

/// Contiguous per-day pieces of `[start, end)`.
///
/// Each piece ends at the local midnight following its start, except the last
/// one which ends at `end`. Empty trailing pieces (a session stopped exactly at
/// midnight) are omitted.
pub fn split_interval<Tz: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> AppResult<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
    if end < start {
        return Err(AppError::InvalidRecord(format!(
            "session ends ({}) before it starts ({})",
            end.to_rfc3339(),
            start.to_rfc3339()
        )));
    }

    let mut pieces = Vec::new();
    let mut cursor = start;
    loop {
        let midnight = next_midnight(tz, cursor)?;
        if end <= midnight {
            if pieces.is_empty() || end > cursor {
                pieces.push((cursor, end));
            }
            break;
        }
        pieces.push((cursor, midnight));
        cursor = midnight;
    }

    Ok(pieces)
}

/// Outcome of closing a session: the records worth keeping and the pieces
/// that failed validation (e.g. a whole day spent with the process down).
#[derive(Debug, Default)]
pub struct Split {
    pub records: Vec<WorkRecord>,
    pub rejected: Vec<(DateTime<Utc>, DateTime<Utc>, AppError)>,
}

/// Close `[start, end)` into one record per calendar day.
pub fn split_session<Tz: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
) -> AppResult<Split> {
    let mut split = Split::default();
    for (from, to) in split_interval(start, end, tz)? {
        match WorkRecord::new(from, to) {
            Ok(r) => split.records.push(r),
            Err(e) => split.rejected.push((from, to, e)),
        }
    }
    Ok(split)
}

/// Result of rolling an open session over to the current day.
#[derive(Debug)]
pub struct Rollover {
    /// Closed pieces, one per earlier day.
    pub split: Split,
    /// The same session, restarted at today's midnight with a fresh daily total.
    pub status: WorkStatus,
}

/// Close the part of an open session that belongs to earlier days.
///
/// The new status keeps running from the last midnight; `saved_total_today`
/// restarts from zero.
pub fn rollover<Tz: TimeZone>(status: &WorkStatus, now: DateTime<Utc>, tz: &Tz) -> AppResult<Rollover> {
    let start = status
        .start_time
        .ok_or_else(|| AppError::Other("rollover requested without an open session".into()))?;

    let mut pieces = split_interval(start, now, tz)?;
    let today = local_date(tz, now);

    // The last piece is the part of the session that belongs to today.
    let resume_at = match pieces.last() {
        Some((from, _)) if local_date(tz, *from) == today => {
            let from = *from;
            pieces.pop();
            from
        }
        _ => now,
    };

    let mut split = Split::default();
    for (from, to) in pieces {
        match WorkRecord::new(from, to) {
            Ok(r) => split.records.push(r),
            Err(e) => split.rejected.push((from, to, e)),
        }
    }

    let current = floor_seconds(resume_at, now);
    let next = WorkStatus {
        is_working: true,
        start_time: Some(resume_at),
        current_session: current,
        total_today: current,
        saved_total_today: 0,
        day: Some(today),
        ..status.clone()
    };

    Ok(Rollover {
        split,
        status: next,
    })
}
