//! Single owner of the work status.
//!
//! Every command first catches up with wall-clock time (overdue auto-stop,
//! stale sessions, midnight splits, day change) and then applies the command.
//! Records are always written before the status that stops referencing them.

use crate::core::accumulator::{self, Tick};
use crate::core::command::{Command, Outcome, Response, TrackerEvent};
use crate::core::splitter::{self, Split};
use crate::db::records;
use crate::db::store::KvStore;
use crate::errors::{AppError, AppResult};
use crate::models::work_record::WorkRecord;
use crate::models::work_status::WorkStatus;
use crate::utils::date::local_date;
use chrono::{DateTime, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use tracing::{debug, info, warn};

pub struct Tracker<S: KvStore, Tz: TimeZone> {
    store: S,
    tz: Tz,
    status: WorkStatus,
    max_recovery_days: i64,
}

/// `start + hours`, or `None` when auto-stop is disabled.
///
/// A deadline past the representable range is rejected as invalid hours.
pub fn auto_stop_deadline(start: DateTime<Utc>, hours: f64) -> AppResult<Option<DateTime<Utc>>> {
    if hours <= 0.0 {
        return Ok(None);
    }

    TimeDelta::try_milliseconds((hours * 3_600_000.0).round() as i64)
        .and_then(|d| start.checked_add_signed(d))
        .map(Some)
        .ok_or_else(|| AppError::InvalidHours(hours.to_string()))
}

fn check_hours(hours: f64) -> AppResult<f64> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(AppError::InvalidHours(hours.to_string()))
    }
}

impl<S: KvStore, Tz: TimeZone> Tracker<S, Tz> {
    /// Load the persisted status. Nothing is recomputed until the first command.
    pub fn load(store: S, tz: Tz, max_recovery_days: i64) -> AppResult<Self> {
        let status = records::load_work_status(&store)?;
        Ok(Self {
            store,
            tz,
            status,
            max_recovery_days: max_recovery_days.max(0),
        })
    }

    pub fn status(&self) -> &WorkStatus {
        &self.status
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    /// Apply `cmd` at `now`.
    ///
    /// The status is re-read from the store first: another process (a CLI
    /// command next to `watch`) may have changed it since the last call.
    pub fn handle(&mut self, cmd: Command, now: DateTime<Utc>) -> AppResult<Response> {
        self.status = records::load_work_status(&self.store)?;
        let mut events = self.catch_up(now)?;
        let reschedules = matches!(cmd, Command::SetAutoStop { .. });

        let outcome = match cmd {
            Command::StartWork { auto_stop_hours } => self.start(now, auto_stop_hours)?,
            Command::StopWork => self.stop(now)?,
            Command::GetStatus => Outcome::Status,
            Command::SetAutoStop { hours } => self.set_auto_stop(hours)?,
            Command::Tick => {
                self.persist()?;
                Outcome::Status
            }
        };

        // A deadline set in the past fires right away.
        if reschedules {
            events.extend(self.catch_up(now)?);
        }

        Ok(Response {
            outcome,
            events,
            status: self.status.clone(),
        })
    }

    fn catch_up(&mut self, now: DateTime<Utc>) -> AppResult<Vec<TrackerEvent>> {
        let mut events = Vec::new();

        if let (true, Some(at)) = (self.status.is_working, self.status.auto_stop_at)
            && at <= now
        {
            info!("auto-stop deadline {} reached", at);
            let records = self.close_session(at)?;
            self.store.audit(
                "auto_stop",
                &at.to_rfc3339(),
                &format!("Session auto-stopped ({} record(s))", records.len()),
            )?;
            events.push(TrackerEvent::AutoStopped { at, records });
        }

        if let Some(start) = self.stale_start(now) {
            let restored = self.recover(start, now)?;
            events.push(TrackerEvent::TailDiscarded { start, restored });
        }

        loop {
            match accumulator::tick(&self.status, now, &self.tz) {
                Tick::Idle(next) => {
                    if next.day != self.status.day {
                        let day = local_date(&self.tz, now);
                        let first_run = self.status.day.is_none();
                        debug!("daily totals reset for {}", day);
                        self.status = next;
                        self.persist()?;
                        if !first_run {
                            events.push(TrackerEvent::DayReset { day });
                        }
                    } else {
                        self.status = next;
                    }
                    break;
                }
                Tick::Running(next) => {
                    if let Some(stored) = self.status.start_time
                        && next.start_time != Some(stored)
                    {
                        warn!("session start {} is in the future, clamped to now", stored);
                        self.status = next;
                        self.persist()?;
                        events.push(TrackerEvent::ClockSkew {
                            stored_start: stored,
                        });
                    } else {
                        self.status = next;
                    }
                    break;
                }
                Tick::CrossedMidnight => {
                    let records = self.apply_rollover(now)?;
                    events.push(TrackerEvent::MidnightSplit { records });
                }
            }
        }

        Ok(events)
    }

    /// Start of an open session too old to be split with confidence.
    fn stale_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = self.status.start_time.filter(|_| self.status.is_working)?;
        let today = local_date(&self.tz, now);
        let oldest = today.checked_sub_days(Days::new(self.max_recovery_days as u64))?;
        (local_date(&self.tz, start) < oldest).then_some(start)
    }

    /// Drop the unclosed session and fall back to the last known-good snapshot
    /// of today, or to an empty day.
    fn recover(&mut self, start: DateTime<Utc>, now: DateTime<Utc>) -> AppResult<bool> {
        let today = local_date(&self.tz, now);
        warn!(
            "discarding unclosed session started {} (older than {} day(s))",
            start, self.max_recovery_days
        );

        let snapshot = records::last_valid_state(&self.store, today)?.filter(|s| !s.is_working);
        let restored = snapshot.is_some();

        let hours = self.status.auto_stop_hours;
        self.status = snapshot.unwrap_or_else(|| WorkStatus::idle(today, 0, hours));
        self.persist()?;
        records::create_backup(&mut self.store, &self.status, "recover", now)?;
        self.store.audit(
            "recover",
            &start.to_rfc3339(),
            if restored {
                "Discarded stale session, restored last backup"
            } else {
                "Discarded stale session, reset today's totals"
            },
        )?;
        Ok(restored)
    }

    fn apply_rollover(&mut self, now: DateTime<Utc>) -> AppResult<Vec<WorkRecord>> {
        let rollover = splitter::rollover(&self.status, now, &self.tz)?;
        let saved = self.persist_split(&rollover.split)?;

        self.status = rollover.status;
        self.persist()?;
        records::create_backup(&mut self.store, &self.status, "midnight", now)?;

        let total: i64 = saved.iter().map(|r| r.duration).sum();
        info!("midnight split: {} record(s), {}s closed", saved.len(), total);
        self.store.audit(
            "split",
            &local_date(&self.tz, now).to_string(),
            &format!("Midnight split closed {} record(s), {}s", saved.len(), total),
        )?;

        Ok(saved)
    }

    fn persist_split(&mut self, split: &Split) -> AppResult<Vec<WorkRecord>> {
        for (from, to, e) in &split.rejected {
            warn!("discarding session piece {} - {}: {}", from, to, e);
            self.store
                .audit("drop_record", &from.to_rfc3339(), &e.to_string())?;
        }

        let mut saved = Vec::new();
        for r in &split.records {
            if records::save_work_record(&mut self.store, r, &self.tz)? {
                saved.push(r.clone());
            }
        }
        Ok(saved)
    }

    /// Close the open session at `end` and reset the status to idle.
    fn close_session(&mut self, end: DateTime<Utc>) -> AppResult<Vec<WorkRecord>> {
        let Some(start) = self.status.start_time else {
            return Ok(Vec::new());
        };
        let end = end.max(start);

        let split = splitter::split_session(start, end, &self.tz)?;
        let saved = self.persist_split(&split)?;

        let start_day = local_date(&self.tz, start);
        let end_day: NaiveDate = local_date(&self.tz, end);
        let mut total: i64 = split
            .records
            .iter()
            .filter(|r| r.date_in(&self.tz) == end_day)
            .map(|r| r.duration)
            .sum();
        if start_day == end_day {
            total += self.status.saved_total_today;
        }

        self.status = WorkStatus::idle(end_day, total, self.status.auto_stop_hours);
        self.persist()?;
        records::create_backup(&mut self.store, &self.status, "stop", end)?;

        Ok(saved)
    }

    fn start(&mut self, now: DateTime<Utc>, auto_stop_hours: Option<f64>) -> AppResult<Outcome> {
        if self.status.is_working {
            return Ok(Outcome::AlreadyWorking);
        }

        let hours = check_hours(auto_stop_hours.unwrap_or(self.status.auto_stop_hours))?;
        let auto_stop_at = auto_stop_deadline(now, hours)?;
        let saved = self.status.total_today;

        self.status = WorkStatus {
            is_working: true,
            start_time: Some(now),
            current_session: 0,
            total_today: saved,
            saved_total_today: saved,
            auto_stop_hours: hours,
            day: Some(local_date(&self.tz, now)),
            auto_stop_at,
            session_start: Some(now),
        };
        self.persist()?;
        records::create_backup(&mut self.store, &self.status, "start", now)?;

        info!("work started at {}", now);
        self.store.audit("start", &now.to_rfc3339(), "Work session started")?;
        Ok(Outcome::Started)
    }

    fn stop(&mut self, now: DateTime<Utc>) -> AppResult<Outcome> {
        if !self.status.is_working {
            return Ok(Outcome::AlreadyStopped);
        }

        let records = self.close_session(now)?;
        let closed: i64 = records.iter().map(|r| r.duration).sum();

        info!("work stopped at {}, {}s recorded", now, closed);
        self.store.audit(
            "stop",
            &now.to_rfc3339(),
            &format!("Work session stopped ({}s)", closed),
        )?;
        Ok(Outcome::Stopped { records })
    }

    fn set_auto_stop(&mut self, hours: f64) -> AppResult<Outcome> {
        let hours = check_hours(hours)?;
        let session_start = self.status.session_start.or(self.status.start_time);
        let auto_stop_at = match (self.status.is_working, session_start) {
            (true, Some(start)) => auto_stop_deadline(start, hours)?,
            _ => None,
        };
        self.status.auto_stop_hours = hours;
        self.status.auto_stop_at = auto_stop_at;
        self.persist()?;

        self.store.audit(
            "auto_stop",
            &hours.to_string(),
            &match self.status.auto_stop_at {
                Some(at) => format!("Auto-stop scheduled at {}", at.to_rfc3339()),
                None if hours > 0.0 => "Auto-stop preference saved".to_string(),
                None => "Auto-stop cancelled".to_string(),
            },
        )?;

        if hours > 0.0 {
            Ok(Outcome::AutoStopScheduled {
                at: self.status.auto_stop_at,
            })
        } else {
            Ok(Outcome::AutoStopCleared)
        }
    }

    fn persist(&mut self) -> AppResult<()> {
        records::save_work_status(&mut self.store, &self.status)
    }
}
