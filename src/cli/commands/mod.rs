pub mod auto_stop;
pub mod config;
pub mod init;
pub mod list;
pub mod log;
pub mod queue;
pub mod report;
pub mod settings;
pub mod start;
pub mod status;
pub mod stop;
pub mod watch;

use crate::config::Config;
use crate::core::command::TrackerEvent;
use crate::core::tracker::Tracker;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::time::format_hms;
use chrono::{DateTime, Local, Utc};
use tokio::runtime::{Builder, Runtime};

/// Tracker over the configured database, in the local time zone.
pub fn open_tracker(cfg: &Config) -> AppResult<Tracker<DbPool, Local>> {
    let pool = DbPool::new(&cfg.database)?;
    Tracker::load(pool, Local, cfg.max_recovery_days)
}

/// Single-threaded runtime for the async report pipeline.
pub fn runtime() -> AppResult<Runtime> {
    Ok(Builder::new_current_thread().enable_all().build()?)
}

pub fn local_hm(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

pub fn local_datetime(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// What happened while catching up with the clock, one line per event.
pub fn print_events(events: &[TrackerEvent]) {
    for event in events {
        match event {
            TrackerEvent::MidnightSplit { records } => messages::info(format!(
                "Session split at midnight: {} record(s) closed",
                records.len()
            )),
            TrackerEvent::AutoStopped { at, records } => {
                let total: i64 = records.iter().map(|r| r.duration).sum();
                messages::warning(format!(
                    "Auto-stopped at {} ({} recorded)",
                    local_datetime(*at),
                    format_hms(total)
                ))
            }
            TrackerEvent::DayReset { day } => {
                messages::info(format!("New day {}: daily total reset", day))
            }
            TrackerEvent::ClockSkew { stored_start } => messages::warning(format!(
                "Stored session start {} was in the future, restarted from now",
                local_datetime(*stored_start)
            )),
            TrackerEvent::TailDiscarded { start, restored } => messages::warning(format!(
                "Unclosed session from {} discarded ({})",
                local_datetime(*start),
                if *restored {
                    "last backup restored"
                } else {
                    "today's total reset"
                }
            )),
        }
    }
}
