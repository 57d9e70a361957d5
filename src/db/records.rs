//! Typed persistence of records, status, settings and status backups.

use crate::db::store::KvStore;
use crate::errors::{AppError, AppResult};
use crate::models::settings::Settings;
use crate::models::work_record::WorkRecord;
use crate::models::work_status::WorkStatus;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const STATUS_KEY: &str = "workStatus";
pub const SETTINGS_KEY: &str = "settings";
pub const BACKUPS_KEY: &str = "backups";
pub const RECORDS_PREFIX: &str = "workRecords_";

const MAX_BACKUPS: usize = 10;

pub fn records_key(date: NaiveDate) -> String {
    format!("{}{}", RECORDS_PREFIX, date.format("%Y-%m-%d"))
}

fn date_from_key(key: &str) -> Option<NaiveDate> {
    key.strip_prefix(RECORDS_PREFIX)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Append a record to its day. Invalid records are dropped and logged, never
/// persisted; an identical record already stored is not appended twice.
///
/// Returns whether the record was written.
pub fn save_work_record<S: KvStore, Tz: TimeZone>(
    store: &mut S,
    record: &WorkRecord,
    tz: &Tz,
) -> AppResult<bool> {
    if let Err(e) = record.validate() {
        warn!("dropping invalid work record: {}", e);
        store.audit("drop_record", &record.start_time.to_rfc3339(), &e.to_string())?;
        return Ok(false);
    }

    let date = record.date_in(tz);
    let key = records_key(date);
    let mut records: Vec<WorkRecord> = store.get(&key)?.unwrap_or_default();

    if records.contains(record) {
        debug!("record {} already stored, skipping", record.start_time);
        return Ok(false);
    }

    records.push(record.clone());
    records.sort_by_key(|r| r.start_time);
    store.set(&key, &records)?;

    debug!(
        "saved work record {} ({}s) under {}",
        record.start_time, record.duration, key
    );
    Ok(true)
}

pub fn load_records<S: KvStore>(store: &S, date: NaiveDate) -> AppResult<Vec<WorkRecord>> {
    Ok(store.get(&records_key(date))?.unwrap_or_default())
}

/// Records of every stored day in `[from, to]`, keyed by day.
pub fn load_records_between<S: KvStore>(
    store: &S,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<BTreeMap<NaiveDate, Vec<WorkRecord>>> {
    let mut out = BTreeMap::new();
    for key in store.keys_with_prefix(RECORDS_PREFIX)? {
        let Some(date) = date_from_key(&key) else {
            warn!("ignoring malformed record key '{}'", key);
            continue;
        };
        if date < from || date > to {
            continue;
        }
        let records: Vec<WorkRecord> = store.get(&key)?.unwrap_or_default();
        out.insert(date, records);
    }
    Ok(out)
}

/// Missing status means a fresh install; a corrupted one propagates.
pub fn load_work_status<S: KvStore>(store: &S) -> AppResult<WorkStatus> {
    Ok(store.get(STATUS_KEY)?.unwrap_or_default())
}

/// Persist the status and read it back. A mismatch is retried once from the
/// in-memory copy before being surfaced to the caller.
pub fn save_work_status<S: KvStore>(store: &mut S, status: &WorkStatus) -> AppResult<()> {
    let backup = serde_json::to_string(status)?;

    store.set_raw(STATUS_KEY, &backup)?;
    if store.get_raw(STATUS_KEY)?.as_deref() == Some(backup.as_str()) {
        return Ok(());
    }

    warn!("status write could not be verified, retrying from in-memory backup");
    store.set_raw(STATUS_KEY, &backup)?;
    if store.get_raw(STATUS_KEY)?.as_deref() == Some(backup.as_str()) {
        return Ok(());
    }

    Err(AppError::StorageVerification(STATUS_KEY.to_string()))
}

pub fn load_settings<S: KvStore>(store: &S) -> AppResult<Settings> {
    Ok(store.get(SETTINGS_KEY)?.unwrap_or_default())
}

pub fn save_settings<S: KvStore>(store: &mut S, settings: &Settings) -> AppResult<()> {
    settings.report_time()?;
    store.set(SETTINGS_KEY, settings)
}

/// Snapshot of a known-good status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBackup {
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    pub state: WorkStatus,
}

pub fn create_backup<S: KvStore>(
    store: &mut S,
    status: &WorkStatus,
    reason: &str,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let mut backups: Vec<StatusBackup> = store.get(BACKUPS_KEY)?.unwrap_or_default();
    backups.push(StatusBackup {
        timestamp: now,
        reason: reason.to_string(),
        state: status.clone(),
    });

    if backups.len() > MAX_BACKUPS {
        let excess = backups.len() - MAX_BACKUPS;
        backups.drain(..excess);
    }

    store.set(BACKUPS_KEY, &backups)
}

pub fn load_backups<S: KvStore>(store: &S) -> AppResult<Vec<StatusBackup>> {
    Ok(store.get(BACKUPS_KEY)?.unwrap_or_default())
}

/// Most recent snapshot that is self-consistent and refers to `day`.
pub fn last_valid_state<S: KvStore>(store: &S, day: NaiveDate) -> AppResult<Option<WorkStatus>> {
    Ok(load_backups(store)?
        .into_iter()
        .rev()
        .map(|b| b.state)
        .find(|s| s.day == Some(day) && s.is_consistent()))
}
