use chrono::NaiveDate;
use rworktimer::core::tracker::Tracker;
use rworktimer::db::pool::DbPool;
use rworktimer::db::records::{
    STATUS_KEY, create_backup, last_valid_state, load_backups, load_records, load_settings,
    load_work_status, save_settings, save_work_record, save_work_status,
};
use rworktimer::db::store::{KvStore, MemoryStore};
use rworktimer::errors::{AppError, AppResult};
use rworktimer::models::settings::Settings;
use rworktimer::models::work_record::WorkRecord;
use rworktimer::models::work_status::WorkStatus;

mod common;
use common::ts;

/// Corrupts the next `failures` status writes.
struct FlakyStore {
    inner: MemoryStore,
    failures: usize,
}

impl KvStore for FlakyStore {
    fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: &str) -> AppResult<()> {
        if key == STATUS_KEY && self.failures > 0 {
            self.failures -= 1;
            return self.inner.set_raw(key, "{\"isWorking\":");
        }
        self.inner.set_raw(key, value)
    }

    fn remove(&mut self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> AppResult<Vec<String>> {
        self.inner.keys_with_prefix(prefix)
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        self.inner.audit(operation, target, message)
    }
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn working_status() -> WorkStatus {
    WorkStatus {
        is_working: true,
        start_time: Some(ts("2024-01-01T09:00:00Z")),
        current_session: 60,
        total_today: 60,
        day: Some(day("2024-01-01")),
        ..WorkStatus::default()
    }
}

#[test]
fn test_status_write_is_retried_once() {
    let mut store = FlakyStore {
        inner: MemoryStore::new(),
        failures: 1,
    };
    let status = working_status();

    save_work_status(&mut store, &status).expect("second write succeeds");
    assert_eq!(load_work_status(&store).unwrap(), status);
}

#[test]
fn test_status_write_failure_is_surfaced() {
    let mut store = FlakyStore {
        inner: MemoryStore::new(),
        failures: 2,
    };

    let err = save_work_status(&mut store, &working_status()).unwrap_err();
    assert!(matches!(err, AppError::StorageVerification(_)));
}

#[test]
fn test_corrupted_status_propagates() {
    let mut store = MemoryStore::new();
    store.set_raw(STATUS_KEY, "not json").unwrap();

    let err = Tracker::load(store, chrono::Utc, 1).err().expect("load fails");
    assert!(matches!(err, AppError::Corrupted { .. }));
}

#[test]
fn test_invalid_record_is_dropped() {
    let mut store = MemoryStore::new();
    let bad = WorkRecord {
        start_time: ts("2024-01-01T09:00:00Z"),
        end_time: ts("2024-01-01T10:00:00Z"),
        duration: 1234,
    };

    assert!(!save_work_record(&mut store, &bad, &chrono::Utc).unwrap());
    assert!(load_records(&store, day("2024-01-01")).unwrap().is_empty());
    assert_eq!(store.audit_entries()[0].operation, "drop_record");

    let reversed = WorkRecord {
        start_time: ts("2024-01-01T10:00:00Z"),
        end_time: ts("2024-01-01T09:00:00Z"),
        duration: -3600,
    };
    assert!(!save_work_record(&mut store, &reversed, &chrono::Utc).unwrap());
}

#[test]
fn test_records_are_sorted_and_deduplicated() {
    let mut store = MemoryStore::new();
    let late = WorkRecord::new(ts("2024-01-01T14:00:00Z"), ts("2024-01-01T15:00:00Z")).unwrap();
    let early = WorkRecord::new(ts("2024-01-01T08:00:00Z"), ts("2024-01-01T09:00:00Z")).unwrap();

    assert!(save_work_record(&mut store, &late, &chrono::Utc).unwrap());
    assert!(save_work_record(&mut store, &early, &chrono::Utc).unwrap());
    assert!(!save_work_record(&mut store, &late, &chrono::Utc).unwrap());

    let stored = load_records(&store, day("2024-01-01")).unwrap();
    assert_eq!(stored, vec![early, late]);
}

#[test]
fn test_backups_are_capped_and_searchable() {
    let mut store = MemoryStore::new();

    for i in 0..12 {
        let status = WorkStatus::idle(day("2024-01-01"), i * 60, 0.0);
        create_backup(&mut store, &status, "stop", ts("2024-01-01T12:00:00Z")).unwrap();
    }

    let backups = load_backups(&store).unwrap();
    assert_eq!(backups.len(), 10);
    assert_eq!(backups[0].state.total_today, 120);

    let last = last_valid_state(&store, day("2024-01-01")).unwrap().unwrap();
    assert_eq!(last.total_today, 660);
    assert!(last_valid_state(&store, day("2024-01-02")).unwrap().is_none());
}

#[test]
fn test_settings_defaults_and_validation() {
    let mut store = MemoryStore::new();

    let settings = load_settings(&store).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.report_time, "09:00");
    assert!(!settings.has_recipient());

    let bad = Settings {
        report_time: "9h".to_string(),
        ..Settings::default()
    };
    assert!(matches!(
        save_settings(&mut store, &bad),
        Err(AppError::InvalidTime(_))
    ));
}

#[test]
fn test_sqlite_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.sqlite").to_string_lossy().to_string();

    {
        let mut pool = DbPool::new(&path).unwrap();
        let r = WorkRecord::new(ts("2024-01-01T08:00:00Z"), ts("2024-01-01T09:00:00Z")).unwrap();
        save_work_record(&mut pool, &r, &chrono::Utc).unwrap();
        save_work_record(
            &mut pool,
            &WorkRecord::new(ts("2024-01-02T08:00:00Z"), ts("2024-01-02T08:30:00Z")).unwrap(),
            &chrono::Utc,
        )
        .unwrap();
        save_work_status(&mut pool, &working_status()).unwrap();
    }

    let pool = DbPool::new(&path).unwrap();
    assert_eq!(load_work_status(&pool).unwrap(), working_status());
    assert_eq!(
        pool.keys_with_prefix("workRecords_").unwrap(),
        vec!["workRecords_2024-01-01", "workRecords_2024-01-02"]
    );
    assert_eq!(load_records(&pool, day("2024-01-02")).unwrap()[0].duration, 1800);
}

#[test]
fn test_sqlite_audit_goes_to_log_table() {
    let mut pool = DbPool::in_memory().unwrap();
    pool.audit("start", "2024-01-01T09:00:00Z", "Work session started")
        .unwrap();
    pool.set_raw("reportQueue", "[]").unwrap();
    pool.remove("reportQueue").unwrap();
    assert!(pool.get_raw("reportQueue").unwrap().is_none());

    let rows = rworktimer::db::log::load_log(&pool.conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].operation, "start");
    assert_eq!(rows[0].message, "Work session started");
}
