use chrono::{NaiveDate, TimeDelta, Utc};
use rworktimer::config::{Config, MailConfig};
use rworktimer::core::aggregator::Totals;
use rworktimer::db::records::{save_settings, save_work_record};
use rworktimer::db::store::MemoryStore;
use rworktimer::errors::{AppError, AppResult};
use rworktimer::models::settings::Settings;
use rworktimer::models::work_record::WorkRecord;
use rworktimer::report::mailer::Mailer;
use rworktimer::report::params::{NO_RECORD, ReportParams, assemble, build_report, time_based_message};
use rworktimer::report::queue::{enqueue, load_failed, load_queue, replay};
use rworktimer::report::retry::{RetryPolicy, send_with_retry};
use rworktimer::report::{Delivery, deliver, send_daily_report};
use std::cell::{Cell, RefCell};

mod common;
use common::ts;

/// Fails the first `fail_first` calls, then succeeds.
#[derive(Default)]
struct FakeMailer {
    fail_first: usize,
    calls: Cell<usize>,
    sent: RefCell<Vec<String>>,
}

impl FakeMailer {
    fn failing(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Self::default()
        }
    }
}

impl Mailer for FakeMailer {
    async fn send(&self, params: &ReportParams) -> AppResult<()> {
        let n = self.calls.get();
        self.calls.set(n + 1);
        if n < self.fail_first {
            return Err(AppError::EmailRejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.sent.borrow_mut().push(params.date.clone());
        Ok(())
    }
}

fn no_delay() -> RetryPolicy {
    RetryPolicy {
        delay_ms: 0,
        ..RetryPolicy::default()
    }
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn sample_params() -> ReportParams {
    assemble(
        &Utc,
        day("2024-01-01"),
        &[],
        &Totals::default(),
        "me@example.com",
        "rWorkTimer",
    )
}

#[test]
fn test_time_based_message_thresholds() {
    assert_eq!(time_based_message(0, false), "No work was recorded on this day.");
    assert_eq!(time_based_message(3 * 3600, true), "A short day today. See you tomorrow!");
    assert_eq!(time_based_message(4 * 3600, true), "Thanks for your work today!");
    assert_eq!(time_based_message(8 * 3600, true), "A productive day. Get some rest!");
    assert_eq!(
        time_based_message(10 * 3600, true),
        "That was a long day. Take a proper break!"
    );
}

#[test]
fn test_report_from_stored_records() {
    let mut store = MemoryStore::new();
    for (s, e) in [
        ("2024-01-02T08:15:00Z", "2024-01-02T12:00:00Z"),
        ("2024-01-02T13:00:00Z", "2024-01-02T17:45:00Z"),
        ("2024-01-01T09:00:00Z", "2024-01-01T10:00:00Z"),
        ("2023-12-29T09:00:00Z", "2023-12-29T11:00:00Z"),
    ] {
        let r = WorkRecord::new(ts(s), ts(e)).unwrap();
        save_work_record(&mut store, &r, &Utc).unwrap();
    }

    let p = build_report(&store, &Utc, day("2024-01-02"), "jane@example.com", "rWorkTimer").unwrap();
    assert_eq!(p.date, "2024-01-02");
    assert_eq!(p.weekday, "Tue");
    assert_eq!(p.start_time, "08:15");
    assert_eq!(p.end_time, "17:45");
    assert_eq!(p.total_hours, "8.5");
    assert_eq!(p.total_sessions, "2");
    assert_eq!(p.week_hours, "9.5");
    assert_eq!(p.last_week_hours, "2.0");
    assert_eq!(p.month_hours, "9.5");
    assert_eq!(p.last_month_hours, "2.0");
    assert_eq!(p.to_name, "jane");
    assert_eq!(p.message, "A productive day. Get some rest!");
}

#[test]
fn test_report_for_empty_day() {
    let p = sample_params();
    assert_eq!(p.start_time, NO_RECORD);
    assert_eq!(p.end_time, NO_RECORD);
    assert_eq!(p.total_hours, "0.0");
    assert_eq!(p.total_sessions, "0");
}

#[tokio::test]
async fn test_retry_succeeds_after_failures() {
    let mailer = FakeMailer::failing(2);
    let attempts = send_with_retry(&mailer, &sample_params(), &no_delay()).await.unwrap();
    assert_eq!(attempts, 3);
    assert_eq!(mailer.calls.get(), 3);
}

#[tokio::test]
async fn test_retry_exhausts_then_queues() {
    let mut store = MemoryStore::new();
    let mailer = FakeMailer::failing(10);

    let delivery = deliver(&mut store, &mailer, &no_delay(), sample_params(), ts("2024-01-02T09:00:00Z"))
        .await
        .unwrap();

    assert!(matches!(delivery, Delivery::Queued { .. }));
    assert_eq!(mailer.calls.get(), 3);

    let queue = load_queue(&store).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].params.date, "2024-01-01");
    assert!(queue[0].last_error.contains("503"));
}

#[tokio::test]
async fn test_missing_recipient_is_not_retried() {
    struct NoRecipient(Cell<usize>);
    impl Mailer for NoRecipient {
        async fn send(&self, _params: &ReportParams) -> AppResult<()> {
            self.0.set(self.0.get() + 1);
            Err(AppError::MissingRecipient)
        }
    }

    let mailer = NoRecipient(Cell::new(0));
    let err = send_with_retry(&mailer, &sample_params(), &no_delay()).await.unwrap_err();
    assert!(matches!(err, AppError::MissingRecipient));
    assert_eq!(mailer.0.get(), 1);
}

#[tokio::test]
async fn test_replay_moves_to_failed_after_max_replays() {
    let mut store = MemoryStore::new();
    let err = AppError::Other("offline".to_string());
    enqueue(&mut store, sample_params(), &err, ts("2024-01-02T09:00:00Z")).unwrap();

    let mailer = FakeMailer::failing(100);
    for round in 1..=2 {
        let summary = replay(&mut store, &mailer, 3).await.unwrap();
        assert_eq!(summary.requeued, 1, "round {round}");
        assert_eq!(load_queue(&store).unwrap()[0].replays, round);
    }

    let summary = replay(&mut store, &mailer, 3).await.unwrap();
    assert_eq!(summary.failed, 1);
    assert!(load_queue(&store).unwrap().is_empty());
    assert_eq!(load_failed(&store).unwrap().len(), 1);
}

#[tokio::test]
async fn test_replay_delivers_queued_reports() {
    let mut store = MemoryStore::new();
    let err = AppError::Other("offline".to_string());
    enqueue(&mut store, sample_params(), &err, ts("2024-01-02T09:00:00Z")).unwrap();
    enqueue(&mut store, sample_params(), &err, ts("2024-01-02T09:00:00Z") + TimeDelta::seconds(1)).unwrap();

    let ids: Vec<i64> = load_queue(&store).unwrap().iter().map(|q| q.id).collect();
    assert_ne!(ids[0], ids[1]);

    let mailer = FakeMailer::default();
    let summary = replay(&mut store, &mailer, 3).await.unwrap();
    assert_eq!(summary.sent, 2);
    assert!(load_queue(&store).unwrap().is_empty());
}

#[tokio::test]
async fn test_daily_report_flow() {
    let cfg = Config {
        mail: MailConfig::default(),
        retry: no_delay(),
        ..Config::default()
    };
    let mut store = MemoryStore::new();
    let mailer = FakeMailer::default();
    let now = ts("2024-01-02T09:00:00Z");

    let skipped = send_daily_report(&mut store, &Utc, &mailer, &cfg, day("2024-01-01"), now)
        .await
        .unwrap();
    assert_eq!(skipped, Delivery::Skipped);
    assert_eq!(mailer.calls.get(), 0);

    save_settings(
        &mut store,
        &Settings {
            email: "me@example.com".to_string(),
            ..Settings::default()
        },
    )
    .unwrap();
    enqueue(&mut store, sample_params(), &AppError::Other("x".into()), now).unwrap();

    let sent = send_daily_report(&mut store, &Utc, &mailer, &cfg, day("2024-01-01"), now)
        .await
        .unwrap();
    assert_eq!(sent, Delivery::Sent { attempts: 1 });
    // queued report first, then the new one
    assert_eq!(mailer.sent.borrow().len(), 2);
    assert!(load_queue(&store).unwrap().is_empty());
}
