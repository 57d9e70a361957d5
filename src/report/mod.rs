//! Daily report: build, deliver with retries, queue on failure.

pub mod mailer;
pub mod params;
pub mod queue;
pub mod retry;

use crate::config::Config;
use crate::db::records::load_settings;
use crate::db::store::KvStore;
use crate::errors::AppResult;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mailer::Mailer;
use params::{ReportParams, build_report};
use retry::{RetryPolicy, send_with_retry};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { attempts: u32 },
    Queued { id: i64, error: String },
    /// No recipient configured.
    Skipped,
}

/// Deliver `params`; on final failure the report is queued for replay.
pub async fn deliver<S: KvStore, M: Mailer>(
    store: &mut S,
    mailer: &M,
    policy: &RetryPolicy,
    params: ReportParams,
    now: DateTime<Utc>,
) -> AppResult<Delivery> {
    match send_with_retry(mailer, &params, policy).await {
        Ok(attempts) => {
            info!("report for {} sent to {}", params.date, params.to_email);
            store.audit(
                "report",
                &params.date,
                &format!("Report sent to {} (attempt {})", params.to_email, attempts),
            )?;
            Ok(Delivery::Sent { attempts })
        }
        Err(e) => {
            warn!("report for {} not delivered: {}", params.date, e);
            let error = e.to_string();
            let id = queue::enqueue(store, params, &e, now)?;
            Ok(Delivery::Queued { id, error })
        }
    }
}

/// Replay the queue, then build and send the report for `day`.
pub async fn send_daily_report<S: KvStore, Tz: TimeZone, M: Mailer>(
    store: &mut S,
    tz: &Tz,
    mailer: &M,
    cfg: &Config,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<Delivery>
where
    Tz::Offset: std::fmt::Display,
{
    let settings = load_settings(store)?;
    if !settings.has_recipient() {
        info!("no report recipient configured, skipping report for {}", day);
        return Ok(Delivery::Skipped);
    }

    let replayed = queue::replay(store, mailer, cfg.retry.max_replays).await?;
    if replayed.sent + replayed.requeued + replayed.failed > 0 {
        info!(
            "report queue: {} sent, {} requeued, {} failed",
            replayed.sent, replayed.requeued, replayed.failed
        );
    }

    let params = build_report(store, tz, day, &settings.email, &cfg.mail.from_name)?;
    deliver(store, mailer, &cfg.retry, params, now).await
}
