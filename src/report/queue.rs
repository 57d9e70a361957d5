//! Reports that could not be delivered, kept for later replay.

use crate::db::store::KvStore;
use crate::errors::{AppError, AppResult};
use crate::report::mailer::Mailer;
use crate::report::params::ReportParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const QUEUE_KEY: &str = "reportQueue";
pub const FAILED_KEY: &str = "failedReports";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedReport {
    pub id: i64,
    pub queued_at: DateTime<Utc>,
    pub replays: u32,
    pub last_error: String,
    pub params: ReportParams,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub sent: usize,
    pub requeued: usize,
    pub failed: usize,
}

pub fn load_queue<S: KvStore>(store: &S) -> AppResult<Vec<QueuedReport>> {
    Ok(store.get(QUEUE_KEY)?.unwrap_or_default())
}

pub fn load_failed<S: KvStore>(store: &S) -> AppResult<Vec<QueuedReport>> {
    Ok(store.get(FAILED_KEY)?.unwrap_or_default())
}

pub fn enqueue<S: KvStore>(
    store: &mut S,
    params: ReportParams,
    error: &AppError,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let mut queue = load_queue(store)?;
    let id = queue
        .iter()
        .map(|q| q.id + 1)
        .max()
        .unwrap_or(0)
        .max(now.timestamp_millis());

    queue.push(QueuedReport {
        id,
        queued_at: now,
        replays: 0,
        last_error: error.to_string(),
        params,
    });
    store.set(QUEUE_KEY, &queue)?;

    store.audit("queue", &id.to_string(), &format!("Report queued: {}", error))?;
    Ok(id)
}

/// Try every queued report once. Items that exhausted `max_replays` move to
/// the failed list. The queue is rewritten after each item.
pub async fn replay<S: KvStore, M: Mailer>(
    store: &mut S,
    mailer: &M,
    max_replays: u32,
) -> AppResult<ReplaySummary> {
    let pending = load_queue(store)?;
    let mut remaining: Vec<QueuedReport> = pending.clone();
    let mut summary = ReplaySummary::default();

    for mut item in pending {
        remaining.retain(|q| q.id != item.id);

        match mailer.send(&item.params).await {
            Ok(()) => {
                info!("queued report {} delivered", item.id);
                store.audit("queue", &item.id.to_string(), "Queued report delivered")?;
                summary.sent += 1;
            }
            Err(e) => {
                item.replays += 1;
                item.last_error = e.to_string();

                if item.replays >= max_replays {
                    warn!("queued report {} given up after {} replays: {}", item.id, item.replays, e);
                    let mut failed = load_failed(store)?;
                    failed.push(item.clone());
                    store.set(FAILED_KEY, &failed)?;
                    store.audit("queue", &item.id.to_string(), "Queued report moved to failed")?;
                    summary.failed += 1;
                } else {
                    remaining.push(item);
                    summary.requeued += 1;
                }
            }
        }

        if remaining.is_empty() {
            store.remove(QUEUE_KEY)?;
        } else {
            store.set(QUEUE_KEY, &remaining)?;
        }
    }

    Ok(summary)
}
