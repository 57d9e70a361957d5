//! Retry policy for the email call, injected from configuration.

use crate::errors::{AppError, AppResult};
use crate::report::mailer::Mailer;
use crate::report::params::ReportParams;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per delivery, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Upper bound of the random extra pause added to `delay_ms`.
    #[serde(default)]
    pub jitter_ms: u64,
    /// Queue replays before a report is moved to the failed list.
    #[serde(default = "default_max_replays")]
    pub max_replays: u32,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    2_000
}
fn default_max_replays() -> u32 {
    3
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            jitter_ms: 0,
            max_replays: default_max_replays(),
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.delay_ms + jitter)
    }
}

/// Send `params`, retrying transient failures. Returns the attempt that succeeded.
pub async fn send_with_retry<M: Mailer>(
    mailer: &M,
    params: &ReportParams,
    policy: &RetryPolicy,
) -> AppResult<u32> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match mailer.send(params).await {
            Ok(()) => return Ok(attempt),
            // Not going to fix itself.
            Err(e @ (AppError::MissingRecipient | AppError::Config(_))) => return Err(e),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("report delivery attempt {}/{} failed: {}", attempt, attempts, e);
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
        }
    }
}
