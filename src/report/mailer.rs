//! Outbound email collaborator: one POST per report.

use crate::config::MailConfig;
use crate::errors::{AppError, AppResult};
use crate::report::params::ReportParams;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[allow(async_fn_in_trait)]
pub trait Mailer {
    async fn send(&self, params: &ReportParams) -> AppResult<()>;
}

#[derive(Serialize)]
struct Payload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ReportParams,
}

/// EmailJS-compatible REST sender.
pub struct EmailJsMailer {
    client: Client,
    cfg: MailConfig,
}

impl EmailJsMailer {
    pub fn new(cfg: MailConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, cfg })
    }
}

impl Mailer for EmailJsMailer {
    async fn send(&self, params: &ReportParams) -> AppResult<()> {
        if params.to_email.trim().is_empty() {
            return Err(AppError::MissingRecipient);
        }
        if self.cfg.service_id.is_empty() || self.cfg.template_id.is_empty() {
            return Err(AppError::Config(
                "mail.service_id and mail.template_id must be set".to_string(),
            ));
        }

        let payload = Payload {
            service_id: &self.cfg.service_id,
            template_id: &self.cfg.template_id,
            user_id: &self.cfg.user_id,
            template_params: params,
        };

        debug!("posting report for {} to {}", params.date, self.cfg.api_url);
        let res = self.client.post(&self.cfg.api_url).json(&payload).send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::EmailRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
