use crate::errors::{AppError, AppResult};
use crate::utils::time::parse_time;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// User preferences, persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_report_time")]
    pub report_time: String,
    #[serde(default)]
    pub auto_stop_hours: f64,
}

fn default_report_time() -> String {
    "09:00".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email: String::new(),
            report_time: default_report_time(),
            auto_stop_hours: 0.0,
        }
    }
}

impl Settings {
    pub fn report_time(&self) -> AppResult<NaiveTime> {
        parse_time(&self.report_time).ok_or_else(|| AppError::InvalidTime(self.report_time.clone()))
    }

    pub fn has_recipient(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
