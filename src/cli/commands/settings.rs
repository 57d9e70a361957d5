use crate::cli::commands::{open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::Command;
use crate::db::records::{load_settings, save_settings};
use crate::errors::{AppError, AppResult};
use crate::models::settings::Settings;
use crate::ui::messages::success;
use crate::utils::table::Table;
use crate::utils::time::{parse_hours, parse_time};
use chrono::Utc;
use regex::Regex;

fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(String::new());
    }

    let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_err(|e| AppError::Other(e.to_string()))?;
    if re.is_match(email) {
        Ok(email.to_string())
    } else {
        Err(AppError::InvalidEmail(email.to_string()))
    }
}

fn print_settings(settings: &Settings) {
    let mut table = Table::new(vec!["Setting", "Value"]);
    table.add_row(vec![
        "email".to_string(),
        if settings.has_recipient() {
            settings.email.clone()
        } else {
            "(not set, report disabled)".to_string()
        },
    ]);
    table.add_row(vec!["reportTime".to_string(), settings.report_time.clone()]);
    table.add_row(vec![
        "autoStopHours".to_string(),
        if settings.auto_stop_hours > 0.0 {
            settings.auto_stop_hours.to_string()
        } else {
            "off".to_string()
        },
    ]);
    print!("{}", table.render());
}

/// Handle the `settings` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Settings {
        email,
        report_time,
        auto_stop,
    } = cmd
    {
        let mut tracker = open_tracker(cfg)?;
        let mut settings = load_settings(tracker.store())?;
        let before = settings.clone();

        if let Some(e) = email {
            settings.email = validate_email(e)?;
        }
        if let Some(t) = report_time {
            let t = parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))?;
            settings.report_time = t.format("%H:%M").to_string();
        }
        if let Some(h) = auto_stop {
            settings.auto_stop_hours = parse_hours(h)?;
        }

        if settings != before {
            save_settings(tracker.store_mut(), &settings)?;

            if settings.auto_stop_hours != before.auto_stop_hours {
                let resp = tracker.handle(
                    Command::SetAutoStop {
                        hours: settings.auto_stop_hours,
                    },
                    Utc::now(),
                )?;
                print_events(&resp.events);
            }
            success("Settings saved");
        }

        print_settings(&settings);
    }

    Ok(())
}
