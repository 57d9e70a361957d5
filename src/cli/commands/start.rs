use crate::cli::commands::{local_hm, open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::{Command, Outcome};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::time::parse_hours;
use chrono::Utc;

/// Handle the `start` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Start { auto_stop } = cmd {
        let hours = auto_stop.as_deref().map(parse_hours).transpose()?;

        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(
            Command::StartWork {
                auto_stop_hours: hours,
            },
            Utc::now(),
        )?;
        print_events(&resp.events);

        let since = resp.status.start_time.map(local_hm).unwrap_or_default();
        match resp.outcome {
            Outcome::Started => {
                success(format!("Work started at {}", since));
                if let Some(at) = resp.status.auto_stop_at {
                    info(format!("Auto-stop scheduled at {}", local_hm(at)));
                }
            }
            Outcome::AlreadyWorking => warning(format!("Already working since {}", since)),
            _ => {}
        }
    }

    Ok(())
}
