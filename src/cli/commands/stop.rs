use crate::cli::commands::{open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::{Command, Outcome};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::time::format_hms;
use chrono::Utc;

/// Handle the `stop` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Stop = cmd {
        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(Command::StopWork, Utc::now())?;
        print_events(&resp.events);

        match resp.outcome {
            Outcome::Stopped { records } => {
                let session: i64 = records.iter().map(|r| r.duration).sum();
                success(format!("Work stopped, {} recorded", format_hms(session)));
                info(format!("Total today: {}", format_hms(resp.status.total_today)));
            }
            Outcome::AlreadyStopped => warning("Not working, nothing to stop"),
            _ => {}
        }
    }

    Ok(())
}
