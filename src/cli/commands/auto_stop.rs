use crate::cli::commands::{local_hm, open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::{Command, Outcome};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::time::parse_hours;
use chrono::Utc;

/// Handle the `auto-stop` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::AutoStop { hours } = cmd {
        let hours = parse_hours(hours)?;

        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(Command::SetAutoStop { hours }, Utc::now())?;

        match resp.outcome {
            Outcome::AutoStopScheduled { at: Some(at) } => {
                success(format!("Auto-stop scheduled at {}", local_hm(at)))
            }
            Outcome::AutoStopScheduled { at: None } => info(format!(
                "Auto-stop of {}h will apply to the next session",
                hours
            )),
            Outcome::AutoStopCleared => success("Auto-stop cancelled"),
            _ => {}
        }
        print_events(&resp.events);
    }

    Ok(())
}
