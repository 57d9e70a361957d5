use crate::cli::commands::{local_hm, open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::Command;
use crate::errors::AppResult;
use crate::utils::colors::{RESET, color_for_working};
use crate::utils::formatting::bold;
use crate::utils::time::{format_hms, hours_1dp};
use chrono::Utc;

/// Handle the `status` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Status { json } = cmd {
        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(Command::GetStatus, Utc::now())?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&resp.status)?);
            return Ok(());
        }

        print_events(&resp.events);
        let s = &resp.status;
        let color = color_for_working(s.is_working);

        match (s.is_working, s.start_time) {
            (true, Some(start)) => {
                let auto = s
                    .auto_stop_at
                    .map(|at| format!(" (auto-stop at {})", local_hm(at)))
                    .unwrap_or_default();
                println!("{color}●{RESET} {} since {}{}", bold("Working"), local_hm(start), auto);
                println!("  Current session : {}", format_hms(s.current_session));
            }
            _ => println!("{color}●{RESET} {}", bold("Not working")),
        }

        println!(
            "  Total today     : {} ({}h)",
            format_hms(s.total_today),
            hours_1dp(s.total_today)
        );
        if s.auto_stop_hours > 0.0 {
            println!("  Auto-stop after : {}h", s.auto_stop_hours);
        }
    }

    Ok(())
}
