use crate::cli::commands::{open_tracker, print_events, runtime};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::command::Command;
use crate::db::records::load_settings;
use crate::errors::{AppError, AppResult};
use crate::report::mailer::EmailJsMailer;
use crate::report::params::{ReportParams, build_report};
use crate::report::{Delivery, deliver};
use crate::ui::messages::{success, warning};
use crate::utils::date::{parse_date, today};
use crate::utils::table::Table;
use chrono::{Days, Local, Utc};

fn print_params(p: &ReportParams) {
    let mut table = Table::new(vec!["Field", "Value"]);
    for (k, v) in [
        ("date", &p.date),
        ("weekday", &p.weekday),
        ("start_time", &p.start_time),
        ("end_time", &p.end_time),
        ("total_hours", &p.total_hours),
        ("total_sessions", &p.total_sessions),
        ("week_hours", &p.week_hours),
        ("last_week_hours", &p.last_week_hours),
        ("month_hours", &p.month_hours),
        ("last_month_hours", &p.last_month_hours),
        ("message", &p.message),
    ] {
        table.add_row(vec![k.to_string(), v.clone()]);
    }
    print!("{}", table.render());
}

/// Handle the `report` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report { date, send, json } = cmd {
        let day = match date {
            Some(d) => parse_date(d).ok_or_else(|| AppError::InvalidDate(d.to_string()))?,
            None => today()
                .checked_sub_days(Days::new(1))
                .ok_or_else(|| AppError::InvalidDate("yesterday".to_string()))?,
        };

        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(Command::GetStatus, Utc::now())?;
        if !*json {
            print_events(&resp.events);
        }

        let settings = load_settings(tracker.store())?;
        let params = build_report(
            tracker.store(),
            &Local,
            day,
            &settings.email,
            &cfg.mail.from_name,
        )?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&params)?);
        } else {
            println!("📨 Daily report for {}\n", day);
            print_params(&params);
        }

        if !*send {
            return Ok(());
        }
        if !settings.has_recipient() {
            warning("No report recipient configured (rworktimer settings --email <address>)");
            return Ok(());
        }

        let mailer = EmailJsMailer::new(cfg.mail.clone())?;
        let delivery = runtime()?.block_on(deliver(
            tracker.store_mut(),
            &mailer,
            &cfg.retry,
            params,
            Utc::now(),
        ))?;

        match delivery {
            Delivery::Sent { attempts } => success(format!(
                "Report sent to {} ({} attempt(s))",
                settings.email, attempts
            )),
            Delivery::Queued { id, error } => {
                warning(format!("Report not sent, queued as #{}: {}", id, error))
            }
            Delivery::Skipped => {}
        }
    }

    Ok(())
}
