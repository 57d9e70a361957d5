use crate::cli::commands::{local_hm, open_tracker, print_events};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::aggregator::{day_total, period_start, totals, totals_window_start};
use crate::core::command::Command;
use crate::db::records::load_records_between;
use crate::db::store::KvStore;
use crate::errors::{AppError, AppResult};
use crate::models::period::Period;
use crate::utils::colors::{CYAN, RESET, colorize_total};
use crate::utils::date;
use crate::utils::table::Table;
use crate::utils::time::{format_hms, hours_1dp};
use chrono::{NaiveDate, Utc};
use clap::ValueEnum;

/// Handle the `list` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { period, today } = cmd {
        let mut tracker = open_tracker(cfg)?;
        let resp = tracker.handle(Command::GetStatus, Utc::now())?;
        print_events(&resp.events);

        let now_day = date::today();
        let dates = if *today {
            vec![now_day]
        } else {
            resolve_period(period.as_deref(), now_day)?
        };
        let (Some(first), Some(last)) = (dates.first().copied(), dates.last().copied()) else {
            return Ok(());
        };

        let by_day = load_records_between(tracker.store(), first, last)?;
        if by_day.values().all(|r| r.is_empty()) {
            println!("No records between {} and {}", first, last);
        }

        let mut period_sum = 0;
        for (day, records) in by_day.iter().filter(|(_, r)| !r.is_empty()) {
            println!("\n📅 {}{}{} ({})", CYAN, day, RESET, day.format("%a"));

            let mut table = Table::new(vec!["#", "Start", "End", "Duration"]);
            for (i, r) in records.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    local_hm(r.start_time),
                    local_hm(r.end_time),
                    format_hms(r.duration),
                ]);
            }
            print!("{}", table.render());

            let total = day_total(records);
            period_sum += total;
            println!("Total: {} ({}h)", format_hms(total), hours_1dp(total));
        }

        let s = &resp.status;
        if s.is_working
            && let Some(start) = s.start_time
            && (first..=last).contains(&now_day)
        {
            println!(
                "\n⏱️  Running since {} ({})",
                local_hm(start),
                format_hms(s.current_session)
            );
        }

        if first != last {
            let sum = format_hms(period_sum);
            println!(
                "\nPeriod {} → {}: {} ({}h)",
                first,
                last,
                colorize_total(&sum, period_sum),
                hours_1dp(period_sum)
            );
        }

        print_totals(tracker.store(), last.min(now_day))?;
    }

    Ok(())
}

fn print_totals<S: KvStore>(store: &S, base: NaiveDate) -> AppResult<()> {
    let window = load_records_between(store, totals_window_start(base), base)?;
    let t = totals(&window, base);

    let mut table = Table::new(vec!["", "This", "Previous"]);
    table.add_row(vec![
        "Week".to_string(),
        format!("{}h", hours_1dp(t.week)),
        format!("{}h", hours_1dp(t.last_week)),
    ]);
    table.add_row(vec![
        "Month".to_string(),
        format!("{}h", hours_1dp(t.month)),
        format!("{}h", hours_1dp(t.last_month)),
    ]);
    println!("\nTotals up to {}:", base);
    print!("{}", table.render());
    Ok(())
}

/// `week`/`month` run from the start of the current period to today; anything
/// else is a date, month, year or `START:END` range.
fn resolve_period(period: Option<&str>, today: NaiveDate) -> AppResult<Vec<NaiveDate>> {
    let Some(p) = period else {
        return date::current_month_dates();
    };

    if let Ok(named) = Period::from_str(p, true) {
        let start = period_start(today, named);
        println!("📆 Current {}: {} → {}", named.label(), start, today);
        return Ok(date::days_between(start, today));
    }

    if let Some((start, end)) = p.split_once(':') {
        return date::generate_range(start, end);
    }

    date::generate_from_period(p).map_err(|_| AppError::InvalidDate(p.to_string()))
}
