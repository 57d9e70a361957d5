use crate::cli::commands::{local_datetime, runtime};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::report::mailer::EmailJsMailer;
use crate::report::queue::{QueuedReport, load_failed, load_queue, replay};
use crate::ui::messages::{info, success, warning};
use crate::utils::table::Table;

fn print_items(items: &[QueuedReport]) {
    let mut table = Table::new(vec!["Id", "Queued", "Date", "To", "Replays", "Last error"]);
    for q in items {
        table.add_row(vec![
            q.id.to_string(),
            local_datetime(q.queued_at),
            q.params.date.clone(),
            q.params.to_email.clone(),
            q.replays.to_string(),
            q.last_error.clone(),
        ]);
    }
    print!("{}", table.render());
}

/// Handle the `queue` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Queue { flush, failed } = cmd {
        let mut pool = DbPool::new(&cfg.database)?;

        if *flush {
            let mailer = EmailJsMailer::new(cfg.mail.clone())?;
            let summary = runtime()?.block_on(replay(&mut pool, &mailer, cfg.retry.max_replays))?;

            if summary.sent + summary.requeued + summary.failed == 0 {
                info("Report queue is empty");
            } else {
                success(format!(
                    "Replayed queue: {} sent, {} still queued, {} failed",
                    summary.sent, summary.requeued, summary.failed
                ));
            }
        }

        let (label, items) = if *failed {
            ("Failed reports", load_failed(&pool)?)
        } else {
            ("Queued reports", load_queue(&pool)?)
        };

        if items.is_empty() {
            info(format!("{}: none", label));
        } else {
            warning(format!("{}: {}", label, items.len()));
            print_items(&items);
        }
    }

    Ok(())
}
