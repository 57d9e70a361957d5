use crate::cli::commands::{open_tracker, print_events, runtime};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::daemon::Daemon;
use crate::errors::AppResult;
use crate::report::mailer::EmailJsMailer;
use crate::ui::messages::{info, success};
use tracing::warn;

/// Handle the `watch` command: run the tracker loop until Ctrl+C.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch = cmd {
        let tracker = open_tracker(cfg)?;
        let mailer = EmailJsMailer::new(cfg.mail.clone())?;
        let daemon = Daemon::new(tracker, mailer, cfg.clone());

        info(format!(
            "Watching {} (tick every {}s), press Ctrl+C to stop",
            cfg.database,
            cfg.tick_seconds.max(1)
        ));

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        runtime()?.block_on(daemon.run(shutdown, print_events))?;
        success("Watch stopped");
    }

    Ok(())
}
