use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::log::load_log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

/// Handle the `log` command
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print } = cmd {
        let pool = DbPool::new(&cfg.database)?;

        if *print {
            LogLogic::print_log(&pool)?;
        } else {
            let count = load_log(&pool.conn)?.len();
            info(format!("{} log entries (use --print to show them)", count));
        }
    }

    Ok(())
}
