use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::time::Duration;

/// CLI processes and `watch` may write concurrently.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Prepare a freshly opened connection: locking behaviour, then schema.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;

    run_pending_migrations(conn)?;
    Ok(())
}
