use clap::{Parser, Subcommand};

/// Command-line interface definition for rWorkTimer
/// Work-time tracker with automatic midnight split and daily email report
#[derive(Parser)]
#[command(
    name = "rworktimer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track working time with start/stop sessions, auto-stop and a daily email report",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Start a work session
    Start {
        /// Stop automatically after this many hours (0 disables)
        #[arg(long = "auto-stop", value_name = "HOURS")]
        auto_stop: Option<String>,
    },

    /// Stop the running work session
    Stop,

    /// Show the current session and today's total
    Status {
        #[arg(long = "json", help = "Print the raw work status as JSON")]
        json: bool,
    },

    /// Reschedule the auto-stop of the running session (0 cancels it)
    AutoStop {
        /// Hours after the session start
        hours: String,
    },

    /// Show or change the report and auto-stop preferences
    Settings {
        #[arg(long = "email", help = "Recipient of the daily report (empty disables it)")]
        email: Option<String>,

        #[arg(long = "report-time", value_name = "HH:MM", help = "Local time of the daily report")]
        report_time: Option<String>,

        #[arg(long = "auto-stop", value_name = "HOURS", help = "Default auto-stop hours (0 disables)")]
        auto_stop: Option<String>,
    },

    /// List recorded sessions with daily and period totals
    List {
        /// Period: YYYY, YYYY-MM, YYYY-MM-DD, START:END, `week` or `month`
        #[arg(long = "period")]
        period: Option<String>,

        #[arg(long = "today", help = "Only today's sessions")]
        today: bool,
    },

    /// Build (and optionally send) the daily report
    Report {
        /// Day to report on (YYYY-MM-DD, default: yesterday)
        #[arg(long = "date")]
        date: Option<String>,

        #[arg(long = "send", help = "Send the report through the configured email API")]
        send: bool,

        #[arg(long = "json", help = "Print the report parameters as JSON")]
        json: bool,
    },

    /// Inspect or replay reports that could not be delivered
    Queue {
        #[arg(long = "flush", help = "Replay every queued report now")]
        flush: bool,

        #[arg(long = "failed", help = "Show reports that exhausted their replays")]
        failed: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run in the foreground: tick every second, fire auto-stop, midnight and report alarms
    Watch,
}
