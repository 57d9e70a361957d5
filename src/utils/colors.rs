/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const GREEN: &str = "\x1b[32m";
pub const CYAN: &str = "\x1b[36m";

/// Green while a session is running, grey otherwise.
pub fn color_for_working(is_working: bool) -> &'static str {
    if is_working { GREEN } else { GREY }
}

/// Grey for an empty total, plain otherwise.
pub fn colorize_total(value: &str, seconds: i64) -> String {
    if seconds == 0 {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
