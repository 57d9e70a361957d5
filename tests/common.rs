#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// Isolated home directory plus a database path inside it.
pub struct TestEnv {
    pub dir: TempDir,
    pub db: String,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = dir
            .path()
            .join("rworktimer.sqlite")
            .to_string_lossy()
            .to_string();
        Self { dir, db }
    }

    /// The binary, pointed at this env's database and home.
    pub fn rwt(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rworktimer");
        cmd.env("HOME", self.dir.path())
            .env("APPDATA", self.dir.path())
            .env_remove("RUST_LOG")
            .args(["--db", &self.db]);
        cmd
    }

    /// Create schema without touching any config file.
    pub fn init(&self) {
        self.rwt().args(["--test", "init"]).assert().success();
    }
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}
