use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::TestEnv;

fn status_json(env: &TestEnv) -> serde_json::Value {
    let out = env
        .rwt()
        .args(["status", "--json"])
        .output()
        .expect("run status --json");
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).expect("status is JSON")
}

#[test]
fn test_init_creates_database() {
    let env = TestEnv::new();

    env.rwt()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&env.db).exists());
}

#[test]
fn test_status_when_idle() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Not working").and(contains("Total today")));
}

#[test]
fn test_start_and_stop_are_idempotent() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .arg("start")
        .assert()
        .success()
        .stdout(contains("Work started"));

    env.rwt()
        .arg("start")
        .assert()
        .success()
        .stdout(contains("Already working"));

    env.rwt()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Working").and(contains("Current session")));

    env.rwt()
        .arg("stop")
        .assert()
        .success()
        .stdout(contains("Work stopped"));

    env.rwt()
        .arg("stop")
        .assert()
        .success()
        .stdout(contains("nothing to stop"));
}

#[test]
fn test_status_json_reflects_session() {
    let env = TestEnv::new();
    env.init();

    env.rwt().arg("start").assert().success();
    let status = status_json(&env);
    assert_eq!(status["isWorking"], serde_json::Value::Bool(true));
    assert!(status["startTime"].is_string());

    env.rwt().arg("stop").assert().success();
    let status = status_json(&env);
    assert_eq!(status["isWorking"], serde_json::Value::Bool(false));
    assert!(status["startTime"].is_null());
}

#[test]
fn test_auto_stop_schedule_and_cancel() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .args(["start", "--auto-stop", "2"])
        .assert()
        .success()
        .stdout(contains("Auto-stop scheduled at"));
    assert!(status_json(&env)["autoStopAt"].is_string());

    env.rwt()
        .args(["auto-stop", "0"])
        .assert()
        .success()
        .stdout(contains("Auto-stop cancelled"));
    assert!(status_json(&env)["autoStopAt"].is_null());
}

#[test]
fn test_start_rejects_invalid_hours() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .args(["start", "--auto-stop", "abc"])
        .assert()
        .failure()
        .stderr(contains("Invalid number of hours"));

    env.rwt()
        .args(["start", "--auto-stop", "1e12"])
        .assert()
        .failure()
        .stderr(contains("Invalid number of hours"));
    assert_eq!(status_json(&env)["isWorking"], false);
}

#[test]
fn test_settings_update_and_validation() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .arg("settings")
        .assert()
        .success()
        .stdout(contains("09:00").and(contains("report disabled")));

    env.rwt()
        .args(["settings", "--email", "me@example.com", "--report-time", "18:30"])
        .assert()
        .success()
        .stdout(
            contains("Settings saved")
                .and(contains("me@example.com"))
                .and(contains("18:30")),
        );

    env.rwt()
        .args(["settings", "--email", "not-an-email"])
        .assert()
        .failure()
        .stderr(contains("Invalid email address"));

    env.rwt()
        .args(["settings", "--report-time", "25:00"])
        .assert()
        .failure()
        .stderr(contains("Invalid time format"));

    // rejected values were not stored
    env.rwt()
        .arg("settings")
        .assert()
        .success()
        .stdout(contains("me@example.com").and(contains("18:30")));
}

#[test]
fn test_list_today_after_session() {
    let env = TestEnv::new();
    env.init();

    env.rwt().arg("start").assert().success();
    env.rwt().arg("stop").assert().success();

    env.rwt()
        .args(["list", "--today"])
        .assert()
        .success()
        .stdout(contains("Total:").and(contains("Week")).and(contains("Month")));
}

#[test]
fn test_list_empty_period() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .args(["list", "--period", "2020-02"])
        .assert()
        .success()
        .stdout(contains("No records between 2020-02-01 and 2020-02-29"));

    env.rwt()
        .args(["list", "--period", "garbage"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));
}

#[test]
fn test_report_json_for_empty_day() {
    let env = TestEnv::new();
    env.init();

    let out = env
        .rwt()
        .args(["report", "--date", "2024-01-01", "--json"])
        .output()
        .expect("run report");
    assert!(out.status.success());

    let params: serde_json::Value = serde_json::from_slice(&out.stdout).expect("report is JSON");
    assert_eq!(params["date"], "2024-01-01");
    assert_eq!(params["weekday"], "Mon");
    assert_eq!(params["start_time"], "--:--");
    assert_eq!(params["total_hours"], "0.0");
    assert_eq!(params["total_sessions"], "0");
    assert_eq!(params["message"], "No work was recorded on this day.");
}

#[test]
fn test_report_send_without_recipient_is_skipped() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .args(["report", "--date", "2024-01-01", "--send"])
        .assert()
        .success()
        .stdout(contains("No report recipient configured"));
}

#[test]
fn test_queue_empty() {
    let env = TestEnv::new();
    env.init();

    env.rwt()
        .arg("queue")
        .assert()
        .success()
        .stdout(contains("Queued reports: none"));

    env.rwt()
        .args(["queue", "--failed"])
        .assert()
        .success()
        .stdout(contains("Failed reports: none"));
}

#[test]
fn test_log_records_operations() {
    let env = TestEnv::new();
    env.init();

    env.rwt().arg("start").assert().success();
    env.rwt().arg("stop").assert().success();

    env.rwt()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(
            contains("init")
                .and(contains("Work session started"))
                .and(contains("Work session stopped")),
        );
}

#[test]
fn test_config_print() {
    let env = TestEnv::new();

    env.rwt()
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(contains("tick_seconds").and(contains("max_attempts")));
}
