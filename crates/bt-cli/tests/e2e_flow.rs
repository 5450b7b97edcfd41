//! End-to-end tests driving the `bt` binary against a temporary database.
//!
//! Flow: users add → act → log / status.

use std::path::Path;
use std::process::{Command, Output};

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use tempfile::TempDir;

fn bt_binary() -> String {
    env!("CARGO_BIN_EXE_bt").to_string()
}

/// Minutes east of UTC that put `now` at roughly local noon.
///
/// Keeps backdated actions inside today's local window whenever the test runs.
fn noon_offset(now: DateTime<Utc>) -> i64 {
    let minutes = i64::from(now.hour() * 60 + now.minute());
    12 * 60 - minutes
}

struct Env {
    temp: TempDir,
    offset_minutes: i64,
    cap_secs: i64,
}

impl Env {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            temp: TempDir::new().unwrap(),
            offset_minutes: noon_offset(now),
            cap_secs: 3_600,
        }
    }

    fn home(&self) -> &Path {
        self.temp.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(bt_binary())
            .env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home().join(".config"))
            .env("XDG_DATA_HOME", self.home().join(".local/share"))
            .env("BT_DATABASE_PATH", self.home().join("bt.db"))
            .env("BT_UTC_OFFSET_MINUTES", self.offset_minutes.to_string())
            .env("BT_BREAK_CAP_SECS", self.cap_secs.to_string())
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("failed to run bt")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "bt {args:?} should succeed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.run_ok(args)).unwrap()
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole-second "now" so backdated stamps are exact.
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now - Duration::nanoseconds(i64::from(now.nanosecond()))
}

#[test]
fn test_work_day_flow() {
    let now = now();
    let env = Env::new(now);

    let added = env.run_ok(&["users", "add", "Dana", "--id", "dana"]);
    assert_eq!(added, "Added employee Dana (dana)\n");

    env.run_ok(&["act", "dana", "start-work", "--at", &stamp(now - Duration::minutes(90))]);
    env.run_ok(&["act", "dana", "start-break", "--at", &stamp(now - Duration::minutes(60))]);
    let ended = env.run_ok(&["act", "dana", "end-break", "--at", &stamp(now - Duration::minutes(50))]);
    assert!(ended.contains("Dana is now working"), "{ended}");
    assert!(ended.contains("Break today: 10m of 1h 0m"), "{ended}");

    let log = env.run_json(&["log", "dana", "--json"]);
    assert_eq!(log["user"]["status"], "working");
    assert_eq!(log["events"].as_array().unwrap().len(), 3);
    assert_eq!(log["totals"]["daily_break_seconds"], 600);
    assert_eq!(log["break_remaining_seconds"], 3_000);
    assert_eq!(log["break_cap_exceeded"], false);

    let status = env.run_json(&["status", "--json"]);
    assert_eq!(status["stats"]["total_users"], 1);
    assert_eq!(status["stats"]["working_users"], 1);
    assert_eq!(status["users"][0]["break_seconds"], 600);
}

#[test]
fn test_invalid_action_fails_and_writes_nothing() {
    let env = Env::new(now());
    env.run_ok(&["users", "add", "Dana", "--id", "dana"]);

    let output = env.run(&["act", "dana", "end-break"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot end_break while offline"), "{stderr}");

    let log = env.run_json(&["log", "dana", "--json"]);
    assert!(log["events"].as_array().unwrap().is_empty());
    assert_eq!(log["user"]["status"], "offline");
}

#[test]
fn test_break_cap_blocks_new_break() {
    let now = now();
    let mut env = Env::new(now);
    env.cap_secs = 300;
    env.run_ok(&["users", "add", "Dana", "--id", "dana"]);

    env.run_ok(&["act", "dana", "start-work", "--at", &stamp(now - Duration::minutes(30))]);
    env.run_ok(&["act", "dana", "start-break", "--at", &stamp(now - Duration::minutes(20))]);
    let ended = env.run_ok(&["act", "dana", "end-break", "--at", &stamp(now - Duration::minutes(10))]);
    assert!(ended.contains("Daily break cap reached."), "{ended}");

    let output = env.run(&["act", "dana", "start-break"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("daily break cap reached: 600s used of 300s"),
        "{stderr}"
    );
}

#[test]
fn test_unknown_user_fails() {
    let env = Env::new(now());
    let output = env.run(&["log", "ghost"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown user: ghost"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let env = Env::new(now());
    let stdout = env.run_ok(&[]);
    assert!(stdout.contains("Usage:"), "{stdout}");
}

#[test]
fn test_future_and_out_of_order_times_are_rejected() {
    let now = now();
    let env = Env::new(now);
    env.run_ok(&["users", "add", "Dana", "--id", "dana"]);

    let output = env.run(&["act", "dana", "start-work", "--at", &stamp(now + Duration::hours(1))]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Time is in the future"), "{stderr}");

    env.run_ok(&["act", "dana", "start-work", "--at", &stamp(now - Duration::minutes(10))]);
    let output = env.run(&["act", "dana", "end-work", "--at", &stamp(now - Duration::minutes(20))]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("earlier than the last logged event"), "{stderr}");

    let log = env.run_json(&["log", "dana", "--json"]);
    assert_eq!(log["events"].as_array().unwrap().len(), 1);
    assert_eq!(log["user"]["status"], "working");
}
