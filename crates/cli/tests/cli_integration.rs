//! CLI integration tests for every subcommand.
//!
//! Uses `assert_cmd` to spawn the `cadence` binary against snapshot
//! fixtures written into a temporary directory, and checks exit codes,
//! stdout content, and stderr content.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
    "entities": [
        {
            "id": "north",
            "current_status": false,
            "status_log": [
                { "action": "activated", "occurred_at": "2024-06-01T08:00:00Z", "actor": "ops" },
                { "action": "deactivated", "occurred_at": "2024-06-03T18:00:00Z", "actor": "ops" }
            ]
        },
        { "id": "fresh", "current_status": true }
    ],
    "sales": [
        { "occurred_at": "2024-06-01T12:05:00Z", "subject_id": "till-1", "amount": "10.00", "attributes": { "region": "north" } },
        { "occurred_at": "2024-06-02T12:05:00Z", "subject_id": "till-1", "amount": "10.00", "attributes": { "region": "north" } },
        { "occurred_at": "2024-06-03T12:05:00Z", "subject_id": "till-2", "amount": "10.00", "attributes": { "region": "north" } },
        { "occurred_at": "2024-06-03T12:20:00Z", "subject_id": "till-3", "amount": "2.50", "attributes": { "region": "south" } },
        { "occurred_at": null, "subject_id": "till-4" }
    ],
    "shifts": [
        { "clock_in": "2024-06-01T09:07:00Z", "entity_id": "north", "subject_id": "ann" },
        { "clock_in": "2024-06-01T08:59:00Z", "entity_id": "north", "subject_id": "bob" },
        { "clock_in": "2024-06-01T09:30:00Z", "entity_id": "south", "subject_id": "cid" },
        { "clock_in": null, "entity_id": "north", "subject_id": "dee" }
    ],
    "policies": [
        { "entity_id": "north", "nominal_start_of_day": "09:00", "grace_minutes": 5 }
    ],
    "assignments": [
        { "date": "2024-06-08", "subject_id": "ana", "entity_id": "store-9" },
        { "date": "2024-06-09", "subject_id": "ana", "entity_id": "store-9" },
        { "date": "2024-06-09", "subject_id": "ben", "entity_id": "store-9" }
    ],
    "profiles": [
        { "subject_id": "ana", "name": "Ana", "role": "cashier", "entity_ids": ["store-9"] },
        { "subject_id": "sam", "name": "Sam", "role": "supervisor", "entity_ids": ["store-9"] }
    ]
}"#;

const SETTINGS: &str = r#"
reference_offset = "Z"

[roster]
role_priority = ["supervisor", "cashier"]
static_roles = ["supervisor"]
"#;

/// A temporary directory holding `snapshot.json` and `cadence.toml`.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::write(dir.path().join("snapshot.json"), SNAPSHOT).expect("write snapshot");
        fs::write(dir.path().join("cadence.toml"), SETTINGS).expect("write settings");
        Fixture { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn snapshot(&self) -> PathBuf {
        self.path().join("snapshot.json")
    }

    fn settings(&self) -> PathBuf {
        self.path().join("cadence.toml")
    }
}

/// Helper: create a Command for the `cadence` binary with logging silenced.
fn cadence() -> Command {
    let mut cmd = cargo_bin_cmd!("cadence");
    cmd.env_remove("CADENCE_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    cadence()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Temporal derivations over exported record snapshots",
        ));
}

#[test]
fn version_exits_0() {
    cadence()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cadence"));
}

#[test]
fn status_help_lists_range_flags() {
    cadence()
        .args(["status", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--from"))
        .stdout(predicate::str::contains("--entity"));
}

// ──────────────────────────────────────────────
// 2. Status subcommand
// ──────────────────────────────────────────────

#[test]
fn status_range_prints_one_line_per_day() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "north", "--from", "2024-06-01", "--to", "2024-06-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("north 2024-06-01 active"))
        .stdout(predicate::str::contains("north 2024-06-03 active"))
        .stdout(predicate::str::contains("north 2024-06-04 inactive"))
        .stdout(predicate::str::contains(
            "last change: deactivated by ops at 2024-06-03T18:00:00Z",
        ));
}

#[test]
fn status_single_day_json() {
    let fx = Fixture::new();
    let output = cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "north", "--day", "2024-06-04", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["entity_id"], "north");
    assert_eq!(json["days"].as_array().unwrap().len(), 1);
    assert_eq!(json["days"][0]["day"], "2024-06-04");
    assert_eq!(json["days"][0]["status"], "inactive");
    assert_eq!(json["last_change"]["action"], "deactivated");
    assert_eq!(json["last_change"]["actor"], "ops");
}

#[test]
fn status_of_fresh_entity_follows_live_flag() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "fresh", "--day", "2024-06-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fresh 2024-06-04 active"))
        .stdout(predicate::str::contains("last change: none recorded"));
}

#[test]
fn status_quiet_prints_only_rows() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "north", "--day", "2024-06-02", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::diff("north 2024-06-02 active\n"));
}

#[test]
fn status_unknown_entity_exits_1() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "west", "--day", "2024-06-02"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("entity not found: west"));
}

#[test]
fn status_rejects_malformed_day() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "north", "--day", "June 2nd"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn status_from_requires_to() {
    let fx = Fixture::new();
    cadence()
        .arg("status")
        .arg(fx.snapshot())
        .args(["--entity", "north", "--from", "2024-06-01"])
        .assert()
        .failure()
        .code(2);
}

// ──────────────────────────────────────────────
// 3. Compliance subcommand
// ──────────────────────────────────────────────

#[test]
fn compliance_classifies_every_shift() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .assert()
        .success()
        .stdout(predicate::str::contains("north ann late by 2m"))
        .stdout(predicate::str::contains("north bob on time"))
        .stdout(predicate::str::contains("south cid unknown"))
        .stdout(predicate::str::contains("north dee unknown"))
        .stdout(predicate::str::contains(
            "north: 3 shifts, 1 on time, 1 late (2m), 1 unknown",
        ));
}

#[test]
fn compliance_uses_reference_offset() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .arg("--offset=+01:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("north ann late by 1h 02m"))
        .stdout(predicate::str::contains("north bob late by 54m"));
}

#[test]
fn compliance_json_has_shifts_and_summary() {
    let fx = Fixture::new();
    let output = cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let first = &json["shifts"][0];
    assert_eq!(first["subject_id"], "ann");
    assert_eq!(first["status"], "late");
    assert_eq!(first["late_by"]["minutes"], 2);
    assert!(json["shifts"][1].get("late_by").is_none());
    assert_eq!(json["summary"]["north"]["late_minutes"], 2);
    assert_eq!(json["summary"]["south"]["unknown"], 1);
}

// ──────────────────────────────────────────────
// 4. Density subcommand
// ──────────────────────────────────────────────

#[test]
fn density_prints_segments_and_peak() {
    let fx = Fixture::new();
    cadence()
        .arg("density")
        .arg(fx.snapshot())
        .assert()
        .success()
        .stdout(predicate::str::contains("00:00-12:00 red 0"))
        .stdout(predicate::str::contains("12:00-12:15 green 3"))
        .stdout(predicate::str::contains("12:15-12:30 yellow 1"))
        .stdout(predicate::str::contains("12:30-24:00 red 0"))
        .stdout(predicate::str::contains("peak: 10:30-12:30 (4 records)"))
        .stdout(predicate::str::contains("total: 4 records, amount 32.50"));
}

#[test]
fn density_json_report() {
    let fx = Fixture::new();
    let output = cadence()
        .arg("density")
        .arg(fx.snapshot())
        .args(["--output", "json", "--window", "4"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["counts"].as_array().unwrap().len(), 96);
    assert_eq!(json["counts"][48], 3);
    assert_eq!(json["peak"]["start_slot"], 46);
    assert_eq!(json["peak"]["window_slots"], 4);
    assert_eq!(json["peak"]["sum"], 4);
    assert_eq!(json["total_count"], 4);
    assert_eq!(json["total_amount"], "32.50");
}

#[test]
fn density_grouped_by_attribute() {
    let fx = Fixture::new();
    cadence()
        .arg("density")
        .arg(fx.snapshot())
        .args(["--group-by", "region", "--window", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("north 12:00-12:15 (3 records)"))
        .stdout(predicate::str::contains("south 12:15-12:30 (1 records)"));
}

#[test]
fn density_of_clock_ins_groups_by_entity() {
    let fx = Fixture::new();
    cadence()
        .arg("density")
        .arg(fx.snapshot())
        .args(["--records", "shifts", "--group-by", "entity_id", "--window", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("north 08:45-09:00 (1 records)"))
        .stdout(predicate::str::contains("south 09:30-09:45 (1 records)"));
}

#[test]
fn records_past_calendar_end_do_not_abort_run() {
    let fx = Fixture::new();
    let edge = fx.path().join("edge.json");
    fs::write(
        &edge,
        r#"{
            "sales": [
                { "occurred_at": "9999-12-31T23:30:00Z", "subject_id": "till-1" },
                { "occurred_at": "2024-06-01T09:00:00Z", "subject_id": "till-1" }
            ],
            "shifts": [
                { "clock_in": "9999-12-31T23:30:00Z", "entity_id": "north", "subject_id": "ann" }
            ],
            "policies": [
                { "entity_id": "north", "nominal_start_of_day": "09:00", "grace_minutes": 5 }
            ]
        }"#,
    )
    .unwrap();

    cadence()
        .arg("density")
        .arg(&edge)
        .arg("--offset=+03:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("12:00-12:15 green 1"))
        .stdout(predicate::str::contains("total: 1 records"));

    cadence()
        .arg("compliance")
        .arg(&edge)
        .arg("--offset=+03:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("north ann unknown"));
}

// ──────────────────────────────────────────────
// 5. Roster subcommand
// ──────────────────────────────────────────────

#[test]
fn roster_from_schedule_only() {
    let fx = Fixture::new();
    cadence()
        .arg("roster")
        .arg(fx.snapshot())
        .args(["--today", "2024-06-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("store-9"))
        .stdout(predicate::str::contains("  ana Ana cashier (2 shifts)"))
        .stdout(predicate::str::contains("  ben - - (1 shifts)"))
        .stdout(predicate::str::contains("sam").not());
}

#[test]
fn roster_merges_static_roles_from_settings() {
    let fx = Fixture::new();
    let output = cadence()
        .arg("roster")
        .arg(fx.snapshot())
        .arg("--config")
        .arg(fx.settings())
        .args(["--today", "2024-06-10", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let ids: Vec<&str> = json["store-9"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["subject_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["sam", "ana", "ben"]);
    assert_eq!(json["store-9"][0]["source"], "profile");
}

#[test]
fn roster_recent_dates_flag_narrows_window() {
    let fx = Fixture::new();
    cadence()
        .arg("roster")
        .arg(fx.snapshot())
        .args(["--today", "2024-06-10", "--recent-dates", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  ana Ana cashier (1 shifts)"))
        .stdout(predicate::str::contains("  ben - - (1 shifts)"));
}

// ──────────────────────────────────────────────
// 6. Errors, settings, and logging
// ──────────────────────────────────────────────

#[test]
fn missing_snapshot_exits_1() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.path().join("absent.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read snapshot"));
}

#[test]
fn missing_snapshot_json_error() {
    let fx = Fixture::new();
    let output = cadence()
        .arg("compliance")
        .arg(fx.path().join("absent.json"))
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: serde_json::Value =
        serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert!(err["error"]
        .as_str()
        .unwrap()
        .contains("failed to read snapshot"));
}

#[test]
fn quiet_suppresses_error_text() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.path().join("absent.json"))
        .arg("--quiet")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::is_empty());
}

#[test]
fn malformed_snapshot_exits_1() {
    let fx = Fixture::new();
    let bad = fx.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();
    cadence()
        .arg("density")
        .arg(&bad)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid snapshot document"));
}

#[test]
fn settings_offset_applies() {
    let fx = Fixture::new();
    let settings = fx.path().join("offset.toml");
    fs::write(&settings, "reference_offset = \"+01:00\"\n").unwrap();
    cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .arg("--config")
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("north ann late by 1h 02m"));
}

#[test]
fn invalid_offset_exits_1() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .arg("--offset=Mars")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Mars"));
}

#[test]
fn unreadable_settings_exits_1() {
    let fx = Fixture::new();
    cadence()
        .arg("compliance")
        .arg(fx.snapshot())
        .arg("--config")
        .arg(fx.path().join("absent.toml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn cadence_log_enables_debug_output() {
    let fx = Fixture::new();
    cadence()
        .env("CADENCE_LOG", "debug")
        .arg("density")
        .arg(fx.snapshot())
        .assert()
        .success()
        .stderr(predicate::str::contains("snapshot loaded"));
}
