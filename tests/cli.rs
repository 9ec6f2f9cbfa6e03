#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn cli(roster: &Path) -> Command {
    let mut cmd = Command::cargo_bin("garde-cli").unwrap();
    cmd.arg("--roster").arg(roster);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn shift_lifecycle_through_the_cli() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let outbox = dir.path().join("outbox");

    let alice = stdout_of(cli(&roster).args([
        "add-supervisor",
        "--name",
        "Alice Martin",
        "--email",
        "alice@example.org",
        "--phone",
        "0600000001",
    ]));
    let building = stdout_of(cli(&roster).args(["add-building", "--number", "1", "--floors", "1;2"]));

    let buildings: Value =
        serde_json::from_str(&stdout_of(cli(&roster).arg("buildings"))).unwrap();
    let floor = buildings[0]["floors"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(buildings[0]["id"], building.as_str());

    let created: Value = serde_json::from_str(&stdout_of(
        cli(&roster).arg("--outbox").arg(&outbox).args([
            "create-shift",
            "--date",
            "2024-03-04",
            "--start",
            "08:00",
            "--end",
            "12:00",
            "--building",
            &building,
            "--floor",
            &floor,
            "--supervisor",
            &alice,
        ]),
    ))
    .unwrap();
    assert_eq!(created["shift"]["start_time"], "08:00");
    assert_eq!(std::fs::read_dir(&outbox).unwrap().count(), 1);

    cli(&roster)
        .args([
            "create-shift",
            "--date",
            "2024-03-04",
            "--start",
            "11:00",
            "--end",
            "13:00",
            "--building",
            &building,
            "--floor",
            &floor,
            "--supervisor",
            &alice,
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("overlapping shift"));

    let uncovered: Value = serde_json::from_str(&stdout_of(
        cli(&roster).args(["uncovered", "--date", "2024-03-04"]),
    ))
    .unwrap();
    assert_eq!(uncovered.as_array().unwrap().len(), 1);
    assert_eq!(uncovered[0]["floor_number"], 2);

    let week: Value =
        serde_json::from_str(&stdout_of(cli(&roster).args(["week", "--start", "2024-03-04"])))
            .unwrap();
    assert_eq!(week["end"], "2024-03-10");
    assert_eq!(week["shifts"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_week_start_is_a_refusal() {
    let dir = tempdir().unwrap();
    cli(&dir.path().join("roster.json"))
        .arg("week")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing required field: start"));
}

#[test]
fn vacation_conflict_lists_the_shifts() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let alice = stdout_of(cli(&roster).args([
        "add-supervisor",
        "--name",
        "Alice",
        "--email",
        "a@example.org",
        "--phone",
        "1",
    ]));
    let building = stdout_of(cli(&roster).args(["add-building", "--number", "7", "--floors", "0"]));
    let buildings: Value =
        serde_json::from_str(&stdout_of(cli(&roster).arg("buildings"))).unwrap();
    let floor = buildings[0]["floors"][0]["id"].as_str().unwrap().to_string();

    cli(&roster)
        .args([
            "create-shift",
            "--date",
            "2024-03-03",
            "--start",
            "08:00",
            "--end",
            "12:00",
            "--building",
            &building,
            "--floor",
            &floor,
            "--supervisor",
            &alice,
        ])
        .assert()
        .success();

    cli(&roster)
        .args([
            "add-vacation",
            "--supervisor",
            &alice,
            "--from",
            "2024-03-01",
            "--to",
            "2024-03-05",
            "--reason",
            "congé",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("shift(s) inside this period"))
        .stderr(predicate::str::contains("2024-03-03"));
}
