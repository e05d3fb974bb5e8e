#![forbid(unsafe_code)]
#![cfg(feature = "serde")]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn help_lists_the_subcommands() {
    bin(Path::new("roster.json"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("schedule"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("rotations"));
}

#[test]
fn rotations_prints_the_builtin_catalog() {
    let dir = tempdir().unwrap();
    bin(&dir.path().join("roster.json"))
        .arg("rotations")
        .assert()
        .success()
        .stdout(predicate::str::contains("6 rotation(s)"))
        .stdout(predicate::str::contains(
            "WARD | short=true long=true flex_short=false flex_long=false",
        ));
}

#[test]
fn import_then_list_shows_the_roster() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(
        &csv,
        "handle,display_name,tier\nalice,Alice,1\ncarl,Carl,2\nrita,Rita,3\n",
    )
    .unwrap();

    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 trainee(s)"));
    assert!(roster.exists());

    bin(&roster)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice | Alice | PGY1 | 0 garde(s), 0 h"));
}

#[test]
fn import_refuses_a_duplicate_handle() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(&csv, "handle,display_name,tier\nalice,Alice,1\n").unwrap();

    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate handle: alice"));
}

#[test]
fn schedule_training_commits_into_the_roster() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(
        &csv,
        "handle,display_name,tier\nalice,Alice,1\ncarl,Carl,2\nrita,Rita,3\n",
    )
    .unwrap();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    bin(&roster)
        .args([
            "schedule", "--phase", "training", "--year", "2025", "--seed", "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("deficits: none"))
        .stdout(predicate::str::contains("Committed 10 assignment(s)"));

    // trois courtes, un samedi, un dimanche : 45 h entérinées
    bin(&roster)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice | Alice | PGY1 | 5 garde(s), 45 h"));
}

#[test]
fn incomplete_schedule_exits_with_a_warning_code() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    // alice en consultation toute la fenêtre : jamais de week-end possible
    std::fs::write(
        &csv,
        "handle,display_name,tier,in_training,cutoff,vacations,committed,rotations\n\
         alice,Alice,1,,,,,CLINIC;CLINIC\n\
         carl,Carl,2,,,,,\n\
         rita,Rita,3,,,,,\n",
    )
    .unwrap();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    bin(&roster)
        .args([
            "schedule", "--phase", "training", "--year", "2025", "--seed", "7",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("deficit: 24h missing 1"))
        .stdout(predicate::str::contains("deficit: 12h missing 1"))
        .stderr(predicate::str::contains("roster left untouched"));

    bin(&roster)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice | Alice | PGY1 | 0 garde(s), 0 h"));
}

#[test]
fn schedule_without_seniors_is_an_error() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(&csv, "handle,display_name,tier\nalice,Alice,1\ncarl,Carl,2\n").unwrap();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    bin(&roster)
        .args(["schedule", "--phase", "training", "--year", "2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PGY3"));
}

#[test]
fn check_reports_a_committed_vacation_overlap() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(
        &csv,
        "handle,display_name,tier,in_training,cutoff,vacations,committed\n\
         alice,Alice,1,,,2025-07-05,2025-07-05\n",
    )
    .unwrap();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    let report = dir.path().join("report.csv");
    bin(&roster)
        .args(["check", "--report", report.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Found 1 finding(s)"));
    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.contains("alice,2025-07-05,committed-on-vacation"));
}

#[test]
fn check_passes_on_a_clean_roster() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("roster.json");
    let csv = dir.path().join("trainees.csv");
    std::fs::write(&csv, "handle,display_name,tier\nalice,Alice,1\n").unwrap();
    bin(&roster)
        .args(["import", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();

    bin(&roster)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: roster is coherent"));
}

fn bin(roster: &Path) -> Command {
    let mut cmd = Command::cargo_bin("internat-cli").unwrap();
    cmd.args(["--roster", roster.to_str().unwrap()]);
    cmd
}
