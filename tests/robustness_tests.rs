use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_roster_aborts_import() {
    let output_path = std::path::PathBuf::from("robustness_roster.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record([
        "parent_id",
        "student_id",
        "name",
        "student_email",
        "grade",
        "transaction_id",
        "amount",
        "payment_status",
    ])
    .unwrap();
    wtr.write_record(["p1", "s1", "Asha", "", "5", "tx1", "", ""])
        .unwrap();
    // Text in amount field
    wtr.write_record(["p1", "s2", "Dev", "", "3", "tx2", "two hundred", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("schooladmin"));
    cmd.arg("--roster").arg(&output_path).args(["payments", "list"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CSV error"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_roster_without_student_id_is_rejected() {
    let output_path = std::path::PathBuf::from("robustness_missing_id.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["parent_id", "student_id", "name"]).unwrap();
    wtr.write_record(["p1", "", "Nameless"]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    Command::new(cargo_bin!("schooladmin"))
        .arg("--roster")
        .arg(&output_path)
        .args(["payments", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parent_id and a student_id"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_large_roster_scan() {
    let dir = tempfile::tempdir().unwrap();
    let roster = dir.path().join("large_roster.csv");
    common::generate_roster(&roster, 2_000, 3).expect("Failed to generate roster");

    let output = Command::new(cargo_bin!("schooladmin"))
        .arg("--roster")
        .arg(&roster)
        .args(["payments", "list"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // header + one row per student
    assert_eq!(stdout.lines().count(), 6_001);
}
