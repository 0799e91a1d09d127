use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const HEADER: &str = "Date,Amount,Category,Account,Description\n";

fn write_csv(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("transactions.csv");
    let mut content = String::from(HEADER);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Runs the binary with an empty settings file so the user's config never leaks in.
fn bookkeeper(dir: &Path) -> Command {
    let config = dir.join("settings.json");
    std::fs::write(&config, "{}").unwrap();
    let mut cmd = Command::cargo_bin("bookkeeper").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

#[test]
fn duplicate_row_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,-50.00,Groceries,Checking,Market",
            "01-05-2021,-50.00,Groceries,Checking,Market",
        ],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Suspicious Transactions (1)"))
        .stdout(predicate::str::contains("DUPLICATE"));
}

#[test]
fn empty_date_range_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &["02-01-2021,-25.00,Dining,Checking,Cafe"]);
    bookkeeper(dir.path())
        .arg(&csv)
        .args(["-s", "01-01-2021", "-e", "01-31-2021"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions match the given filters."));
}

#[test]
fn malformed_category_count_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &["01-05-2021,-50.00,Groceries,Checking,Market"]);
    bookkeeper(dir.path())
        .arg(&csv)
        .args(["-c", "abc"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("abc"));
}

#[test]
fn malformed_start_date_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &["01-05-2021,-50.00,Groceries,Checking,Market"]);
    bookkeeper(dir.path())
        .arg(&csv)
        .args(["-s", "2021-01-01"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn inverted_date_range_fails_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    bookkeeper(dir.path())
        .arg(dir.path().join("missing.csv"))
        .args(["-s", "02-01-2021", "-e", "01-01-2021"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid argument"));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    bookkeeper(dir.path())
        .arg(dir.path().join("missing.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn bad_row_aborts_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,-50.00,Groceries,Checking,Market",
            "01-06-2021,twelve,Dining,Checking,Cafe",
        ],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Line 3: invalid amount"));
}

#[test]
fn skip_invalid_reports_skipped_rows() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,-50.00,Groceries,Checking,Market",
            "01-06-2021,twelve,Dining,Checking,Cafe",
        ],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .arg("--skip-invalid")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 loaded, 1 matched, 1 skipped"))
        .stderr(predicate::str::contains("skipping row"));
}

#[test]
fn filters_and_top_categories() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,-50.00,Groceries,Checking,Whole Foods",
            "01-06-2021,-9.99,Music,Discover,Spotify USA",
            "01-07-2021,-120.00,Travel,Checking,Airline",
            "01-08-2021,-15.00,Dining,Checking,Spotify Cafe",
        ],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .args(["-a", "Checking", "-c", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 1 of 3 Categories"))
        .stdout(predicate::str::contains("Travel"))
        .stdout(predicate::str::contains("Spotify USA").not());

    bookkeeper(dir.path())
        .arg(&csv)
        .args(["-d", "SPOTIFY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 loaded, 2 matched"));
}

#[test]
fn threshold_flag_overrides_settings() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &["01-05-2021,-120.00,Travel,Checking,Airline"]);
    bookkeeper(dir.path())
        .arg(&csv)
        .args(["--threshold", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LARGE_AMOUNT"));
}

#[test]
fn output_file_receives_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &["01-05-2021,-50.00,Groceries,Checking,Market"]);
    let out = dir.path().join("summary.txt");
    bookkeeper(dir.path())
        .arg(&csv)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let report = std::fs::read_to_string(&out).unwrap();
    assert!(report.contains("Spending by Category"));
}

#[cfg(feature = "pdf")]
#[test]
fn chart_is_written_as_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,-50.00,Groceries,Checking,Market",
            "01-09-2021,-20.00,Dining,Checking,Cafe",
        ],
    );
    let chart = dir.path().join("charts").join("spending.pdf");
    bookkeeper(dir.path())
        .arg(&csv)
        .arg("--chart")
        .arg(&chart)
        .assert()
        .success();
    let bytes = std::fs::read(&chart).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn oversized_amounts_fail_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &[
            "01-05-2021,79228162514264337593543950335,Groceries,Checking,Market",
            "01-06-2021,79228162514264337593543950335,Groceries,Checking,Market",
        ],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error: Line 2: invalid amount"));
}

#[test]
fn empty_field_rows_are_not_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        &["01-05-2021,-50.00,Groceries,Checking,Market", ",,,,", " , , , , "],
    );
    bookkeeper(dir.path())
        .arg(&csv)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Line 3: invalid date"));

    bookkeeper(dir.path())
        .arg(&csv)
        .arg("--skip-invalid")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 loaded, 1 matched, 2 skipped"));
}

#[test]
fn undecodable_row_is_skipped_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("transactions.csv");
    let mut content = format!("{HEADER}01-05-2021,-50.00,Groceries,Checking,Market\n").into_bytes();
    content.extend_from_slice(b"01-06-2021,-4.50,Dining,Checking,Caf\xff\xfe\n");
    std::fs::write(&csv, content).unwrap();

    bookkeeper(dir.path())
        .arg(&csv)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Line 3: invalid record: invalid UTF-8"));

    bookkeeper(dir.path())
        .arg(&csv)
        .arg("--skip-invalid")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 loaded, 1 matched, 1 skipped"));
}
