//! Integration tests for the vita binary.
//!
//! These tests verify end-to-end behavior including:
//! - Onboarding and calorie target computation
//! - Entry logging and deletion per record kind
//! - Daily summary and statistics output
//! - Data persistence across invocations

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("vita"))
}

fn init_profile(data_dir: &std::path::Path) {
    cli()
        .args(["init", "--weight", "70", "--target-weight", "65"])
        .args(["--height", "175", "--age", "30", "--gender", "male"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local health tracker"));
}

#[test]
fn test_init_reports_reference_calorie_target() {
    let temp_dir = setup_test_dir();

    // Mifflin-St Jeor reference: 70kg/175cm/30y male at 1.2 -> 2044
    cli()
        .args(["init", "--weight", "70", "--target-weight", "65"])
        .args(["--height", "175", "--age", "30", "--gender", "male"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"))
        .stdout(predicate::str::contains("2044"));

    // Database file created under the data dir
    assert!(temp_dir.path().join("vita.db").exists());
}

#[test]
fn test_init_activity_override() {
    let temp_dir = setup_test_dir();

    // 1703.75 * 1.55 = 2640.8125 -> 2640
    cli()
        .args(["init", "--weight", "70", "--target-weight", "65"])
        .args(["--height", "175", "--age", "30", "--gender", "male"])
        .args(["--activity", "1.55"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2640"));
}

#[test]
fn test_init_replaces_existing_profile() {
    let temp_dir = setup_test_dir();
    init_profile(temp_dir.path());

    cli()
        .args(["init", "--weight", "72", "--target-weight", "66"])
        .args(["--height", "175", "--age", "30", "--gender", "male"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_weight_add_list_rm() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["weight", "add", "78.5"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("78.5 kg"));

    cli()
        .args(["weight", "list"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("78.5 kg"));

    // Entries get rowid 1 in a fresh database
    cli()
        .args(["weight", "rm", "1"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed weight entry 1"));

    cli()
        .args(["weight", "list"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No weight entries yet"));
}

#[test]
fn test_rm_missing_id_reports_not_found() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["food", "rm", "42"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No food entry with id 42"));
}

#[test]
fn test_food_list_totals_one_day() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["food", "add", "oatmeal", "350"])
        .args(["--protein", "12", "--carb", "60"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("350 kcal"));

    cli()
        .args(["food", "add", "salad", "200"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .args(["food", "list"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("oatmeal"))
        .stdout(predicate::str::contains("salad"))
        .stdout(predicate::str::contains("Total: 550 kcal"));
}

#[test]
fn test_today_summary_aggregates() {
    let temp_dir = setup_test_dir();
    init_profile(temp_dir.path());

    cli()
        .args(["food", "add", "toast", "300"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .args(["water", "add", "500"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .args(["sleep", "add", "7.5", "4"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .arg("today")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Calories: 300 / 2044 kcal"))
        .stdout(predicate::str::contains("Water:    500 / 2000 ml"))
        .stdout(predicate::str::contains("7.5h, quality 4/5"))
        .stdout(predicate::str::contains("70.0 kg"));
}

#[test]
fn test_today_is_default_command() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary for"));
}

#[test]
fn test_sleep_quality_out_of_range_rejected() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["sleep", "add", "8", "6"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_stats_json_shape() {
    let temp_dir = setup_test_dir();
    init_profile(temp_dir.path());

    let output = cli()
        .args(["stats", "--json"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to run stats");
    assert!(output.status.success());

    let stats: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stats --json should emit valid JSON");

    // One weight entry (from onboarding): no trend, no estimate
    assert_eq!(stats["trend"], "stable");
    assert_eq!(stats["average_weight"], 70.0);
    assert_eq!(stats["weekly_change"], 0.0);
    assert!(stats["estimated_days_to_goal"].is_null());
    assert_eq!(stats["days_over_limit"], 0);
}

#[test]
fn test_stats_period_filter() {
    let temp_dir = setup_test_dir();
    init_profile(temp_dir.path());

    cli()
        .args(["stats", "--period", "7"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Statistics (last 7 days)"));

    // Unknown period falls back to all time with a warning
    cli()
        .args(["stats", "--period", "sometimes"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown period"))
        .stdout(predicate::str::contains("Statistics (all time)"));
}

#[test]
fn test_data_persists_across_invocations() {
    let temp_dir = setup_test_dir();

    for kg in ["80.0", "79.5", "79.0"] {
        cli()
            .args(["weight", "add", kg])
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }

    cli()
        .args(["weight", "list"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("80.0 kg"))
        .stdout(predicate::str::contains("79.5 kg"))
        .stdout(predicate::str::contains("79.0 kg"));
}
