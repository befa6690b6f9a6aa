//! CLI binary smoke tests using assert_cmd.
//!
//! These run the compiled `tidecast` binary. Every run points `--data` at a
//! path that does not exist so training falls back to the synthetic series.

use assert_cmd::Command;
use predicates::prelude::*;

const MISSING_DATA: &str = "/nonexistent/gmsl.csv";

fn cmd() -> Command {
    Command::cargo_bin("tidecast").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tidecast"));
}

#[test]
fn unknown_mode_is_rejected() {
    cmd()
        .args(["predict", "Arabian Sea", "2030", "--mode", "sometimes"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// predict
// ---------------------------------------------------------------------------

#[test]
fn predict_without_arguments_errors() {
    cmd().arg("predict").assert().failure();
}

#[test]
fn predict_prints_series_when_training() {
    cmd()
        .args(["predict", "Arabian Sea", "2016", "--data", MISSING_DATA])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"years\":[2015,2016]"))
        .stdout(predicate::str::contains("\"linear\":["))
        .stdout(predicate::str::contains("\"xgboost\":["));
}

#[test]
fn predict_point_shape_omits_years() {
    cmd()
        .args([
            "predict",
            "Coral Sea",
            "2040",
            "--data",
            MISSING_DATA,
            "--shape",
            "point",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"random_forest\":"))
        .stdout(predicate::str::contains("years").not());
}

#[test]
fn predict_before_window_fails() {
    cmd()
        .args(["predict", "Arabian Sea", "2000", "--data", MISSING_DATA])
        .assert()
        .failure();
}

#[test]
fn predict_past_horizon_fails() {
    cmd()
        .args(["predict", "Arabian Sea", "2147483647", "--data", MISSING_DATA])
        .assert()
        .failure()
        .stderr(predicate::str::contains("past the last supported year"));
}

#[test]
fn predict_pretrained_without_artifacts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let models_dir = dir.path().join("missing");
    cmd()
        .args(["predict", "Arabian Sea", "2030", "--mode", "pretrained", "--models-dir"])
        .arg(&models_dir)
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// train, then serve the artifacts
// ---------------------------------------------------------------------------

#[test]
fn train_writes_artifacts_used_by_pretrained_predict() {
    let dir = tempfile::tempdir().unwrap();
    let models_dir = dir.path().join("models");

    cmd()
        .args(["train", "--data", MISSING_DATA, "--models-dir"])
        .arg(&models_dir)
        .assert()
        .success();

    for name in [
        "linear_model.json",
        "decision_tree_model.json",
        "random_forest_model.json",
        "xgboost_model.json",
    ] {
        assert!(models_dir.join(name).is_file(), "{name} was not written");
    }

    // Pretrained mode answers in point form by default.
    cmd()
        .args(["predict", "Barents Sea", "2050", "--mode", "pretrained", "--models-dir"])
        .arg(&models_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"linear\":"))
        .stdout(predicate::str::contains("\"decision_tree\":"))
        .stdout(predicate::str::contains("years").not());
}

#[test]
fn serve_with_missing_artifacts_exits_before_binding() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["serve", "--mode", "pretrained", "--port", "0", "--models-dir"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .code(1);
}

#[test]
fn nonexistent_config_errors() {
    cmd()
        .args(["train", "--config", "/nonexistent/tidecast.json"])
        .assert()
        .failure();
}
