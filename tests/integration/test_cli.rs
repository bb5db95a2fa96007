//! Tests driving the compiled `wesign-reports` binary.

use std::path::Path;
use std::process::{Command, Output};

use crate::fixtures::{newman_html, trx, write};

fn run_cli(workspace: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wesign-reports"))
        .current_dir(workspace)
        .env_remove("WESIGN_ENVIRONMENT")
        .env_remove("BUILD_NUMBER")
        .env_remove("GIT_COMMIT")
        .env_remove("QA_INTELLIGENCE_API_KEY")
        .env_remove("QA_INTELLIGENCE_URL")
        .env_remove("RUST_LOG")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .expect("failed to run wesign-reports")
}

fn read_summary(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_passing_run_exits_zero_and_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.trx", trx(5, 5, 5, 0));
    write(dir.path(), "newman-api-report.html", newman_html(4, 1));
    let output_path = dir.path().join("summary.json");

    let output = run_cli(
        dir.path(),
        &[
            "--output",
            output_path.to_str().unwrap(),
            "--run-id",
            "cli-pass",
            "--environment",
            "staging",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cli-pass"));
    assert!(stdout.contains("PASS"));
    assert!(stdout.contains("Missing:     2 of 4 categories (-20 points)"));

    let summary = read_summary(&output_path);
    assert_eq!(summary["run_id"], "cli-pass");
    assert_eq!(summary["environment"], "staging");
    assert_eq!(summary["scores"]["overall"], 68.0);
    assert_eq!(summary["integration"]["qa_intelligence_reported"], false);
}

#[test]
fn test_score_below_threshold_exits_one_but_still_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.trx", trx(5, 5, 5, 0));
    write(dir.path(), "newman-api-report.html", newman_html(4, 1));
    let config_path = write(dir.path(), "aggregator.json", r#"{"pass_threshold": 70}"#);
    let output_path = dir.path().join("summary.json");

    let output = run_cli(
        dir.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--output",
            output_path.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("FAIL"));
    let summary = read_summary(&output_path);
    assert_eq!(summary["scores"]["overall"], 68.0);
}

#[test]
fn test_failing_api_only_run_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "newman-api-report.html", newman_html(1, 4));

    let output = run_cli(dir.path(), &["--patterns", "*.html"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_empty_workspace_exits_zero_without_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("summary.json");

    let output = run_cli(dir.path(), &["--output", output_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(!output_path.exists());
}

#[test]
fn test_unreadable_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.trx", trx(1, 1, 1, 0));

    let output = run_cli(dir.path(), &["--config", "does-not-exist.json"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_workspace_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-workspace");

    let output = Command::new(env!("CARGO_BIN_EXE_wesign-reports"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--workspace")
        .arg(&missing)
        .output()
        .expect("failed to run wesign-reports");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid input: workspace"));
    assert!(stderr.contains("is not a directory"));
}

#[test]
fn test_unknown_argument_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_cli(dir.path(), &["--no-such-flag"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_archive_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.trx", trx(5, 5, 5, 0));
    write(dir.path(), "smoke-newman.html", newman_html(5, 0));
    write(dir.path(), "e2e-playwright.html", "<p>5 passed</p>");
    let blocker = write(dir.path(), "blocker", "not a directory");
    let archive_path = blocker.join("out.zip");

    let output = run_cli(dir.path(), &["--archive", archive_path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    // The score table is still printed.
    assert!(String::from_utf8_lossy(&output.stdout).contains("Overall"));
}
