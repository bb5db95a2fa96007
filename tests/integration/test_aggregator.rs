//! End-to-end tests of the aggregation pipeline.

use std::io::Read;

use wesign_reports_lib::config::{AggregatorConfig, RunContext};
use wesign_reports_lib::models::{ArtifactType, SummaryDocument};
use wesign_reports_lib::services::ReportAggregator;

use crate::fixtures::{newman_html, trx, write};

fn aggregator(root: &std::path::Path) -> ReportAggregator {
    ReportAggregator::new(root, RunContext::default(), AggregatorConfig::default())
}

#[test]
fn test_build_and_api_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build.trx", trx(5, 5, 5, 0));
    write(dir.path(), "newman-api-report.html", newman_html(4, 1));

    let mut aggregator = aggregator(dir.path());
    aggregator.collect_artifacts(None);
    let metrics = aggregator.parse_reports();
    assert_eq!(metrics.len(), 2);

    let api = &metrics["newman_newman-api-report.html"];
    assert_eq!(api.total_tests, 5);
    assert_eq!(api.success_rate, 80.0);
    assert_eq!(api.average_response_time_ms, 100.0);

    let build = &metrics["trx_build.trx"];
    assert_eq!(build.success_rate, 100.0);
    assert_eq!(build.duration_seconds, 10.0);

    let summary = aggregator.generate_summary(Some("scenario"));
    assert_eq!(summary.scores.build(), 100.0);
    assert_eq!(summary.scores.api(), 80.0);
    assert_eq!(summary.scores.smoke(), 0.0);
    assert_eq!(summary.scores.e2e(), 0.0);
    // (100 * 0.2 + 80 * 0.3) / 0.5 - 2 * 10
    assert!((summary.overall_score() - 68.0).abs() < 1e-9);
}

#[test]
fn test_collect_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TestResults/unit.trx", trx(3, 3, 3, 0));
    write(dir.path(), "screenshots/login.png", b"not really a png");
    write(dir.path(), "logs/run.log", "INFO start\nERROR boom\n");

    let mut aggregator = aggregator(dir.path());
    let first: Vec<_> = aggregator
        .collect_artifacts(None)
        .iter()
        .map(|a| (a.name.clone(), a.checksum.clone()))
        .collect();
    let second: Vec<_> = aggregator
        .collect_artifacts(None)
        .iter()
        .map(|a| (a.name.clone(), a.checksum.clone()))
        .collect();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_corrupt_html_does_not_abort_batch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "results/unit.trx", trx(4, 4, 3, 1));
    write(
        dir.path(),
        "results/playwright-report.html",
        b"<html><head><script>window.playwrightReportBase64 = \"\xff\xfe",
    );

    let mut aggregator = aggregator(dir.path());
    let patterns = vec!["**/*".to_string()];
    let artifacts = aggregator.collect_artifacts(Some(patterns.as_slice()));
    assert!(
        artifacts
            .iter()
            .any(|a| a.artifact_type == ArtifactType::PlaywrightHtml)
    );

    let metrics = aggregator.parse_reports();
    assert_eq!(metrics["trx_unit.trx"].success_rate, 75.0);
    let playwright = &metrics["playwright_playwright-report.html"];
    assert_eq!(playwright.total_tests, 0);
    assert_eq!(playwright.success_rate, 0.0);

    let summary = aggregator.generate_summary(None);
    assert_eq!(summary.artifacts.len(), 2);
    assert_eq!(summary.metrics.len(), 2);
}

#[test]
fn test_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = dir.path().join("workspace");
    write(&workspace, "build.trx", trx(5, 5, 5, 0));
    write(&workspace, "newman-api-report.html", newman_html(4, 1));
    write(&workspace, "network.har", r#"{"log":{"version":"1.2","entries":[{}]}}"#);

    let context = RunContext {
        environment: "staging".to_string(),
        build_number: Some("118".to_string()),
        git_commit: Some("9f2c1e7".to_string()),
        qa_api_key: None,
    };
    let mut aggregator = ReportAggregator::new(&workspace, context, AggregatorConfig::default());
    aggregator.collect_artifacts(None);
    aggregator.parse_reports();
    let summary = aggregator.generate_summary(Some("round-trip"));

    let output = dir.path().join("out/summary.json");
    assert!(aggregator.export_summary(&summary, &output));

    let content = std::fs::read_to_string(&output).unwrap();
    let document: SummaryDocument = serde_json::from_str(&content).unwrap();
    assert_eq!(document.run_id, "round-trip");
    assert_eq!(document.environment, "staging");
    assert_eq!(document.scores.build, summary.scores.build());
    assert_eq!(document.scores.api, summary.scores.api());
    assert_eq!(document.scores.smoke, summary.scores.smoke());
    assert_eq!(document.scores.e2e, summary.scores.e2e());
    assert_eq!(document.scores.overall, summary.scores.overall());
    assert_eq!(document.scores.weights.api, 0.30);
    assert_eq!(document.artifacts.len(), summary.artifacts.len());
    assert_eq!(document.metrics.len(), summary.metrics.len());
    assert_eq!(document.integration.jenkins_build_number.as_deref(), Some("118"));
    assert_eq!(document.version, env!("CARGO_PKG_VERSION"));

    let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
    for key in [
        "run_id",
        "environment",
        "start_time",
        "end_time",
        "total_duration_seconds",
        "scores",
        "metrics",
        "artifacts",
        "integration",
        "generated_at",
        "version",
    ] {
        assert!(raw.get(key).is_some(), "missing key {}", key);
    }
    let har = raw["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["type"] == "har")
        .unwrap();
    assert!(har["path"].is_string());
    assert!(har["created_at"].is_string());
    assert_eq!(har["metadata"]["entry_count"], 1);
}

#[test]
fn test_export_to_invalid_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = write(dir.path(), "blocker", "file, not a directory");

    let aggregator = aggregator(dir.path());
    let summary = aggregator.generate_summary(None);
    assert!(!aggregator.export_summary(&summary, &blocker.join("summary.json")));
}

#[test]
fn test_archive_contains_summary_and_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let workspace = dir.path().join("ws");
    write(&workspace, "TestResults/build.trx", trx(2, 2, 2, 0));
    write(&workspace, "logs/run.log", "done\n");
    let doomed = write(&workspace, "logs/gone.log", "bye\n");

    let mut aggregator =
        ReportAggregator::new(&workspace, RunContext::default(), AggregatorConfig::default());
    aggregator.collect_artifacts(None);
    aggregator.parse_reports();
    let summary = aggregator.generate_summary(Some("archive"));
    std::fs::remove_file(doomed).unwrap();

    let archive_path = dir.path().join("artifacts.zip");
    assert!(aggregator.archive_artifacts(&summary, &archive_path));

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["TestResults/build.trx", "logs/run.log", "summary.json"]);

    let mut summary_json = String::new();
    archive
        .by_name("summary.json")
        .unwrap()
        .read_to_string(&mut summary_json)
        .unwrap();
    let document: SummaryDocument = serde_json::from_str(&summary_json).unwrap();
    assert_eq!(document.run_id, "archive");
    assert_eq!(document.artifacts.len(), 3);
}
