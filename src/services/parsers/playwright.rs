//! Playwright HTML report parser.
//!
//! The report page embeds its data as `window.playwrightReportBase64`; when
//! present that payload is authoritative. Otherwise the markup is scraped.

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::html;
use crate::error::{AppError, AppResult};
use crate::models::TestMetrics;

static EMBEDDED_REPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.playwrightReportBase64\s*=\s*["']([^"']*)["']"#).expect("valid regex")
});

/// Class/id tokens scraped when no embedded payload exists.
const SUMMARY_CONTAINERS: &[&str] = &["summary", "stats", "subnav"];

/// File inside a zipped payload holding the report data.
const REPORT_ENTRY: &str = "report.json";

/// Embedded report data.
#[derive(Debug, Deserialize)]
struct EmbeddedReport {
    stats: EmbeddedStats,
    /// Run duration in milliseconds
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmbeddedStats {
    total: Option<u64>,
    expected: u64,
    unexpected: u64,
    skipped: u64,
    flaky: u64,
    duration: Option<f64>,
}

impl From<EmbeddedReport> for TestMetrics {
    fn from(report: EmbeddedReport) -> Self {
        let stats = report.stats;
        // Flaky tests passed on retry.
        let passed = stats.expected.saturating_add(stats.flaky);
        let total = stats.total.unwrap_or(
            passed
                .saturating_add(stats.unexpected)
                .saturating_add(stats.skipped),
        );
        let duration_ms = report.duration.or(stats.duration).unwrap_or(0.0);
        TestMetrics::from_counts(
            total,
            passed,
            stats.unexpected,
            stats.skipped,
            duration_ms / 1000.0,
        )
    }
}

/// Parse a Playwright HTML report, yielding empty metrics on any failure.
pub fn parse_playwright_html(path: &Path) -> TestMetrics {
    match try_parse_playwright_html(path) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to parse Playwright report {}: {}", path.display(), e);
            TestMetrics::default()
        }
    }
}

/// Parse a Playwright HTML report.
pub fn try_parse_playwright_html(path: &Path) -> AppResult<TestMetrics> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::FileSystem(format!("Failed to read Playwright report: {}", e)))?;
    Ok(parse_playwright_str(&String::from_utf8_lossy(&bytes)))
}

/// Metrics from the embedded payload if usable, else from the page text.
pub fn parse_playwright_str(content: &str) -> TestMetrics {
    if let Some(payload) = find_embedded_payload(content) {
        match decode_embedded_report(payload) {
            Ok(metrics) => return metrics,
            Err(e) => warn!("Embedded Playwright data unusable, scraping page text: {}", e),
        }
    } else {
        debug!("No embedded Playwright data, scraping page text");
    }

    html::scrape_metrics(content, SUMMARY_CONTAINERS, false)
}

fn find_embedded_payload(content: &str) -> Option<&str> {
    html::script_bodies(content).into_iter().find_map(|script| {
        EMBEDDED_REPORT
            .captures(script)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    })
}

/// Decode a base64 payload, optionally a `data:` URL and optionally zipped.
fn decode_embedded_report(payload: &str) -> AppResult<TestMetrics> {
    let encoded = match payload.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::Parse(format!("Invalid base64 payload: {}", e)))?;

    let json = if bytes.starts_with(b"PK") {
        read_zipped_report(bytes)?
    } else {
        bytes
    };

    let report: EmbeddedReport = serde_json::from_slice(&json)?;
    Ok(report.into())
}

fn read_zipped_report(bytes: Vec<u8>) -> AppResult<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_name(REPORT_ENTRY)?;
    let mut json = Vec::new();
    entry.read_to_end(&mut json)?;
    Ok(json)
}
