//! Newman HTML report parser.

use std::path::Path;

use tracing::error;

use super::html;
use crate::error::{AppError, AppResult};
use crate::models::TestMetrics;

/// Class/id tokens of the elements Newman reporters put run totals in.
const SUMMARY_CONTAINERS: &[&str] = &["summary", "stats", "totals", "dashboard"];

/// Parse a Newman HTML report, yielding empty metrics on any failure.
pub fn parse_newman_html(path: &Path) -> TestMetrics {
    match try_parse_newman_html(path) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to parse Newman report {}: {}", path.display(), e);
            TestMetrics::default()
        }
    }
}

/// Parse a Newman HTML report.
pub fn try_parse_newman_html(path: &Path) -> AppResult<TestMetrics> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::FileSystem(format!("Failed to read Newman report: {}", e)))?;
    Ok(parse_newman_str(&String::from_utf8_lossy(&bytes)))
}

/// Scrape run totals, duration and response times from report markup.
pub fn parse_newman_str(content: &str) -> TestMetrics {
    html::scrape_metrics(content, SUMMARY_CONTAINERS, true)
}
