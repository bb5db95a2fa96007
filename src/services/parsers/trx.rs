//! VSTest TRX results parser.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::{Document, Node};
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::models::TestMetrics;

/// MSTest 2010 schema namespace; older writers omit it.
pub const TRX_NAMESPACE: &str = "http://microsoft.com/schemas/VisualStudio/TeamTest/2010";

/// Parse a TRX file, yielding empty metrics on any failure.
pub fn parse_trx(path: &Path) -> TestMetrics {
    match try_parse_trx(path) {
        Ok(metrics) => metrics,
        Err(e) => {
            error!("Failed to parse TRX file {}: {}", path.display(), e);
            TestMetrics::default()
        }
    }
}

/// Parse a TRX file.
pub fn try_parse_trx(path: &Path) -> AppResult<TestMetrics> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::FileSystem(format!("Failed to read TRX file: {}", e)))?;
    parse_trx_str(&content)
}

/// Parse TRX document text.
pub fn parse_trx_str(content: &str) -> AppResult<TestMetrics> {
    let doc = Document::parse(content.trim_start_matches('\u{feff}'))?;

    let counters = find_element(&doc, "Counters")
        .ok_or_else(|| AppError::Parse("TRX file has no Counters element".to_string()))?;

    let count = |name: &str| -> u64 {
        counters
            .attribute(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    };

    let total = count("total");
    let executed = count("executed");
    let passed = count("passed");
    // Any non-pass terminal outcome is a failure.
    let failed = ["failed", "error", "timeout", "aborted"]
        .into_iter()
        .fold(0u64, |sum, name| sum.saturating_add(count(name)));
    let skipped = total.saturating_sub(executed);
    debug!(
        "TRX counters: total={} executed={} passed={} inconclusive={}",
        total,
        executed,
        passed,
        count("inconclusive")
    );

    let duration = find_element(&doc, "Times")
        .and_then(|times| {
            let start = parse_timestamp(times.attribute("start")?)?;
            let finish = parse_timestamp(times.attribute("finish")?)?;
            Some((finish - start).num_milliseconds() as f64 / 1000.0)
        })
        .unwrap_or(0.0);

    Ok(TestMetrics::from_counts(
        total, passed, failed, skipped, duration,
    ))
}

/// Namespaced lookup first, then the unqualified element name.
fn find_element<'a, 'input>(doc: &'a Document<'input>, name: &str) -> Option<Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.has_tag_name((TRX_NAMESPACE, name)))
        .or_else(|| {
            doc.descendants().find(|n| {
                n.is_element() && n.tag_name().namespace().is_none() && n.tag_name().name() == name
            })
        })
}

/// ISO-8601 timestamp; a trailing `Z` and a missing offset both mean UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let normalized = match value.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => value.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.and_utc())
        })
}
