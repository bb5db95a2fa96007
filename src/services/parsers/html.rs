//! Text scraping helpers shared by the HTML report parsers.
//!
//! Newman and Playwright HTML output has no stable schema, so these helpers
//! work on raw markup with regexes rather than a DOM.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::TestMetrics;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static PASSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+passed\b").expect("valid regex"));
static FAILED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+failed\b").expect("valid regex"));
static TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+total\b").expect("valid regex"));
static SKIPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+skipped\b").expect("valid regex"));

static RESPONSE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*ms\b").expect("valid regex"));
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:duration|elapsed|took|total time)\D{0,24}?(\d+(?:\.\d+)?)\s*(ms|seconds|secs|sec|s|minutes|mins|min|m)\b",
    )
    .expect("valid regex")
});

/// Bodies of every inline `<script>` element.
pub fn script_bodies(html: &str) -> Vec<&str> {
    SCRIPT_BLOCK
        .captures_iter(html)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Visible text nodes of a fragment, trimmed and with basic entities decoded.
pub fn text_nodes(html: &str) -> Vec<String> {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, "<script></script>");
    let without_styles = STYLE_BLOCK.replace_all(&without_scripts, "");
    let without_comments = COMMENT.replace_all(&without_styles, "");

    TAG.split(&without_comments)
        .map(|s| decode_entities(s.trim()))
        .filter(|s| !s.is_empty())
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Inner markup of the first element whose `class` or `id` contains one of
/// the candidate tokens, tried in order.
pub fn find_container<'a>(html: &'a str, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|token| find_container_by_token(html, token))
}

fn find_container_by_token<'a>(html: &'a str, token: &str) -> Option<&'a str> {
    let pattern = format!(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*\b(?:class|id)\s*=\s*["'][^"']*\b{}\b[^"']*["'][^>]*>"#,
        regex::escape(token)
    );
    let open = Regex::new(&pattern).ok()?;
    let caps = open.captures(html)?;
    let whole = caps.get(0)?;
    let tag = caps.get(1)?.as_str().to_lowercase();

    let inner_start = whole.end();
    let inner_end = matching_close(html, inner_start, &tag).unwrap_or(html.len());
    Some(&html[inner_start..inner_end])
}

/// Offset of the closing tag balancing an element opened just before `from`.
fn matching_close(html: &str, from: usize, tag: &str) -> Option<usize> {
    let pattern = format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag));
    let tags = Regex::new(&pattern).ok()?;

    let mut depth = 1usize;
    for caps in tags.captures_iter(&html[from..]) {
        let m = caps.get(0)?;
        if caps.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some(from + m.start());
            }
        } else if !m.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Counts found by scanning free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapedCounts {
    pub passed: Option<u64>,
    pub failed: Option<u64>,
    pub total: Option<u64>,
    pub skipped: Option<u64>,
}

impl ScrapedCounts {
    pub fn from_text(text: &str) -> Self {
        ScrapedCounts {
            passed: first_count(&PASSED, text),
            failed: first_count(&FAILED, text),
            total: first_count(&TOTAL, text),
            skipped: first_count(&SKIPPED, text),
        }
    }

    /// Convert to metrics; an unreported total is the sum of the parts.
    pub fn into_metrics(self, duration_seconds: f64) -> TestMetrics {
        let passed = self.passed.unwrap_or(0);
        let failed = self.failed.unwrap_or(0);
        let skipped = self.skipped.unwrap_or(0);
        let total = self
            .total
            .unwrap_or(passed.saturating_add(failed).saturating_add(skipped));
        TestMetrics::from_counts(total, passed, failed, skipped, duration_seconds)
    }
}

fn first_count(pattern: &Regex, text: &str) -> Option<u64> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Mean of every `<n>ms` value found in the text nodes.
pub fn average_response_time_ms(nodes: &[String]) -> Option<f64> {
    let values: Vec<f64> = nodes
        .iter()
        .flat_map(|node| RESPONSE_TIME.captures_iter(node))
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<f64>().ok()))
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Duration in seconds from the first text node with a duration-like phrase.
pub fn duration_seconds(nodes: &[String]) -> Option<f64> {
    nodes.iter().find_map(|node| {
        let caps = DURATION.captures(node)?;
        let value: f64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = caps.get(2)?.as_str().to_lowercase();
        Some(match unit.as_str() {
            "ms" => value / 1000.0,
            "m" | "min" | "mins" | "minutes" => value * 60.0,
            _ => value,
        })
    })
}

/// Best-effort metrics from report markup.
///
/// Counts come from the first candidate container present, or from the
/// whole document when none is.
pub fn scrape_metrics(html: &str, containers: &[&str], with_response_times: bool) -> TestMetrics {
    let scope = find_container(html, containers).unwrap_or(html);
    let scope_text = text_nodes(scope).join(" ");
    let counts = ScrapedCounts::from_text(&scope_text);

    let nodes = text_nodes(html);
    let duration = duration_seconds(&nodes).unwrap_or(0.0);
    let metrics = counts.into_metrics(duration);

    if with_response_times {
        metrics.with_response_time(average_response_time_ms(&nodes).unwrap_or(0.0))
    } else {
        metrics
    }
}
