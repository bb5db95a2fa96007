//! Per-report test statistics.

use serde::{Deserialize, Serialize};

/// Statistics extracted from one parsed report.
///
/// Counts need not add up exactly: each report format has its own notion of
/// what "skipped" means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestMetrics {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub skipped_tests: u64,
    pub duration_seconds: f64,
    /// Percentage of passed tests, 0 when no tests ran
    pub success_rate: f64,
    /// Mean response time harvested from the report, 0 when unavailable
    #[serde(default)]
    pub average_response_time_ms: f64,
}

impl TestMetrics {
    /// Build metrics from raw counts, deriving the success rate.
    pub fn from_counts(
        total_tests: u64,
        passed_tests: u64,
        failed_tests: u64,
        skipped_tests: u64,
        duration_seconds: f64,
    ) -> Self {
        TestMetrics {
            total_tests,
            passed_tests,
            failed_tests,
            skipped_tests,
            duration_seconds: duration_seconds.max(0.0),
            success_rate: success_rate(passed_tests, total_tests),
            average_response_time_ms: 0.0,
        }
    }

    /// Attach an average response time.
    pub fn with_response_time(mut self, average_ms: f64) -> Self {
        self.average_response_time_ms = average_ms.max(0.0);
        self
    }

    /// True when the report yielded nothing usable.
    pub fn is_empty(&self) -> bool {
        self.total_tests == 0 && self.passed_tests == 0 && self.failed_tests == 0
    }
}

/// `passed / total * 100` capped to `[0, 100]`, or 0 for an empty run.
///
/// Scraped reports can claim more passes than tests.
pub fn success_rate(passed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (passed as f64 / total as f64 * 100.0).min(100.0)
    }
}
