//! QA Intelligence reporting client.
//!
//! Posts a compact run summary to the QA Intelligence service. Reporting is
//! best effort: every failure is logged and surfaces only as `false`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::QaIntelligenceConfig;
use crate::error::{AppError, AppResult};
use crate::models::ReportSummary;

/// Run summary as posted to QA Intelligence.
#[derive(Debug, Serialize)]
pub struct QaRunPayload<'a> {
    pub run_id: &'a str,
    pub environment: &'a str,
    pub timestamp: DateTime<Utc>,
    pub scores: QaScores,
    pub metrics: BTreeMap<&'a str, QaMetricBreakdown>,
    pub artifact_count: usize,
    pub build_number: Option<&'a str>,
    pub commit_hash: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct QaScores {
    pub build: f64,
    pub smoke: f64,
    pub api: f64,
    pub e2e: f64,
    pub overall: f64,
}

#[derive(Debug, Serialize)]
pub struct QaMetricBreakdown {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub success_rate: f64,
    pub duration_seconds: f64,
}

impl<'a> QaRunPayload<'a> {
    pub fn from_summary(summary: &'a ReportSummary) -> Self {
        QaRunPayload {
            run_id: &summary.run_id,
            environment: &summary.environment,
            timestamp: Utc::now(),
            scores: QaScores {
                build: summary.scores.build(),
                smoke: summary.scores.smoke(),
                api: summary.scores.api(),
                e2e: summary.scores.e2e(),
                overall: summary.scores.overall(),
            },
            metrics: summary
                .metrics
                .iter()
                .map(|(name, m)| {
                    (
                        name.as_str(),
                        QaMetricBreakdown {
                            total: m.total_tests,
                            passed: m.passed_tests,
                            failed: m.failed_tests,
                            skipped: m.skipped_tests,
                            success_rate: m.success_rate,
                            duration_seconds: m.duration_seconds,
                        },
                    )
                })
                .collect(),
            artifact_count: summary.artifacts.len(),
            build_number: summary.jenkins_build_number.as_deref(),
            commit_hash: summary.git_commit_hash.as_deref(),
        }
    }
}

/// Blocking HTTP reporter bound to one QA Intelligence endpoint.
pub struct QaIntelligenceReporter {
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl QaIntelligenceReporter {
    /// Create a reporter. An explicit key in `config` wins over `fallback_key`.
    pub fn new(config: &QaIntelligenceConfig, fallback_key: Option<&str>) -> Self {
        QaIntelligenceReporter {
            url: config.report_url(),
            api_key: config
                .api_key
                .clone()
                .or_else(|| fallback_key.map(str::to_string)),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post the summary. Returns true on a 2xx response.
    pub fn report(&self, summary: &ReportSummary) -> bool {
        match self.send(summary) {
            Ok(()) => {
                info!("Reported run {} to QA Intelligence", summary.run_id);
                true
            }
            Err(e) => {
                warn!("QA Intelligence reporting failed: {}", e);
                false
            }
        }
    }

    fn send(&self, summary: &ReportSummary) -> AppResult<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let mut request = client
            .post(&self.url)
            .json(&QaRunPayload::from_summary(summary));
        match &self.api_key {
            Some(key) => request = request.bearer_auth(key),
            None => warn!("No QA Intelligence API key configured, sending unauthenticated"),
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!(
                "{} responded with {}",
                self.url, status
            )));
        }
        Ok(())
    }
}
