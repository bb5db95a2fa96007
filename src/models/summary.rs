//! Run summary and its serialized document form.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactInfo;
use super::scores::{ComponentScores, SCORE_WEIGHTS, ScoreWeights};
use super::test_metrics::TestMetrics;

/// Version stamped into every exported summary.
pub const SUMMARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Aggregate result of one test run.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub run_id: String,
    pub environment: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration_seconds: f64,
    pub scores: ComponentScores,
    pub metrics: BTreeMap<String, TestMetrics>,
    pub artifacts: Vec<ArtifactInfo>,
    /// Set after a QA Intelligence report attempt
    pub qa_intelligence_reported: bool,
    pub jenkins_build_number: Option<String>,
    pub git_commit_hash: Option<String>,
}

impl ReportSummary {
    pub fn overall_score(&self) -> f64 {
        self.scores.overall()
    }

    /// Serializable view of this summary.
    pub fn to_document(&self) -> SummaryDocument {
        SummaryDocument {
            run_id: self.run_id.clone(),
            environment: self.environment.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            total_duration_seconds: self.total_duration_seconds,
            scores: ScoresDocument::from(&self.scores),
            metrics: self.metrics.clone(),
            artifacts: self.artifacts.clone(),
            integration: IntegrationDocument {
                qa_intelligence_reported: self.qa_intelligence_reported,
                jenkins_build_number: self.jenkins_build_number.clone(),
                git_commit_hash: self.git_commit_hash.clone(),
            },
            generated_at: Utc::now(),
            version: SUMMARY_VERSION.to_string(),
        }
    }
}

/// JSON document written by the summary exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub run_id: String,
    pub environment: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_duration_seconds: f64,
    pub scores: ScoresDocument,
    pub metrics: BTreeMap<String, TestMetrics>,
    pub artifacts: Vec<ArtifactInfo>,
    pub integration: IntegrationDocument,
    pub generated_at: DateTime<Utc>,
    pub version: String,
}

/// Scores section of the summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoresDocument {
    pub build: f64,
    pub smoke: f64,
    pub api: f64,
    pub e2e: f64,
    pub overall: f64,
    pub weights: ScoreWeights,
}

impl From<&ComponentScores> for ScoresDocument {
    fn from(scores: &ComponentScores) -> Self {
        ScoresDocument {
            build: scores.build(),
            smoke: scores.smoke(),
            api: scores.api(),
            e2e: scores.e2e(),
            overall: scores.overall(),
            weights: SCORE_WEIGHTS,
        }
    }
}

/// CI and reporting details of the summary document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationDocument {
    pub qa_intelligence_reported: bool,
    pub jenkins_build_number: Option<String>,
    pub git_commit_hash: Option<String>,
}
