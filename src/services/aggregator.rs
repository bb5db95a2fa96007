//! Report aggregation pipeline for one test run.
//!
//! Collect artifacts, parse the ones that carry test metrics, score them and
//! build a [`ReportSummary`]. Export, archival and reporting are independent
//! optional steps on the finished summary.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{AggregatorConfig, RunContext};
use crate::models::{ArtifactInfo, ComponentScores, ReportSummary, TestMetrics};
use crate::services::{artifacts, export, parsers, scoring};
use crate::services::qa_intelligence::QaIntelligenceReporter;

/// Aggregator bound to one workspace for one run.
pub struct ReportAggregator {
    workspace: PathBuf,
    context: RunContext,
    config: AggregatorConfig,
    artifacts: Vec<ArtifactInfo>,
    metrics: BTreeMap<String, TestMetrics>,
}

impl ReportAggregator {
    pub fn new(workspace: impl Into<PathBuf>, context: RunContext, config: AggregatorConfig) -> Self {
        ReportAggregator {
            workspace: workspace.into(),
            context,
            config,
            artifacts: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &[ArtifactInfo] {
        &self.artifacts
    }

    pub fn metrics(&self) -> &BTreeMap<String, TestMetrics> {
        &self.metrics
    }

    /// Scan the workspace, replacing any previously collected artifacts.
    ///
    /// Uses the configured patterns when `patterns` is `None`.
    pub fn collect_artifacts(&mut self, patterns: Option<&[String]>) -> &[ArtifactInfo] {
        let patterns = patterns.unwrap_or(&self.config.patterns);
        info!(
            "Collecting artifacts from {} ({} patterns)",
            self.workspace.display(),
            patterns.len()
        );
        self.artifacts = artifacts::scan_artifacts(&self.workspace, patterns);
        &self.artifacts
    }

    /// Parse every collected report artifact into the metrics map.
    pub fn parse_reports(&mut self) -> &BTreeMap<String, TestMetrics> {
        self.metrics.clear();

        for artifact in &self.artifacts {
            let Some(key) = artifact.metric_key() else {
                continue;
            };
            let Some(metrics) = parsers::parse_artifact(artifact) else {
                continue;
            };

            if metrics.is_empty() {
                warn!(
                    "No test results recovered from {} ({})",
                    artifact.path.display(),
                    artifact.artifact_type
                );
            } else {
                debug!(
                    "{}: {}/{} passed ({:.1}%)",
                    key, metrics.passed_tests, metrics.total_tests, metrics.success_rate
                );
            }
            self.metrics.insert(key, metrics);
        }

        info!("Parsed {} reports", self.metrics.len());
        &self.metrics
    }

    /// Scores for the current metrics.
    pub fn calculate_scores(&self) -> ComponentScores {
        scoring::calculate_scores(&self.metrics)
    }

    /// Build the run summary from the collected artifacts and parsed metrics.
    pub fn generate_summary(&self, run_id: Option<&str>) -> ReportSummary {
        let now = Utc::now();
        let run_id = run_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("run_{}", now.format("%Y%m%d_%H%M%S")));

        let start_time = self
            .artifacts
            .iter()
            .map(|a| a.created_at)
            .min()
            .unwrap_or(now);
        let end_time = self
            .artifacts
            .iter()
            .map(|a| a.created_at)
            .max()
            .unwrap_or(now);
        let total_duration_seconds = (end_time - start_time).num_milliseconds() as f64 / 1000.0;

        let scores = self.calculate_scores();
        info!(
            "Run {} scored {:.1} overall ({} artifacts, {} reports)",
            run_id,
            scores.overall(),
            self.artifacts.len(),
            self.metrics.len()
        );

        ReportSummary {
            run_id,
            environment: self.context.environment.clone(),
            start_time,
            end_time,
            total_duration_seconds,
            scores,
            metrics: self.metrics.clone(),
            artifacts: self.artifacts.clone(),
            qa_intelligence_reported: false,
            jenkins_build_number: self.context.build_number.clone(),
            git_commit_hash: self.context.git_commit.clone(),
        }
    }

    /// Write the summary JSON. Returns false on failure.
    pub fn export_summary(&self, summary: &ReportSummary, path: &Path) -> bool {
        export::export_summary(summary, path)
    }

    /// Write the summary and artifacts to a ZIP. Returns false on failure.
    pub fn archive_artifacts(&self, summary: &ReportSummary, path: &Path) -> bool {
        export::archive_artifacts(summary, &self.workspace, path)
    }

    /// Post the summary to QA Intelligence and record the outcome on it.
    pub fn report_to_qa_intelligence(&self, summary: &mut ReportSummary) -> bool {
        let reporter = QaIntelligenceReporter::new(
            &self.config.qa_intelligence,
            self.context.qa_api_key.as_deref(),
        );
        info!("Reporting run {} to {}", summary.run_id, reporter.url());
        summary.qa_intelligence_reported = reporter.report(summary);
        summary.qa_intelligence_reported
    }
}
