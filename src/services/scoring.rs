//! Score calculation over named test metrics.
//!
//! Metrics are bucketed by substring of their key, so a single metric can
//! feed several categories.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{ComponentScores, TestMetrics};

/// Score assumed for the build when a TRX report parsed but nothing is build-labelled.
const IMPLIED_BUILD_SCORE: f64 = 100.0;

/// Scoring category a metric key can land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCategory {
    Build,
    Smoke,
    Api,
    E2e,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 4] = [
        ScoreCategory::Build,
        ScoreCategory::Smoke,
        ScoreCategory::Api,
        ScoreCategory::E2e,
    ];

    /// Key substrings (lowercase) that select this category.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            ScoreCategory::Build => &["build", "compile"],
            ScoreCategory::Smoke => &["smoke"],
            ScoreCategory::Api => &["newman", "api"],
            ScoreCategory::E2e => &["playwright", "e2e"],
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.keywords().iter().any(|kw| key.contains(kw))
    }
}

/// Compute category scores and the weighted overall score.
pub fn calculate_scores(metrics: &BTreeMap<String, TestMetrics>) -> ComponentScores {
    let mean_for = |category: ScoreCategory| -> Option<f64> {
        let rates: Vec<f64> = metrics
            .iter()
            .filter(|(key, _)| category.matches(key))
            .map(|(_, m)| m.success_rate)
            .collect();
        if rates.is_empty() {
            None
        } else {
            Some(rates.iter().sum::<f64>() / rates.len() as f64)
        }
    };

    let has_trx = metrics.keys().any(|key| key.starts_with("trx_"));
    let build = match mean_for(ScoreCategory::Build) {
        Some(score) => score,
        // A parseable TRX means the solution compiled.
        None if has_trx => IMPLIED_BUILD_SCORE,
        None => 0.0,
    };
    let smoke = mean_for(ScoreCategory::Smoke).unwrap_or(0.0);
    let api = mean_for(ScoreCategory::Api).unwrap_or(0.0);
    let e2e = mean_for(ScoreCategory::E2e).unwrap_or(0.0);

    let scores = ComponentScores::new(build, smoke, api, e2e);
    debug!(
        "Scores: build={:.1} smoke={:.1} api={:.1} e2e={:.1} overall={:.1}",
        scores.build(),
        scores.smoke(),
        scores.api(),
        scores.e2e(),
        scores.overall()
    );
    scores
}
