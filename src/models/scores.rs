//! Component scores and the weighted composite run score.

use serde::{Deserialize, Serialize};

/// Points deducted per scoring category with no contribution.
pub const MISSING_COMPONENT_PENALTY: f64 = 10.0;

/// Fixed weight of each scoring category in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub build: f64,
    pub smoke: f64,
    pub api: f64,
    pub e2e: f64,
}

/// The weights every run is scored with.
pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    build: 0.20,
    smoke: 0.20,
    api: 0.30,
    e2e: 0.30,
};

/// Per-category scores plus the composite derived from them.
///
/// `overall` is only ever computed by [`ComponentScores::new`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComponentScores {
    build: f64,
    smoke: f64,
    api: f64,
    e2e: f64,
    overall: f64,
}

impl ComponentScores {
    /// Build scores from the four category means, computing the overall score.
    ///
    /// Categories scoring 0 are left out of the weighted mean and each one
    /// costs [`MISSING_COMPONENT_PENALTY`] points, floored at 0.
    pub fn new(build: f64, smoke: f64, api: f64, e2e: f64) -> Self {
        let build = clamp_score(build);
        let smoke = clamp_score(smoke);
        let api = clamp_score(api);
        let e2e = clamp_score(e2e);

        let weighted = [
            (build, SCORE_WEIGHTS.build),
            (smoke, SCORE_WEIGHTS.smoke),
            (api, SCORE_WEIGHTS.api),
            (e2e, SCORE_WEIGHTS.e2e),
        ];

        let (sum, weight_sum, missing) =
            weighted
                .iter()
                .fold((0.0, 0.0, 0u32), |(sum, weight_sum, missing), &(score, weight)| {
                    if score > 0.0 {
                        (sum + score * weight, weight_sum + weight, missing)
                    } else {
                        (sum, weight_sum, missing + 1)
                    }
                });

        let mean = if weight_sum > 0.0 { sum / weight_sum } else { 0.0 };
        let overall = clamp_score(mean - f64::from(missing) * MISSING_COMPONENT_PENALTY);

        ComponentScores {
            build,
            smoke,
            api,
            e2e,
            overall,
        }
    }

    pub fn build(&self) -> f64 {
        self.build
    }

    pub fn smoke(&self) -> f64 {
        self.smoke
    }

    pub fn api(&self) -> f64 {
        self.api
    }

    pub fn e2e(&self) -> f64 {
        self.e2e
    }

    pub fn overall(&self) -> f64 {
        self.overall
    }

    /// Number of categories that did not contribute to the overall score.
    pub fn missing_components(&self) -> usize {
        [self.build, self.smoke, self.api, self.e2e]
            .iter()
            .filter(|s| **s <= 0.0)
            .count()
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}
