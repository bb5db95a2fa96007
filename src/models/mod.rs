//! Domain models for the report aggregator.

pub mod artifact;
pub mod scores;
pub mod summary;
pub mod test_metrics;

// Re-export commonly used types
pub use artifact::{ArtifactInfo, ArtifactType};
pub use scores::{ComponentScores, MISSING_COMPONENT_PENALTY, SCORE_WEIGHTS, ScoreWeights};
pub use summary::{IntegrationDocument, ReportSummary, ScoresDocument, SummaryDocument};
pub use test_metrics::TestMetrics;
