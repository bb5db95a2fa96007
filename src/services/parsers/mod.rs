//! Report format parsers.
//!
//! Each parser turns one report format into [`TestMetrics`]. Parsers never
//! fail: unreadable or malformed input yields empty metrics and is logged.

pub mod html;
pub mod newman;
pub mod playwright;
pub mod trx;

use crate::models::{ArtifactInfo, ArtifactType, TestMetrics};

pub use newman::parse_newman_html;
pub use playwright::parse_playwright_html;
pub use trx::parse_trx;

/// Parse an artifact if its type carries test metrics.
pub fn parse_artifact(artifact: &ArtifactInfo) -> Option<TestMetrics> {
    match artifact.artifact_type {
        ArtifactType::Trx => Some(parse_trx(&artifact.path)),
        ArtifactType::NewmanHtml => Some(parse_newman_html(&artifact.path)),
        ArtifactType::PlaywrightHtml => Some(parse_playwright_html(&artifact.path)),
        _ => None,
    }
}
