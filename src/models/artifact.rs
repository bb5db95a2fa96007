//! Artifact catalogue model.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Image extensions catalogued as screenshots.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];
/// Extensions catalogued as videos.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "avi", "mov", "mkv"];

/// Kind of file produced by a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactType {
    /// VSTest results XML
    Trx,
    /// Newman HTML report
    NewmanHtml,
    /// Playwright HTML report
    PlaywrightHtml,
    Screenshot,
    Video,
    /// HTTP Archive
    Har,
    /// Generic JSON/XML report
    Report,
    Log,
    Other,
}

impl ArtifactType {
    /// String representation used in summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Trx => "trx",
            ArtifactType::NewmanHtml => "newman-html",
            ArtifactType::PlaywrightHtml => "playwright-html",
            ArtifactType::Screenshot => "screenshot",
            ArtifactType::Video => "video",
            ArtifactType::Har => "har",
            ArtifactType::Report => "report",
            ArtifactType::Log => "log",
            ArtifactType::Other => "other",
        }
    }

    /// Classify a file by its name alone.
    ///
    /// The first matching rule wins; file content is never inspected.
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.to_lowercase();
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension {
            "trx" => ArtifactType::Trx,
            "html" if name.contains("newman") => ArtifactType::NewmanHtml,
            "html" if name.contains("playwright") => ArtifactType::PlaywrightHtml,
            ext if IMAGE_EXTENSIONS.contains(&ext) => ArtifactType::Screenshot,
            ext if VIDEO_EXTENSIONS.contains(&ext) => ArtifactType::Video,
            "har" => ArtifactType::Har,
            "json" | "xml" => ArtifactType::Report,
            "log" => ArtifactType::Log,
            _ => ArtifactType::Other,
        }
    }

    /// Prefix used for metric keys, for the types that carry test metrics.
    pub fn parser_prefix(&self) -> Option<&'static str> {
        match self {
            ArtifactType::Trx => Some("trx"),
            ArtifactType::NewmanHtml => Some("newman"),
            ArtifactType::PlaywrightHtml => Some("playwright"),
            _ => None,
        }
    }
}

impl std::fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalogued file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// File name
    pub name: String,
    /// Path as discovered under the workspace
    pub path: PathBuf,
    pub size_bytes: u64,
    /// SHA-256 hex digest, or "unknown" when the file could not be read
    pub checksum: String,
    #[serde(rename = "type")]
    pub artifact_type: ArtifactType,
    /// Last modification time of the file
    pub created_at: DateTime<Utc>,
    /// Type-specific details (dimensions, entry counts, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, JsonValue>,
}

impl ArtifactInfo {
    /// Key under which this artifact's parsed metrics are stored.
    pub fn metric_key(&self) -> Option<String> {
        self.artifact_type
            .parser_prefix()
            .map(|prefix| format!("{}_{}", prefix, self.name))
    }
}
