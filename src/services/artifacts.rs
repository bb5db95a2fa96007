//! Artifact discovery, checksumming and metadata extraction.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{ArtifactInfo, ArtifactType};

/// Checksum recorded when a file cannot be hashed.
pub const UNKNOWN_CHECKSUM: &str = "unknown";

/// Read size used while hashing.
const HASH_CHUNK_SIZE: usize = 4096;

/// Wildcards never match hidden files or directories.
const SCAN_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Recursively glob `directory` for each pattern and catalogue every regular file.
///
/// Files matched by several patterns appear once; the result is ordered by path.
pub fn scan_artifacts<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> Vec<ArtifactInfo> {
    let mut paths = BTreeSet::new();
    let escaped_root = glob::Pattern::escape(&directory.to_string_lossy());

    for pattern in patterns {
        let pattern = pattern.as_ref().trim_start_matches("./");
        let full_pattern = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);

        let entries = match glob::glob_with(&full_pattern, SCAN_OPTIONS) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Invalid artifact pattern '{}': {}", pattern, e);
                continue;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    paths.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }
    }

    let artifacts: Vec<ArtifactInfo> = paths.into_iter().filter_map(catalogue_file).collect();
    info!(
        "Catalogued {} artifacts under {}",
        artifacts.len(),
        directory.display()
    );
    artifacts
}

/// Build the catalogue entry for one file; `None` if it vanished or is not a file.
pub fn catalogue_file(path: PathBuf) -> Option<ArtifactInfo> {
    let fs_metadata = match std::fs::metadata(&path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return None,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let artifact_type = ArtifactType::from_filename(&name);

    let created_at = fs_metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let checksum = match file_checksum(&path) {
        Ok(sum) => sum,
        Err(e) => {
            warn!("Failed to hash {}: {}", path.display(), e);
            UNKNOWN_CHECKSUM.to_string()
        }
    };

    let metadata = extract_metadata(&path, artifact_type);

    Some(ArtifactInfo {
        name,
        path,
        size_bytes: fs_metadata.len(),
        checksum,
        artifact_type,
        created_at,
        metadata,
    })
}

/// SHA-256 of the file content as lowercase hex.
pub fn file_checksum(path: &Path) -> AppResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Type-specific metadata. Failures leave the map partially filled.
pub fn extract_metadata(path: &Path, artifact_type: ArtifactType) -> BTreeMap<String, JsonValue> {
    let mut metadata = BTreeMap::new();

    match artifact_type {
        ArtifactType::Screenshot => image_metadata(path, &mut metadata),
        ArtifactType::Har => har_metadata(path, &mut metadata),
        ArtifactType::Report => report_metadata(path, &mut metadata),
        ArtifactType::Log => log_metadata(path, &mut metadata),
        ArtifactType::Video => {
            if let Some(ext) = path.extension() {
                metadata.insert(
                    "format".to_string(),
                    json!(ext.to_string_lossy().to_lowercase()),
                );
            }
        }
        _ => {}
    }

    metadata
}

fn image_metadata(path: &Path, metadata: &mut BTreeMap<String, JsonValue>) {
    if let Ok(format) = image::ImageFormat::from_path(path) {
        metadata.insert(
            "format".to_string(),
            json!(format!("{:?}", format).to_lowercase()),
        );
    }

    match image::image_dimensions(path) {
        Ok((width, height)) => {
            metadata.insert("width".to_string(), json!(width));
            metadata.insert("height".to_string(), json!(height));
        }
        Err(e) => debug!("No dimensions for {}: {}", path.display(), e),
    }
}

fn har_metadata(path: &Path, metadata: &mut BTreeMap<String, JsonValue>) {
    let har = match read_json(path) {
        Ok(har) => har,
        Err(e) => {
            debug!("Unreadable HAR {}: {}", path.display(), e);
            return;
        }
    };

    if let Some(version) = har.pointer("/log/version").and_then(|v| v.as_str()) {
        metadata.insert("har_version".to_string(), json!(version));
    }
    if let Some(entries) = har.pointer("/log/entries").and_then(|v| v.as_array()) {
        metadata.insert("entry_count".to_string(), json!(entries.len()));
    }
}

fn report_metadata(path: &Path, metadata: &mut BTreeMap<String, JsonValue>) {
    metadata.insert("parsed_at".to_string(), json!(Utc::now().to_rfc3339()));

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        metadata.insert("valid_json".to_string(), json!(read_json(path).is_ok()));
    }
}

fn log_metadata(path: &Path, metadata: &mut BTreeMap<String, JsonValue>) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Unreadable log {}: {}", path.display(), e);
            return;
        }
    };

    let text = String::from_utf8_lossy(&bytes);
    let error_lines = text
        .lines()
        .filter(|line| line.to_ascii_uppercase().contains("ERROR"))
        .count();
    metadata.insert("line_count".to_string(), json!(text.lines().count()));
    metadata.insert("error_lines".to_string(), json!(error_lines));
}

fn read_json(path: &Path) -> AppResult<JsonValue> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}
