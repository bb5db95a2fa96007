//! Summary export to JSON and artifact archival to ZIP.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, error, info, warn};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::{AppError, AppResult};
use crate::models::{ArtifactInfo, ReportSummary};

/// Name of the summary entry inside an archive.
pub const ARCHIVE_SUMMARY_ENTRY: &str = "summary.json";

/// Write the summary as pretty-printed JSON. Returns false on failure.
pub fn export_summary(summary: &ReportSummary, path: &Path) -> bool {
    match write_summary_json(summary, path) {
        Ok(()) => {
            info!("Summary exported to {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to export summary to {}: {}", path.display(), e);
            false
        }
    }
}

fn write_summary_json(summary: &ReportSummary, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &summary.to_document())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a ZIP with the summary plus every artifact still on disk, stored at
/// its path relative to `workspace`. Returns false on failure.
pub fn archive_artifacts(summary: &ReportSummary, workspace: &Path, path: &Path) -> bool {
    match write_archive(summary, workspace, path) {
        Ok(count) => {
            info!(
                "Archived {} artifacts to {}",
                count,
                path.display()
            );
            true
        }
        Err(e) => {
            error!("Failed to archive artifacts to {}: {}", path.display(), e);
            false
        }
    }
}

fn write_archive(summary: &ReportSummary, workspace: &Path, path: &Path) -> AppResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(File::create(path)?);

    zip.start_file(ARCHIVE_SUMMARY_ENTRY, options)?;
    serde_json::to_writer_pretty(&mut zip, &summary.to_document())?;

    let mut entries = HashSet::from([ARCHIVE_SUMMARY_ENTRY.to_string()]);
    let mut archived = 0;

    for artifact in &summary.artifacts {
        let mut source = match File::open(&artifact.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Artifact {} no longer exists", artifact.path.display());
                continue;
            }
            Err(e) => {
                warn!("Cannot archive {}: {}", artifact.path.display(), e);
                continue;
            }
        };

        let entry_name = archive_entry_name(artifact, workspace);
        if !entries.insert(entry_name.clone()) {
            warn!("Duplicate archive entry {}, skipping", entry_name);
            continue;
        }

        zip.start_file(entry_name.as_str(), options)?;
        std::io::copy(&mut source, &mut zip)
            .map_err(|e| AppError::Archive(format!("Failed to add {}: {}", entry_name, e)))?;
        archived += 1;
    }

    zip.finish()?;
    Ok(archived)
}

/// Workspace-relative entry name with forward slashes; the bare file name
/// for artifacts outside the workspace.
fn archive_entry_name(artifact: &ArtifactInfo, workspace: &Path) -> String {
    match artifact.path.strip_prefix(workspace) {
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => artifact.name.clone(),
    }
}
