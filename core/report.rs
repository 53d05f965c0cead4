use crate::assign::ChunkManifest;
use crate::error::Result;
use crate::writer::WriteReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

// Serializable summary of one run, planned or performed. This is the
// machine-readable contract of the JSON output mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub root: String,
    pub output_dir: String,
    pub chunk_count: usize,
    pub total_files: usize,
    pub total_bytes: u64,
    pub dry_run: bool,
    pub chunks: Vec<ChunkSummary>,
    pub warning_count: usize,
    pub generation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSummary {
    pub index: usize,
    pub file_name: String,
    pub file_count: usize,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
}

impl RunReport {
    // Nothing is written on a dry run, so the summaries come straight from
    // the manifest and list the planned relative paths.
    pub fn planned(
        root: &Path,
        output_dir: &Path,
        prefix: &str,
        manifest: &ChunkManifest,
        warning_count: usize,
    ) -> Self {
        let chunks = manifest
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| ChunkSummary {
                index: i + 1,
                file_name: format!("{}_{}.txt", prefix, i + 1),
                file_count: chunk.files.len(),
                bytes: chunk.total_bytes,
                entries: Some(
                    chunk
                        .files
                        .iter()
                        .map(|f| f.relative_path.to_string_lossy().into_owned())
                        .collect(),
                ),
            })
            .collect();

        Self {
            root: root.to_string_lossy().into_owned(),
            output_dir: output_dir.to_string_lossy().into_owned(),
            chunk_count: manifest.chunks.len(),
            total_files: manifest.total_files(),
            total_bytes: manifest.total_bytes(),
            dry_run: true,
            chunks,
            warning_count,
            generation_timestamp: Utc::now(),
        }
    }

    // Built from what the writer actually produced; `walk_warning_count` is
    // folded in so the total covers traversal and write-time warnings.
    pub fn performed(
        root: &Path,
        output_dir: &Path,
        manifest: &ChunkManifest,
        write_report: &WriteReport,
        walk_warning_count: usize,
    ) -> Self {
        let chunks = write_report
            .written
            .iter()
            .map(|w| ChunkSummary {
                index: w.index,
                file_name: w
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| w.path.to_string_lossy().into_owned()),
                file_count: w.file_count,
                bytes: w.bytes,
                entries: None,
            })
            .collect();

        Self {
            root: root.to_string_lossy().into_owned(),
            output_dir: output_dir.to_string_lossy().into_owned(),
            chunk_count: manifest.chunks.len(),
            total_files: manifest.total_files(),
            total_bytes: manifest.total_bytes(),
            dry_run: false,
            chunks,
            warning_count: walk_warning_count + write_report.warnings.len(),
            generation_timestamp: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
