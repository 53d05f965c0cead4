use crate::assign::{Chunk, ChunkManifest};
use crate::error::{AppError, Result};
use log;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

// One successfully written chunk file.
#[derive(Debug, Clone)]
pub struct WrittenChunk {
    pub index: usize,
    pub path: PathBuf,
    pub file_count: usize,
    pub bytes: u64,
}

// Outcome of the write phase. `failures` holds chunks that could not be
// written at all; `warnings` holds source files that vanished or became
// unreadable between the walk and the write.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<WrittenChunk>,
    pub failures: Vec<AppError>,
    pub warnings: Vec<AppError>,
}

impl WriteReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

// Materializes every chunk of the manifest as `<prefix>_<index>.txt`
// (1-based) under `output_dir`, each source file wrapped in START/END
// markers naming its root-relative path. Contents are copied as raw bytes,
// so binary files embed whole. Chunks are written in parallel, one worker
// per chunk file; a failure in one chunk never stops the others. Failing to
// create the output directory is the only fatal error here.
pub fn write_chunks(
    manifest: &ChunkManifest,
    output_dir: &Path,
    prefix: &str,
) -> Result<WriteReport> {
    fs::create_dir_all(output_dir).map_err(|e| AppError::DirCreation {
        path: output_dir.to_path_buf(),
        source: e,
    })?;
    log::info!(
        "Writing {} chunks to {}",
        manifest.chunks.len(),
        output_dir.display()
    );

    let results: Vec<Result<(WrittenChunk, Vec<AppError>)>> = manifest
        .chunks
        .par_iter()
        .enumerate()
        .map(|(i, chunk)| write_one_chunk(i + 1, chunk, output_dir, prefix))
        .collect();

    let mut report = WriteReport::default();
    for result in results {
        match result {
            Ok((written, warnings)) => {
                report.written.push(written);
                report.warnings.extend(warnings);
            }
            Err(e) => {
                log::error!("{}", e);
                report.failures.push(e);
            }
        }
    }
    report.written.sort_by_key(|w| w.index);

    log::info!(
        "Write complete. {} chunks written, {} failed, {} warnings.",
        report.written.len(),
        report.failures.len(),
        report.warnings.len()
    );
    Ok(report)
}

fn write_one_chunk(
    index: usize,
    chunk: &Chunk,
    output_dir: &Path,
    prefix: &str,
) -> Result<(WrittenChunk, Vec<AppError>)> {
    let path = output_dir.join(format!("{}_{}.txt", prefix, index));
    log::debug!(
        "Writing chunk {} ({} files, {} bytes) to {}",
        index,
        chunk.files.len(),
        chunk.total_bytes,
        path.display()
    );

    let chunk_write_err = |e: io::Error| AppError::ChunkWrite {
        index,
        path: path.clone(),
        source: e,
    };

    let file = File::create(&path).map_err(chunk_write_err)?;
    // The create above makes the chunk file canonicalizable; every source is
    // checked against it, since copying the chunk file into itself would
    // append until the disk fills.
    let canonical_chunk = path.canonicalize().map_err(chunk_write_err)?;
    let mut writer = BufWriter::new(file);
    let mut warnings = Vec::new();

    for entry in &chunk.files {
        let rel = entry.relative_path.to_string_lossy();
        write!(writer, "<<<START: {}>>>\n", rel).map_err(chunk_write_err)?;
        let source = if entry.path.canonicalize().is_ok_and(|p| p == canonical_chunk) {
            Err(io::Error::other(
                "refusing to copy the chunk file into itself",
            ))
        } else {
            File::open(&entry.path)
        };
        match source {
            Ok(mut source) => {
                io::copy(&mut source, &mut writer).map_err(chunk_write_err)?;
            }
            Err(e) => {
                log::warn!(
                    "Could not read {} while writing chunk {}: {}",
                    entry.path.display(),
                    index,
                    e
                );
                write!(writer, "[Error reading file: {}]", e).map_err(chunk_write_err)?;
                warnings.push(AppError::FileRead {
                    path: entry.path.clone(),
                    source: e,
                });
            }
        }
        write!(writer, "\n<<<END: {}>>>\n\n", rel).map_err(chunk_write_err)?;
    }
    writer.flush().map_err(chunk_write_err)?;

    Ok((
        WrittenChunk {
            index,
            path,
            file_count: chunk.files.len(),
            bytes: chunk.total_bytes,
        },
        warnings,
    ))
}
