use crate::error::{AppError, Result};
use crate::matcher::IgnoreMatcher;
use crate::rules::RuleChain;
use log;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

// One included file, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    pub index: usize,
}

// The ordered file list plus every non-fatal problem met along the way.
// Warnings never abort a walk; callers report them after the fact.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<FileEntry>,
    pub warnings: Vec<AppError>,
}

// Depth-first walk in file-name order, each subdirectory fully expanded in
// place. The chunk assignment downstream depends on this order being
// reproducible on an unchanged tree. Each directory's own ignore file is
// layered onto `chain` for the duration of that directory's subtree.
pub fn walk_tree(root: &Path, chain: &mut RuleChain) -> Result<WalkOutcome> {
    log::info!("Walking directory tree: {}", root.display());
    let canonical_root = root.canonicalize().map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to canonicalize root '{}': {}", root.display(), e),
        ))
    })?;

    let mut outcome = WalkOutcome::default();
    let mut visited = HashSet::new();
    visited.insert(canonical_root.clone());

    walk_dir(
        root,
        Path::new(""),
        chain,
        &canonical_root,
        &mut visited,
        &mut outcome,
    );

    log::info!(
        "Walk complete. {} files included, {} warnings.",
        outcome.files.len(),
        outcome.warnings.len()
    );
    Ok(outcome)
}

fn walk_dir(
    dir: &Path,
    rel_dir: &Path,
    chain: &mut RuleChain,
    canonical_root: &Path,
    visited: &mut HashSet<PathBuf>,
    outcome: &mut WalkOutcome,
) {
    let pushed = match IgnoreMatcher::load(dir, chain.ignore_filename()) {
        Ok(Some(matcher)) => {
            log::debug!("Applying ignore file from: {}", dir.display());
            chain.push_layer(matcher);
            true
        }
        Ok(None) => false,
        Err(e) => {
            log::warn!("Skipping unreadable ignore file in {}: {}", dir.display(), e);
            outcome.warnings.push(e);
            false
        }
    };

    let read_dir = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            log::warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            outcome.warnings.push(AppError::DirRead {
                path: dir.to_path_buf(),
                source: e,
            });
            if pushed {
                chain.pop_layer();
            }
            return;
        }
    };

    let mut entries = Vec::new();
    for entry in read_dir {
        match entry {
            Ok(e) => entries.push(e),
            Err(e) => {
                log::warn!("Error reading entry in {}: {}", dir.display(), e);
                outcome.warnings.push(AppError::DirRead {
                    path: dir.to_path_buf(),
                    source: e,
                });
            }
        }
    }
    // Filesystem enumeration order is arbitrary; name order makes the
    // traversal (and with it the chunk assignment) reproducible.
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let rel_path = rel_dir.join(entry.file_name());

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                log::warn!("Cannot determine type of {}: {}", path.display(), e);
                outcome.warnings.push(AppError::FileRead { path, source: e });
                continue;
            }
        };

        if file_type.is_symlink() {
            visit_symlink(
                &path,
                &rel_path,
                chain,
                canonical_root,
                visited,
                outcome,
            );
            continue;
        }

        if file_type.is_dir() {
            if chain.is_excluded(&path, &rel_path, true) {
                continue;
            }
            match path.canonicalize() {
                Ok(canonical) => {
                    if !visited.insert(canonical) {
                        log::debug!(
                            "Skipping already-visited directory: {}",
                            rel_path.display()
                        );
                        continue;
                    }
                }
                Err(e) => {
                    log::warn!("Cannot resolve directory {}: {}", path.display(), e);
                    outcome.warnings.push(AppError::DirRead { path, source: e });
                    continue;
                }
            }
            walk_dir(&path, &rel_path, chain, canonical_root, visited, outcome);
        } else if file_type.is_file() {
            if chain.is_excluded(&path, &rel_path, false) {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => include_file(path, rel_path, metadata.len(), outcome),
                Err(e) => {
                    log::warn!("Cannot read metadata of {}: {}", path.display(), e);
                    outcome.warnings.push(AppError::FileRead { path, source: e });
                }
            }
        } else {
            log::trace!("Skipping non-regular file: {}", rel_path.display());
        }
    }

    if pushed {
        chain.pop_layer();
    }
}

// A symlink is followed only when its canonical target stays inside the
// canonical root. Directory targets go through the visited set so a link
// cycle terminates; a target directory is walked under the link's own
// relative path.
fn visit_symlink(
    path: &Path,
    rel_path: &Path,
    chain: &mut RuleChain,
    canonical_root: &Path,
    visited: &mut HashSet<PathBuf>,
    outcome: &mut WalkOutcome,
) {
    let target = match path.canonicalize() {
        Ok(t) => t,
        Err(e) => {
            log::warn!("Skipping broken symlink {}: {}", rel_path.display(), e);
            outcome.warnings.push(AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
            return;
        }
    };

    if !target.starts_with(canonical_root) {
        log::warn!(
            "Skipping symlink pointing outside the root: {} -> {}",
            rel_path.display(),
            target.display()
        );
        outcome.warnings.push(AppError::Io(std::io::Error::other(format!(
            "Symlink '{}' points outside the root",
            rel_path.display()
        ))));
        return;
    }

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("Cannot read symlink target {}: {}", rel_path.display(), e);
            outcome.warnings.push(AppError::FileRead {
                path: path.to_path_buf(),
                source: e,
            });
            return;
        }
    };

    if metadata.is_dir() {
        if chain.is_excluded(path, rel_path, true) {
            return;
        }
        if !visited.insert(target) {
            log::debug!(
                "Skipping already-visited directory behind symlink: {}",
                rel_path.display()
            );
            return;
        }
        walk_dir(path, rel_path, chain, canonical_root, visited, outcome);
    } else if metadata.is_file() {
        if chain.is_excluded(path, rel_path, false) {
            return;
        }
        include_file(path.to_path_buf(), rel_path.to_path_buf(), metadata.len(), outcome);
    }
}

fn include_file(path: PathBuf, relative_path: PathBuf, size: u64, outcome: &mut WalkOutcome) {
    let index = outcome.files.len();
    log::trace!(
        "Including file [{}]: {} ({} bytes)",
        index,
        relative_path.display(),
        size
    );
    outcome.files.push(FileEntry {
        path,
        relative_path,
        size,
        index,
    });
}
