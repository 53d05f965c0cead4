use crate::error::{AppError, Result};
use crate::matcher::IgnoreMatcher;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log;
use std::path::Path;

// The active exclusion rules at one point of the traversal: the stack of
// per-directory ignore matchers from the root down, the built-in name
// exclusions, and the user exclude globs. Layers are strictly additive; a
// deeper ignore file cannot re-include what an ancestor excluded.
#[derive(Debug)]
pub struct RuleChain {
    ignore_filename: String,
    builtin_names: Vec<String>,
    exclude_set: GlobSet,
    layers: Vec<IgnoreMatcher>,
}

impl RuleChain {
    pub fn new(
        ignore_filename: &str,
        builtin_names: Vec<String>,
        exclude_patterns: &[String],
    ) -> Result<Self> {
        let exclude_set = build_exclude_globs(exclude_patterns)?;
        Ok(Self {
            ignore_filename: ignore_filename.to_string(),
            builtin_names,
            exclude_set,
            layers: Vec::new(),
        })
    }

    pub fn ignore_filename(&self) -> &str {
        &self.ignore_filename
    }

    pub fn push_layer(&mut self, matcher: IgnoreMatcher) {
        log::trace!("Pushing ignore layer for {}", matcher.base().display());
        self.layers.push(matcher);
    }

    pub fn pop_layer(&mut self) -> Option<IgnoreMatcher> {
        self.layers.pop()
    }

    // Built-in names first, then every active ignore layer against the
    // candidate relativized to that layer's base, then the user exclude
    // globs against the root-relative path. A match anywhere excludes.
    pub fn is_excluded(&self, abs_path: &Path, rel_path: &Path, is_dir: bool) -> bool {
        if let Some(name) = abs_path.file_name().and_then(|n| n.to_str()) {
            if self.builtin_names.iter().any(|b| b == name) {
                log::trace!("Path excluded by built-in rule: {}", rel_path.display());
                return true;
            }
        }

        for layer in &self.layers {
            if let Ok(layer_rel) = abs_path.strip_prefix(layer.base()) {
                if layer.is_ignored(layer_rel, is_dir) {
                    log::trace!(
                        "Path excluded by ignore file in {}: {}",
                        layer.base().display(),
                        rel_path.display()
                    );
                    return true;
                }
            }
        }

        if self.exclude_set.is_match(rel_path)
            || (is_dir && self.exclude_set.is_match(rel_path.join("dummy_file_for_dir_match")))
        {
            log::trace!(
                "Path excluded by explicit exclude set: {}",
                rel_path.display()
            );
            return true;
        }

        false
    }
}

// A trailing `/` marks a directory pattern and is expanded so the
// directory's contents match too. Unlike ignore-file lines, a bad pattern
// here is a hard error: the user asked for it explicitly.
pub fn build_exclude_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        let mut processed_pattern = pattern_str.trim().to_string();
        if processed_pattern.ends_with('/') && processed_pattern.len() > 1 {
            processed_pattern.push_str("**");
        }
        match Glob::new(&processed_pattern) {
            Ok(glob) => {
                log::trace!(
                    "Adding exclude pattern: {} (processed as {})",
                    pattern_str,
                    processed_pattern
                );
                builder.add(glob);
            }
            Err(e) => {
                log::error!("Invalid exclude pattern \"{}\": {}", pattern_str, e);
                return Err(AppError::Glob(format!(
                    "Invalid exclude pattern \"{}\" (processed as \"{}\"): {}",
                    pattern_str, processed_pattern, e
                )));
            }
        }
    }
    builder.build().map_err(|e| {
        log::error!("Error building exclude glob set: {}", e);
        AppError::Glob(e.to_string())
    })
}
