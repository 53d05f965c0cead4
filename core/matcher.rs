use crate::error::{AppError, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

// Compiled ignore patterns for one directory. Patterns use gitignore syntax
// and are interpreted relative to `base`, the directory the ignore file
// lives in; the rule chain relativizes candidate paths before matching.
#[derive(Debug)]
pub struct IgnoreMatcher {
    base: PathBuf,
    matcher: Gitignore,
}

impl IgnoreMatcher {
    // Malformed lines are skipped with a debug log; ignore files are
    // user-authored and best-effort.
    pub fn from_content(base: &Path, content: &str) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(base);
        for line in content.lines() {
            if let Err(e) = builder.add_line(None, line) {
                log::debug!(
                    "Skipping malformed ignore pattern '{}' (base {}): {}",
                    line,
                    base.display(),
                    e
                );
            }
        }
        let matcher = builder.build()?;
        Ok(Self {
            base: base.to_path_buf(),
            matcher,
        })
    }

    // A missing ignore file is the normal case and yields None; an
    // unreadable or non-UTF-8 one is an error the caller downgrades to a
    // traversal warning.
    pub fn load(dir: &Path, ignore_filename: &str) -> Result<Option<Self>> {
        let path = dir.join(ignore_filename);
        match fs::read_to_string(&path) {
            Ok(content) => {
                log::trace!("Loaded ignore file: {}", path.display());
                Ok(Some(Self::from_content(dir, &content)?))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::FileRead { path, source: e }),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    // Whitelist lines within the same file override earlier ignore lines,
    // as gitignore defines.
    pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(rel_path, is_dir).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(content: &str) -> IgnoreMatcher {
        IgnoreMatcher::from_content(Path::new("/project"), content).unwrap()
    }

    #[test]
    fn wildcard_matches_at_any_depth() {
        let m = matcher("*.log\n");
        assert!(m.is_ignored(Path::new("debug.log"), false));
        assert!(m.is_ignored(Path::new("logs/debug.log"), false));
        assert!(!m.is_ignored(Path::new("logs/report.txt"), false));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let m = matcher("# a comment\n\n*.tmp\n   \n");
        assert!(m.is_ignored(Path::new("scratch.tmp"), false));
        assert!(!m.is_ignored(Path::new("# a comment"), false));
    }

    #[test]
    fn leading_slash_anchors_to_base() {
        let m = matcher("/top.txt\n");
        assert!(m.is_ignored(Path::new("top.txt"), false));
        assert!(!m.is_ignored(Path::new("sub/top.txt"), false));
    }

    #[test]
    fn trailing_slash_matches_directories_only() {
        let m = matcher("build/\n");
        assert!(m.is_ignored(Path::new("build"), true));
        assert!(!m.is_ignored(Path::new("build"), false));
    }

    #[test]
    fn double_star_spans_directories() {
        let m = matcher("docs/**/draft.md\n");
        assert!(m.is_ignored(Path::new("docs/draft.md"), false));
        assert!(m.is_ignored(Path::new("docs/a/b/draft.md"), false));
        assert!(!m.is_ignored(Path::new("notes/draft.md"), false));
    }

    #[test]
    fn negation_within_one_file_wins() {
        let m = matcher("*.log\n!keep.log\n");
        assert!(m.is_ignored(Path::new("debug.log"), false));
        assert!(!m.is_ignored(Path::new("keep.log"), false));
    }

    #[test]
    fn malformed_line_does_not_poison_the_rest() {
        let m = matcher("a[\n*.log\n");
        assert!(m.is_ignored(Path::new("debug.log"), false));
    }

    #[test]
    fn empty_content_matches_nothing() {
        let m = matcher("");
        assert!(!m.is_ignored(Path::new("anything.txt"), false));
        assert!(!m.is_ignored(Path::new("dir"), true));
    }

    #[test]
    fn load_returns_none_for_missing_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let loaded = IgnoreMatcher::load(dir.path(), ".chunkyignore")?;
        assert!(loaded.is_none());
        Ok(())
    }

    #[test]
    fn load_reads_existing_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        fs::write(dir.path().join(".chunkyignore"), "*.log\n")?;
        let loaded = IgnoreMatcher::load(dir.path(), ".chunkyignore")?
            .ok_or_else(|| AppError::Config("expected matcher".into()))?;
        assert!(loaded.is_ignored(Path::new("x.log"), false));
        assert_eq!(loaded.base(), dir.path());
        Ok(())
    }

    #[test]
    fn load_rejects_non_utf8_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        fs::write(dir.path().join(".chunkyignore"), [0xff, 0xfe, 0xfd])?;
        let result = IgnoreMatcher::load(dir.path(), ".chunkyignore");
        assert!(matches!(result, Err(AppError::FileRead { .. })));
        Ok(())
    }
}
