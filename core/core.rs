pub mod assign;
pub mod config;
pub mod error;
pub mod matcher;
pub mod report;
pub mod rules;
pub mod walk;
pub mod writer;

pub use assign::{Chunk, ChunkManifest, assign_chunks};
pub use config::{
    Config, DEFAULT_CHUNK_COUNT, DEFAULT_CONFIG_FILENAME, DEFAULT_IGNORE_FILENAME,
    DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_PREFIX, builtin_exclusions, validate_chunk_count,
};
pub use error::{AppError, Result};
pub use matcher::IgnoreMatcher;
pub use report::{ChunkSummary, RunReport};
pub use rules::{RuleChain, build_exclude_globs};
pub use walk::{FileEntry, WalkOutcome, walk_tree};
pub use writer::{WriteReport, WrittenChunk, write_chunks};
