use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Distribute the files of a directory tree across balanced chunk files.",
    long_about = "chunky walks a directory tree, honors per-directory .chunkyignore rules, and \npacks every included file whole into N output chunks balanced by total size. \nEach chunk file wraps the original contents in markers naming their paths.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  chunky ./project\n  chunky ./project -c 4 --output-prefix part\n  chunky ./project --exclude '*.lock' --exclude 'target/' --dry-run\n  chunky ./project -f json -q",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(value_name = "FOLDER", help = "Directory to walk and chunk.")]
    pub folder: PathBuf,

    #[arg(
        short = 'c',
        long,
        value_name = "N",
        value_parser = parse_chunk_count,
        help = "Number of output chunks [default: 2].",
        help_heading = "Chunking"
    )]
    pub chunks: Option<usize>,

    #[arg(
        long,
        value_name = "PREFIX",
        help = "Chunk file name prefix [default: chunk].",
        help_heading = "Chunking"
    )]
    pub output_prefix: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Output directory under FOLDER [default: chunkies].",
        help_heading = "Chunking"
    )]
    pub output_dir: Option<String>,

    #[arg(
        long,
        value_name = "PATTERN",
        action = clap::ArgAction::Append,
        help = "Exclude glob relative to FOLDER; repeatable, replaces config excludes.",
        help_heading = "Filtering"
    )]
    pub exclude: Vec<String>,

    #[arg(
        long,
        help = "Walk and assign but write nothing; print the planned manifest.",
        help_heading = "Output Control"
    )]
    pub dry_run: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        value_name = "FORMAT",
        help = "Run summary format.",
        help_heading = "Output Control"
    )]
    pub format: OutputFormat,

    #[arg(
        long,
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help = "Path to a TOML config file (default: .chunky.toml in FOLDER).",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        conflicts_with = "config",
        help = "Disable loading any TOML config file.",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_chunk_count(s: &str) -> std::result::Result<usize, String> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid chunk count", s))?;
    if value == 0 {
        Err("Chunk count must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
