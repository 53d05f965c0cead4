use crate::error::{AppError, Result};
use log;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILENAME: &str = ".chunky.toml";
pub const DEFAULT_IGNORE_FILENAME: &str = ".chunkyignore";
pub const DEFAULT_OUTPUT_DIR: &str = "chunkies";
pub const DEFAULT_OUTPUT_PREFIX: &str = "chunk";
pub const DEFAULT_CHUNK_COUNT: usize = 2;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub walk: WalkConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_chunk_count")]
    pub chunks: usize,
    #[serde(default = "default_output_prefix")]
    pub prefix: String,
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WalkConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_chunk_count() -> usize {
    DEFAULT_CHUNK_COUNT
}
fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}
fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            walk: WalkConfig::default(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chunks: default_chunk_count(),
            prefix: default_output_prefix(),
            dir: default_output_dir(),
        }
    }
}

impl Config {
    // Tilde expansion first so `~/projects` works from configs and shells
    // that do not expand it themselves.
    pub fn determine_root(folder: &Path) -> Result<PathBuf> {
        let expanded = shellexpand::tilde(&folder.to_string_lossy()).to_string();
        let path_to_resolve = PathBuf::from(expanded);

        let root = path_to_resolve.canonicalize().map_err(|e| {
            AppError::InvalidArgument(format!(
                "Folder '{}' cannot be resolved: {}",
                path_to_resolve.display(),
                e
            ))
        })?;

        if !root.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Folder '{}' is not a directory.",
                root.display()
            )));
        }
        Ok(root)
    }

    pub fn resolve_config_path(
        root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let expanded = shellexpand::tilde(p_str);
                let mut path = PathBuf::from(expanded.as_ref());
                if path.is_relative() {
                    path = root.join(path);
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        toml::from_str::<Config>(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn effective_chunks(&self, cli_chunks: Option<usize>) -> usize {
        cli_chunks.unwrap_or(self.output.chunks)
    }

    pub fn effective_prefix(&self, cli_prefix: Option<&String>) -> String {
        cli_prefix.cloned().unwrap_or_else(|| self.output.prefix.clone())
    }

    pub fn effective_output_dir(&self, cli_dir: Option<&String>) -> String {
        cli_dir.cloned().unwrap_or_else(|| self.output.dir.clone())
    }

    // CLI excludes replace the config list entirely when given.
    pub fn effective_excludes(&self, cli_excludes: &[String]) -> Vec<String> {
        if cli_excludes.is_empty() {
            self.walk.exclude.clone()
        } else {
            cli_excludes.to_vec()
        }
    }
}

// Names excluded from traversal at every directory: the tool's own output
// folder plus its rule and config files. Applied independently of any
// user-authored ignore rules so a run never ingests its own output.
pub fn builtin_exclusions(output_dir_name: &str) -> Vec<String> {
    vec![
        output_dir_name.to_string(),
        DEFAULT_IGNORE_FILENAME.to_string(),
        DEFAULT_CONFIG_FILENAME.to_string(),
    ]
}

// A chunk count of zero is representable in TOML, so the merged value is
// checked here even though the CLI parser already rejects `0`.
pub fn validate_chunk_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(AppError::InvalidArgument(
            "Chunk count must be at least 1.".to_string(),
        ));
    }
    Ok(())
}
