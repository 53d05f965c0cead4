use anyhow::{Context, Result};
use log;
use std::path::{Path, PathBuf};

use chunky_core::{self as core, AppError, Config, RuleChain, RunReport};

use crate::cli_args::{Cli, OutputFormat};
use crate::output;

pub fn run_app(cli: Cli) -> Result<()> {
    let root = Config::determine_root(&cli.folder).context("Failed to determine target folder")?;
    log::info!("Target folder determined: {}", root.display());

    let config = load_config(&root, &cli).context("Failed to load configuration")?;

    let chunk_count = config.effective_chunks(cli.chunks);
    core::validate_chunk_count(chunk_count)?;
    let prefix = config.effective_prefix(cli.output_prefix.as_ref());
    let output_dir_setting = config.effective_output_dir(cli.output_dir.as_ref());
    let excludes = config.effective_excludes(&cli.exclude);
    log::debug!(
        "Effective settings: chunks={}, prefix='{}', output_dir='{}', {} exclude pattern(s)",
        chunk_count,
        prefix,
        output_dir_setting,
        excludes.len()
    );

    let output_dir = resolve_output_dir(&root, &output_dir_setting)?;
    // Output files from a previous run must never be chunked again, so the
    // output directory's name joins the built-in exclusions.
    let output_dir_name = output_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(core::DEFAULT_OUTPUT_DIR);

    let mut chain = RuleChain::new(
        core::DEFAULT_IGNORE_FILENAME,
        core::builtin_exclusions(output_dir_name),
        &excludes,
    )
    .context("Failed to compile exclude patterns")?;

    log::debug!("Walking directory tree...");
    let outcome = core::walk_tree(&root, &mut chain).context("Failed to walk the target folder")?;
    log::debug!(
        "Walk complete. {} file(s) included, {} warning(s).",
        outcome.files.len(),
        outcome.warnings.len()
    );

    let walk_warnings = outcome.warnings;
    let manifest = core::assign_chunks(outcome.files, chunk_count)
        .context("Failed to assign files to chunks")?;

    if cli.dry_run {
        log::info!("Dry run requested; no chunk files will be written.");
        let report = RunReport::planned(
            &root,
            &output_dir,
            &prefix,
            &manifest,
            walk_warnings.len(),
        );
        match cli.format {
            OutputFormat::Json => output::print_json_report(&report)?,
            OutputFormat::Text => output::print_plan(&report, cli.quiet),
        }
        output::print_warnings(&walk_warnings, cli.quiet);
        return Ok(());
    }

    log::debug!("Writing chunk files to {}...", output_dir.display());
    let write_report = core::write_chunks(&manifest, &output_dir, &prefix)
        .context("Failed to write chunk files")?;

    let report = RunReport::performed(
        &root,
        &output_dir,
        &manifest,
        &write_report,
        walk_warnings.len(),
    );
    // The text summary is a success banner and stays quiet when any chunk
    // failed. The JSON report is the machine contract and prints either way.
    let all_written = write_report.all_succeeded();
    match cli.format {
        OutputFormat::Json => output::print_json_report(&report)?,
        OutputFormat::Text => {
            if all_written {
                output::print_summary(&report, cli.quiet);
            }
        }
    }

    let mut warnings = walk_warnings;
    warnings.extend(write_report.warnings);
    output::print_warnings(&warnings, cli.quiet);

    // Every failed chunk was already logged by the writer; surface the first
    // one so the process exits non-zero.
    if let Some(failure) = write_report.failures.into_iter().next() {
        return Err(anyhow::Error::from(failure).context("One or more chunk files failed"));
    }

    Ok(())
}

fn load_config(root: &Path, cli: &Cli) -> Result<Config> {
    let config_path = Config::resolve_config_path(root, cli.config.as_ref(), cli.no_config)
        .context("Failed to resolve configuration path")?;

    match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn resolve_output_dir(root: &Path, configured: &str) -> core::Result<PathBuf> {
    let path = PathBuf::from(configured);
    let resolved = if path.is_absolute() {
        path
    } else {
        root.join(path)
    };
    // Writing chunks straight into the folder being chunked would feed the
    // previous run's output back into the next walk, so that layout is
    // refused up front. `root` is already canonical.
    if let Ok(canonical) = resolved.canonicalize() {
        if canonical.as_path() == root {
            return Err(AppError::InvalidArgument(format!(
                "Output directory '{}' is the target folder itself; pick a subdirectory or a path outside it.",
                configured
            )));
        }
    }
    log::trace!("Resolved absolute output directory: {}", resolved.display());
    Ok(resolved)
}
