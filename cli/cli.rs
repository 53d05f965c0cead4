mod cli_args;
mod output;
mod run;

use clap::Parser;
use colored::*;
use log;
use std::process;

use chunky_core::AppError;
use cli_args::Cli;

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run::run_app(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Glob(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::DirRead { .. }) => 2,
                Some(AppError::Ignore(_)) => 2,
                Some(AppError::DirCreation { .. }) => 3,
                Some(AppError::ChunkWrite { .. }) => 3,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                // Wildcard arm required: AppError is non-exhaustive
                Some(_) => 1,
                None => 1, // Other anyhow errors
            };

            // Only print the error if not quiet, or if it's a usage/config
            // problem the user has to act on regardless.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off // Turn off logging completely if quiet
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,  // Default: Show warnings and errors
            1 => log::LevelFilter::Info,  // -v: Show info, warnings, errors
            2 => log::LevelFilter::Debug, // -vv: Show debug, info, warnings, errors
            _ => log::LevelFilter::Trace, // -vvv+: Show all levels
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None) // Keep logs clean
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}
