use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::io::{self, Write};
use std::path::Path;

use chunky_core::{AppError, RunReport};

// --- Public Output Functions ---

// Machine-readable variant: the full run report as pretty JSON on stdout.
pub fn print_json_report(report: &RunReport) -> Result<()> {
    let content = report
        .to_json()
        .context("Failed to serialize run report to JSON")?;
    write_to_stdout(&content)
}

// Dry-run output: a per-chunk table plus the planned file list of every
// chunk, so the distribution can be inspected before anything is written.
pub fn print_plan(report: &RunReport, quiet: bool) {
    if quiet {
        return;
    }
    println!();
    println!("{}", " Chunk Plan (Dry Run) ".green().bold().underline());
    println!("{:<20} {}", "Root:".green(), report.root.cyan());
    println!("{:<20} {}", "Output Dir:".green(), report.output_dir.cyan());
    println!(
        "{:<20} {}",
        "Total Files:".green(),
        report.total_files.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Size:".green(),
        human_size(report.total_bytes).cyan()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Chunk").fg(Color::Green),
        Cell::new("Files").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
    ]);
    for chunk in &report.chunks {
        table.add_row(vec![
            Cell::new(&chunk.file_name).fg(Color::Cyan),
            Cell::new(chunk.file_count).set_alignment(comfy_table::CellAlignment::Right),
            Cell::new(human_size(chunk.bytes))
                .set_alignment(comfy_table::CellAlignment::Right)
                .fg(Color::DarkGrey),
        ]);
    }
    println!("\n{table}");

    for chunk in &report.chunks {
        if let Some(entries) = &chunk.entries {
            print_path_list(&chunk.file_name, entries);
        }
    }
    println!();
}

// Confirmation output after a fully successful run: one line per written
// chunk file followed by a short summary block.
pub fn print_summary(report: &RunReport, quiet: bool) {
    if quiet {
        return;
    }
    for chunk in &report.chunks {
        let path = Path::new(&report.output_dir).join(&chunk.file_name);
        println!(
            "{} Chunk saved to: {} ({} file(s), {})",
            "📦".blue(),
            path.display().to_string().dimmed(),
            chunk.file_count,
            human_size(chunk.bytes)
        );
    }
    println!(
        "{} {} chunk file(s) written to: {}",
        "✅".green(),
        report.chunks.len(),
        report.output_dir.blue()
    );

    println!();
    println!("{}", " Chunking Summary ".green().bold().underline());
    println!("{:<20} {}", "Root:".green(), report.root.cyan());
    println!(
        "{:<20} {}",
        "Chunks:".green(),
        report.chunk_count.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Files:".green(),
        report.total_files.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total Size:".green(),
        human_size(report.total_bytes).cyan()
    );
}

// Non-fatal problems collected during the walk and the write phase go to
// stderr so they never mix with machine-readable stdout.
pub fn print_warnings(warnings: &[AppError], quiet: bool) {
    if warnings.is_empty() || quiet {
        return;
    }
    eprintln!(
        "{}",
        "⚠️ Warning: Problems encountered during the run:".yellow()
    );
    for warning in warnings {
        eprintln!(" - {}", warning);
    }
    eprintln!("---");
}

// --- Internal Helpers ---

fn print_path_list(title: &str, paths: &[String]) {
    println!(
        "{}",
        format!("\n--- {} ---", title).green().bold().underline()
    );
    if paths.is_empty() {
        println!("{}", "(no files)".dimmed());
    } else {
        paths.iter().for_each(|p| println!("- {}", p.cyan()));
    }
}

fn human_size(bytes: u64) -> String {
    let byte = Byte::from_u128(bytes as u128).unwrap_or_default();
    byte.get_appropriate_unit(UnitType::Binary).to_string()
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
