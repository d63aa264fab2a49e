//! tdiff - Terminal diff viewer for text and JSON files
//!
//! Compares two files and presents the differences as navigable blocks,
//! either interactively in a TUI or as plain text on stdout. JSON inputs
//! get optional pretty-printing before diffing and a collapsible tree view.

mod config;
mod engine;
mod ingest;
mod json_view;
mod render;
mod session;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::engine::{compute_blocks, DiffOptions};
use crate::ingest::FileContent;
use crate::render::ViewMode;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "tdiff")]
#[command(about = "Compare two text or JSON files in the terminal")]
#[command(version)]
struct Cli {
    /// Original file
    old: PathBuf,

    /// Modified file
    new: PathBuf,

    /// Show only changed lines, dropping unchanged context
    #[arg(short = 'd', long)]
    only_diffs: bool,

    /// Trim leading/trailing whitespace from every line before diffing
    #[arg(short = 'w', long)]
    ignore_whitespace: bool,

    /// Sort lines before diffing (for files with unstable row order)
    #[arg(long)]
    sort_lines: bool,

    /// Number of leading lines kept unsorted when --sort-lines is on
    #[arg(long, default_value_t = 0)]
    header_rows: usize,

    /// Do not pretty-print JSON inputs before diffing
    #[arg(long)]
    no_pretty_json: bool,

    /// Start in split (side-by-side) view
    #[arg(long, conflicts_with = "unified")]
    split: bool,

    /// Start in unified view
    #[arg(long)]
    unified: bool,

    /// Print the diff to stdout instead of opening the TUI
    #[arg(short, long)]
    print: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let view = if cli.split {
        Some(ViewMode::Split)
    } else if cli.unified {
        Some(ViewMode::Unified)
    } else {
        None
    };

    let config = Config::load()?.with_overrides(
        cli.only_diffs,
        cli.ignore_whitespace,
        cli.no_pretty_json,
        view,
    );

    let old = load_side(&cli.old, &cli, &config)?;
    let new = load_side(&cli.new, &cli, &config)?;
    let is_json = old.is_json() || new.is_json();

    let options = DiffOptions {
        show_only_diffs: config.show_only_diffs,
        ignore_whitespace: config.ignore_whitespace,
    };

    if cli.print {
        let blocks = compute_blocks(&old.content, &new.content, &options);
        if blocks.is_empty() {
            println!("The files are identical");
        } else {
            print!("{}", render::unified_text(&blocks));
        }
        return Ok(());
    }

    let session = Session::new(options, config.view);
    tui::run(old, new, is_json, session)
}

/// Load one side and apply the configured preprocessing, in the same
/// order the comparison expects: pretty-print first, then sort.
fn load_side(path: &PathBuf, cli: &Cli, config: &Config) -> Result<FileContent> {
    let mut file = ingest::load_file(path)
        .with_context(|| format!("cannot compare {}", path.display()))?;

    if file.is_json() && config.pretty_print_json {
        file.content = ingest::pretty_print_json(&file.content);
    }
    if cli.sort_lines {
        file.content = ingest::sort_lines(&file.content, cli.header_rows);
    }

    Ok(file)
}
