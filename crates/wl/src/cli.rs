//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the wl CLI.

use std::path::PathBuf;

use clap::Parser;

/// wl - Summarise and filter plain-text work logs
///
/// Entries start with `@yyyy-mm-dd`; `+n` records hours and `#n` a ticket.
#[derive(Parser, Debug)]
#[command(name = "wl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Work log file to read
    pub file: PathBuf,

    /// List every matching entry
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not print the duration total
    #[arg(long)]
    pub no_sum: bool,

    /// Include only entries before this date (yyyy-mm-dd)
    #[arg(long, value_name = "DATE")]
    pub before: Option<String>,

    /// Include only entries after this date (yyyy-mm-dd)
    #[arg(long, value_name = "DATE")]
    pub after: Option<String>,

    /// Include only entries that reference this ticket
    #[arg(short, long)]
    pub ticket: Option<String>,

    /// Print entries and the total as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long)]
    pub no_color: bool,

    /// Log pipeline diagnostics to stderr (RUST_LOG overrides the level)
    #[arg(long)]
    pub debug: bool,
}
