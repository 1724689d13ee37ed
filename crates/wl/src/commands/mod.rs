//! Command implementations for the wl CLI.

pub mod config;
pub mod report;

use std::path::PathBuf;

use crate::cli::Cli;
use self::config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The pipeline failed.
    #[error("worklog error: {0}")]
    Worklog(#[from] worklog::WorklogError),

    /// A date flag did not match the configured format.
    #[error("invalid date '{value}' for --{flag} (expected format {format})")]
    InvalidDate {
        /// Flag name without dashes.
        flag: &'static str,
        /// The rejected value.
        value: String,
        /// The expected chrono format.
        format: String,
    },

    /// The input file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    ReadInput {
        /// Path given on the command line.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution: CLI flags merged over the config file.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to list every matching entry.
    pub verbose: bool,
    /// Whether to print the duration total.
    pub sum_duration: bool,
    /// chrono format for `@` markers and date flags.
    pub date_format: String,
}

impl CommandContext {
    /// Creates a command context from CLI arguments and the loaded config.
    ///
    /// Flags can only switch behaviour on (or, for `--no-sum` and
    /// `--no-color`, off) relative to the config file.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some();
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && !no_color_env && config.output.color.unwrap_or(true),
            verbose: cli.verbose || config.output.verbose.unwrap_or(false),
            sum_duration: !cli.no_sum && config.output.sum_duration.unwrap_or(true),
            date_format: config.date_format().to_string(),
        }
    }
}
