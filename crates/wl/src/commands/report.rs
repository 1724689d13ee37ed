//! Report command implementation.
//!
//! Reads a work log, filters its entries and feeds them to the output
//! processors.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use worklog::filter::{predicates, EntryFilter};
use worklog::{pipeline, ParserConfig};

use super::{CommandContext, CommandError, Result};
use crate::cli::Cli;
use crate::output::{Adder, EntryProcessor, Printer};

/// Options for the report command.
#[derive(Debug, Default)]
pub struct ReportOptions {
    /// Work log file.
    pub file: PathBuf,
    /// Keep entries strictly before this date.
    pub before: Option<String>,
    /// Keep entries strictly after this date.
    pub after: Option<String>,
    /// Keep entries that reference this ticket.
    pub ticket: Option<String>,
}

impl From<&Cli> for ReportOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            file: cli.file.clone(),
            before: cli.before.clone(),
            after: cli.after.clone(),
            ticket: cli.ticket.clone(),
        }
    }
}

/// Executes the report command, writing to stdout.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a date flag is invalid, or
/// the pipeline fails.
pub async fn execute(ctx: &CommandContext, opts: &ReportOptions) -> Result<()> {
    let input = fs::read_to_string(&opts.file).map_err(|source| CommandError::ReadInput {
        path: opts.file.clone(),
        source,
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report(ctx, opts, input, &mut out).await?;
    out.flush()?;
    Ok(())
}

/// Runs the pipeline over `input` and writes processor output to `out`.
pub async fn report<W: Write>(
    ctx: &CommandContext,
    opts: &ReportOptions,
    input: String,
    out: &mut W,
) -> Result<()> {
    let upstream = pipeline::parse(input, ParserConfig::with_date_format(&ctx.date_format));
    let mut filter = EntryFilter::new(upstream);
    add_predicates(&mut filter, ctx, opts)?;
    tracing::debug!(predicates = filter.len(), "starting filter");

    let mut printer = ctx
        .verbose
        .then(|| Printer::new(ctx.json_output, ctx.use_colors, &ctx.date_format));
    let mut adder = ctx.sum_duration.then(|| Adder::new(ctx.json_output));

    let mut entries = filter.start();
    while let Some(entry) = entries.next().await? {
        for processor in processors(&mut printer, &mut adder) {
            processor.process(&entry, &mut *out)?;
        }
    }

    if let Some(adder) = &adder {
        tracing::debug!(total = adder.total(), "stream complete");
    }
    for processor in processors(&mut printer, &mut adder) {
        processor.end(&mut *out)?;
    }
    Ok(())
}

/// Returns the enabled processors, printer first.
fn processors<'a>(
    printer: &'a mut Option<Printer>,
    adder: &'a mut Option<Adder>,
) -> impl Iterator<Item = &'a mut dyn EntryProcessor> {
    let printer = printer.as_mut().map(|p| p as &mut dyn EntryProcessor);
    let adder = adder.as_mut().map(|a| a as &mut dyn EntryProcessor);
    printer.into_iter().chain(adder)
}

/// Builds predicates from the date and ticket options.
fn add_predicates(
    filter: &mut EntryFilter,
    ctx: &CommandContext,
    opts: &ReportOptions,
) -> Result<()> {
    if let Some(value) = &opts.before {
        let date = parse_date_flag("before", value, &ctx.date_format)?;
        filter.add(predicates::before(date));
    }

    if let Some(value) = &opts.after {
        let date = parse_date_flag("after", value, &ctx.date_format)?;
        filter.add(predicates::after(date));
    }

    if let Some(ticket) = &opts.ticket {
        // Accept `--ticket '#200'` as well as `--ticket 200`.
        let ticket = ticket.trim().trim_start_matches(worklog::lexer::TICKET_SIGIL);
        filter.add(predicates::has_ticket(ticket));
    }

    Ok(())
}

/// Parses a date flag value with the configured format.
fn parse_date_flag(flag: &'static str, value: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| CommandError::InvalidDate {
        flag,
        value: value.to_string(),
        format: format.to_string(),
    })
}
