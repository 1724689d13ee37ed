//! The work entry record produced by the parser.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::parser::DEFAULT_DATE_FORMAT;

/// One dated block of a work log.
///
/// An entry starts at an `@date` marker and collects everything up to the
/// next marker: free text, `+duration` amounts and `#ticket` references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkEntry {
    /// Day the work was done.
    pub date: NaiveDate,

    /// Sum of all durations recorded for the day.
    pub duration: f64,

    /// Free-text description, fragments joined by single spaces.
    pub body: String,

    /// Ticket identifiers in the order they appeared, duplicates kept.
    pub tickets: Vec<String>,
}

impl WorkEntry {
    /// Creates an empty entry for the given day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            duration: 0.0,
            body: String::new(),
            tickets: Vec::new(),
        }
    }

    /// Returns true if the entry references the given ticket.
    pub fn has_ticket(&self, ticket: &str) -> bool {
        self.tickets.iter().any(|t| t == ticket)
    }

    /// Formats the entry as `date duration body [tickets]`, writing the
    /// date with `date_format`.
    ///
    /// # Panics
    ///
    /// Panics if `date_format` is not a valid chrono format string.
    pub fn format_line(&self, date_format: &str) -> String {
        format!(
            "{} {} {} [{}]",
            self.date.format(date_format),
            self.duration,
            self.body,
            self.tickets.join(" ")
        )
    }
}

/// Same as [`WorkEntry::format_line`] with the default date format.
impl fmt::Display for WorkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_line(DEFAULT_DATE_FORMAT))
    }
}
