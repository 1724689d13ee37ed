//! Output consumers for the filtered entry stream.
//!
//! - [`Printer`] - writes each entry (the `--verbose` listing)
//! - [`Adder`] - sums durations and writes the total at the end
//! - [`helpers`] - shared formatting

pub mod helpers;

use std::io::Write;

use serde::Serialize;
use worklog::WorkEntry;

use helpers::{format_duration, format_entry};

/// A receiver of filtered entries.
///
/// `process` is called once per entry in stream order and `end` once after
/// the stream completed.
pub trait EntryProcessor {
    /// Handles one entry.
    fn process(&mut self, entry: &WorkEntry, out: &mut dyn Write) -> std::io::Result<()>;

    /// Handles the end of the stream.
    fn end(&mut self, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Writes one line per entry.
#[derive(Debug)]
pub struct Printer {
    json: bool,
    use_colors: bool,
    /// chrono format for the date column; JSON keeps ISO dates.
    date_format: String,
}

impl Printer {
    /// Creates a printer.
    pub fn new(json: bool, use_colors: bool, date_format: impl Into<String>) -> Self {
        Self {
            json,
            use_colors,
            date_format: date_format.into(),
        }
    }
}

impl EntryProcessor for Printer {
    fn process(&mut self, entry: &WorkEntry, out: &mut dyn Write) -> std::io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, entry)?;
            writeln!(out)
        } else {
            writeln!(
                out,
                "{}",
                format_entry(entry, &self.date_format, self.use_colors)
            )
        }
    }

    fn end(&mut self, _out: &mut dyn Write) -> std::io::Result<()> {
        Ok(())
    }
}

/// JSON output structure for the duration total.
#[derive(Serialize)]
struct SumOutput {
    sum_duration: f64,
}

/// Sums entry durations.
#[derive(Debug)]
pub struct Adder {
    json: bool,
    total: f64,
}

impl Adder {
    /// Creates an adder with a zero total.
    pub fn new(json: bool) -> Self {
        Self { json, total: 0.0 }
    }

    /// Returns the running total.
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl EntryProcessor for Adder {
    fn process(&mut self, entry: &WorkEntry, _out: &mut dyn Write) -> std::io::Result<()> {
        self.total += entry.duration;
        Ok(())
    }

    fn end(&mut self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.json {
            let output = SumOutput {
                sum_duration: self.total,
            };
            serde_json::to_writer(&mut *out, &output)?;
            writeln!(out)
        } else {
            writeln!(out, "sum of duration: {}", format_duration(self.total))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use worklog::DEFAULT_DATE_FORMAT;

    fn entry(day: u32, duration: f64) -> WorkEntry {
        WorkEntry {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            duration,
            body: "work".to_string(),
            tickets: vec!["1".to_string()],
        }
    }

    fn run(processor: &mut dyn EntryProcessor, entries: &[WorkEntry]) -> String {
        let mut out = Vec::new();
        for e in entries {
            processor.process(e, &mut out).unwrap();
        }
        processor.end(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_printer_plain() {
        let output = run(
            &mut Printer::new(false, false, DEFAULT_DATE_FORMAT),
            &[entry(1, 1.5), entry(2, 2.0)],
        );
        assert_eq!(
            output,
            "2023-01-01 1.5 work [1]\n2023-01-02 2 work [1]\n"
        );
    }

    #[test]
    fn test_printer_uses_configured_date_format() {
        let output = run(&mut Printer::new(false, false, "%Y/%m/%d"), &[entry(5, 2.0)]);
        assert_eq!(output, "2023/01/05 2 work [1]\n");
    }

    #[test]
    fn test_printer_json_lines() {
        let output = run(&mut Printer::new(true, false, DEFAULT_DATE_FORMAT), &[entry(1, 1.5)]);
        let value: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(value["date"], "2023-01-01");
        assert_eq!(value["duration"], 1.5);
        assert_eq!(value["tickets"][0], "1");
    }

    #[test]
    fn test_adder_sums_and_reports_once() {
        let mut adder = Adder::new(false);
        let output = run(&mut adder, &[entry(1, 1.5), entry(2, 3.5)]);
        assert_eq!(adder.total(), 5.0);
        assert_eq!(output, "sum of duration: 5\n");
    }

    #[test]
    fn test_adder_empty_stream() {
        let output = run(&mut Adder::new(false), &[]);
        assert_eq!(output, "sum of duration: 0\n");
    }

    #[test]
    fn test_adder_json() {
        let output = run(&mut Adder::new(true), &[entry(1, 0.25)]);
        assert_eq!(output, "{\"sum_duration\":0.25}\n");
    }
}
