//! Common helper functions for output formatting.

use owo_colors::OwoColorize;
use worklog::WorkEntry;

/// Formats a duration the way the total is reported: no trailing `.0`.
pub fn format_duration(hours: f64) -> String {
    hours.to_string()
}

/// Formats an entry as `date duration body [tickets]`, the date written
/// with `date_format`. Colors never change the text itself.
pub fn format_entry(entry: &WorkEntry, date_format: &str, use_colors: bool) -> String {
    if !use_colors {
        return entry.format_line(date_format);
    }

    let date = entry.date.format(date_format).to_string();
    let tickets = entry.tickets.join(" ");
    format!(
        "{} {} {} [{}]",
        date.cyan(),
        format_duration(entry.duration).yellow(),
        entry.body,
        tickets.dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use worklog::DEFAULT_DATE_FORMAT;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5.0), "5");
        assert_eq!(format_duration(1.5), "1.5");
        assert_eq!(format_duration(0.0), "0");
    }

    #[test]
    fn test_format_entry_without_colors_matches_display() {
        let entry = WorkEntry {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            duration: 3.5,
            body: "wrote code".to_string(),
            tickets: vec!["200".to_string(), "201".to_string()],
        };
        assert_eq!(
            format_entry(&entry, DEFAULT_DATE_FORMAT, false),
            "2023-01-02 3.5 wrote code [200 201]"
        );
        assert_eq!(
            format_entry(&entry, "%d.%m.%Y", false),
            "02.01.2023 3.5 wrote code [200 201]"
        );
    }

    #[test]
    fn test_format_entry_with_colors_keeps_content() {
        let entry = WorkEntry {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            duration: 1.0,
            body: "review".to_string(),
            tickets: vec!["7".to_string()],
        };
        let colored = format_entry(&entry, "%Y/%m/%d", true);
        assert!(colored.contains("2023/01/02"));
        assert!(colored.contains("review"));
        assert!(colored.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_and_plain_tickets_read_the_same() {
        let entry = WorkEntry {
            date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            duration: 1.0,
            body: "review".to_string(),
            tickets: vec!["7".to_string(), "8".to_string()],
        };
        let colored = format_entry(&entry, DEFAULT_DATE_FORMAT, true);
        assert!(colored.contains("7 8"));
        assert!(!colored.contains('#'));
    }
}
