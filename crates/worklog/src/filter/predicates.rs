//! Stock predicates for [`EntryFilter`](super::EntryFilter).

use chrono::NaiveDate;

use crate::entry::WorkEntry;

/// Matches entries dated strictly before `date`.
pub fn before(date: NaiveDate) -> impl Fn(&WorkEntry) -> bool + Send + Sync + 'static {
    move |entry: &WorkEntry| entry.date < date
}

/// Matches entries dated strictly after `date`.
pub fn after(date: NaiveDate) -> impl Fn(&WorkEntry) -> bool + Send + Sync + 'static {
    move |entry: &WorkEntry| entry.date > date
}

/// Matches entries that reference `ticket`.
pub fn has_ticket(ticket: impl Into<String>) -> impl Fn(&WorkEntry) -> bool + Send + Sync + 'static {
    let ticket = ticket.into();
    move |entry: &WorkEntry| entry.has_ticket(&ticket)
}
