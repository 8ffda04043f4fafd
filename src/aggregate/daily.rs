//! Daily totals
//!
//! Filters a user's entries to one calendar day and sums them.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::{Entry, Macros};

/// Sum the macros of every entry dated exactly `day`
///
/// A day without entries yields all-zero totals.
pub fn daily_totals(entries: &[Entry], day: NaiveDate) -> Macros {
    entries
        .iter()
        .filter(|e| e.date == day)
        .map(|e| e.macros)
        .sum()
}

/// Chronological order: date, then time of day with untimed entries last,
/// then insertion id
pub fn chronological(a: &Entry, b: &Entry) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| match (a.time, b.time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Entries dated `day`, in the order they were eaten
pub fn entries_on(entries: &[Entry], day: NaiveDate) -> Vec<&Entry> {
    let mut found: Vec<&Entry> = entries.iter().filter(|e| e.date == day).collect();
    found.sort_by(|a, b| chronological(a, b));
    found
}
