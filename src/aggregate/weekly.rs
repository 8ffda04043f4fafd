//! Weekly rollup
//!
//! Sums the seven calendar days ending at a given day and lays them out in a
//! fixed Sunday-first column order.
//!
//! The window is rolling (`end - 6 ..= end`) but the columns are keyed by
//! weekday label, so a window that does not start on Sunday still renders
//! starting at the "Sun" column. Each bucket carries its actual date so a
//! caller can show where the window wraps.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::{Entry, Macros};

/// Column order of the weekly display
pub const WEEK_ORDER: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub const WINDOW_DAYS: u64 = 7;

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Totals for one day of the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBucket {
    pub label: &'static str,
    pub date: NaiveDate,
    pub totals: Macros,
}

/// Seven zero-filled day buckets in Sun..Sat order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRollup {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: Vec<DayBucket>,
}

impl WeeklyRollup {
    pub fn get(&self, day: Weekday) -> Option<&DayBucket> {
        let label = weekday_label(day);
        self.days.iter().find(|b| b.label == label)
    }

    /// Sum over the whole window
    pub fn totals(&self) -> Macros {
        self.days.iter().map(|b| b.totals).sum()
    }

    /// Highest value of one macro across the week, for chart scaling
    pub fn peak(&self, pick: impl Fn(&Macros) -> f64) -> f64 {
        self.days
            .iter()
            .map(|b| pick(&b.totals))
            .fold(0.0, f64::max)
    }
}

/// Roll up the 7 days ending at `end_day`, inclusive
///
/// A window that would start before `NaiveDate::MIN` is pinned to the first
/// seven representable days.
pub fn weekly_rollup(entries: &[Entry], end_day: NaiveDate) -> WeeklyRollup {
    let window_start = end_day
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);

    let mut by_date: BTreeMap<NaiveDate, Macros> = window_start
        .iter_days()
        .take(WINDOW_DAYS as usize)
        .map(|date| (date, Macros::zero()))
        .collect();
    let window_end = by_date.keys().next_back().copied().unwrap_or(end_day);

    for entry in entries {
        if let Some(total) = by_date.get_mut(&entry.date) {
            *total = *total + entry.macros;
        }
    }

    let days: Vec<DayBucket> = WEEK_ORDER
        .iter()
        .filter_map(|weekday| by_date.iter().find(|(date, _)| date.weekday() == *weekday))
        .map(|(date, totals)| DayBucket {
            label: weekday_label(date.weekday()),
            date: *date,
            totals: *totals,
        })
        .collect();

    tracing::debug!(%window_start, %window_end, "Computed weekly rollup");

    WeeklyRollup {
        window_start,
        window_end,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{day, entry};

    fn labels(rollup: &WeeklyRollup) -> Vec<&'static str> {
        rollup.days.iter().map(|b| b.label).collect()
    }

    #[test]
    fn test_always_seven_buckets_in_sunday_order() {
        // 2025-06-11 is a Wednesday
        let rollup = weekly_rollup(&[], day("2025-06-11"));
        assert_eq!(rollup.days.len(), 7);
        let expected: Vec<&str> = WEEK_ORDER.iter().map(|d| weekday_label(*d)).collect();
        assert_eq!(labels(&rollup), expected);
        assert_eq!(expected[0], "Sun");
        assert!(rollup.days.iter().all(|b| b.totals.is_zero()));
        assert_eq!(rollup.window_start, day("2025-06-05"));
        assert_eq!(rollup.window_end, day("2025-06-11"));
    }

    #[test]
    fn test_window_near_earliest_date_keeps_seven_days() {
        let end = NaiveDate::MIN.checked_add_days(Days::new(2)).unwrap();
        let rollup = weekly_rollup(&[], end);

        assert_eq!(rollup.days.len(), 7);
        assert_eq!(rollup.window_start, NaiveDate::MIN);
        assert_eq!(
            rollup.window_end,
            NaiveDate::MIN.checked_add_days(Days::new(6)).unwrap()
        );
        assert_eq!(labels(&rollup)[0], "Sun");
    }

    #[test]
    fn test_window_wraps_under_fixed_columns() {
        // Window Thu 2025-06-05 ..= Wed 2025-06-11
        let rollup = weekly_rollup(&[], day("2025-06-11"));

        assert_eq!(rollup.get(Weekday::Sun).unwrap().date, day("2025-06-08"));
        assert_eq!(rollup.get(Weekday::Wed).unwrap().date, day("2025-06-11"));
        assert_eq!(rollup.get(Weekday::Thu).unwrap().date, day("2025-06-05"));
        assert_eq!(rollup.get(Weekday::Sat).unwrap().date, day("2025-06-07"));
    }

    #[test]
    fn test_entries_bucket_to_their_weekday() {
        let entries = vec![
            entry(1, "2025-06-05", Macros::new(300.0, 10.0, 20.0, 5.0)), // Thu
            entry(2, "2025-06-05", Macros::new(200.0, 10.0, 20.0, 5.0)), // Thu
            entry(3, "2025-06-08", Macros::new(700.0, 50.0, 80.0, 20.0)), // Sun
            entry(4, "2025-06-11", Macros::new(100.0, 5.0, 5.0, 5.0)),   // Wed
        ];
        let rollup = weekly_rollup(&entries, day("2025-06-11"));

        assert_eq!(
            rollup.get(Weekday::Thu).unwrap().totals,
            Macros::new(500.0, 20.0, 40.0, 10.0)
        );
        assert_eq!(rollup.get(Weekday::Sun).unwrap().totals.calories, 700.0);
        assert_eq!(rollup.get(Weekday::Wed).unwrap().totals.calories, 100.0);
        assert!(rollup.get(Weekday::Mon).unwrap().totals.is_zero());
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let entries = vec![
            entry(1, "2025-06-04", Macros::new(1000.0, 0.0, 0.0, 0.0)), // 7 days back
            entry(2, "2025-06-05", Macros::new(300.0, 0.0, 0.0, 0.0)),
            entry(3, "2025-06-11", Macros::new(400.0, 0.0, 0.0, 0.0)),
            entry(4, "2025-06-12", Macros::new(2000.0, 0.0, 0.0, 0.0)), // after end
        ];
        let rollup = weekly_rollup(&entries, day("2025-06-11"));

        assert_eq!(rollup.totals().calories, 700.0);
    }

    #[test]
    fn test_window_sum_matches_entry_sum() {
        let entries: Vec<Entry> = (0..20)
            .map(|i| {
                let date = day("2025-06-01") + Days::new(i % 14);
                let mut e = entry(i as i64, "2025-06-01", Macros::new(100.0 + i as f64, 1.0, 2.0, 3.0));
                e.date = date;
                e
            })
            .collect();
        let end = day("2025-06-12");
        let rollup = weekly_rollup(&entries, end);

        let expected: f64 = entries
            .iter()
            .filter(|e| e.date >= day("2025-06-06") && e.date <= end)
            .map(|e| e.macros.calories)
            .sum();
        assert_eq!(rollup.days.len(), 7);
        assert_eq!(rollup.totals().calories, expected);
    }

    #[test]
    fn test_window_ending_saturday_is_a_calendar_week() {
        // 2025-06-14 is a Saturday
        let rollup = weekly_rollup(&[], day("2025-06-14"));
        let dates: Vec<NaiveDate> = rollup.days.iter().map(|b| b.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(rollup.days[0].date, day("2025-06-08"));
    }

    #[test]
    fn test_rollup_is_repeatable() {
        let entries = vec![entry(1, "2025-06-10", Macros::new(0.1, 0.2, 0.3, 0.4))];
        assert_eq!(
            weekly_rollup(&entries, day("2025-06-11")),
            weekly_rollup(&entries, day("2025-06-11"))
        );
    }
}
