//! Macro aggregation
//!
//! Pure computations over a user's entries and goals: daily totals, goal
//! progress, the weekly rollup and the calorie breakdown. Nothing here
//! touches the database; callers load entries and pass them in.

mod breakdown;
mod daily;
mod progress;
mod weekly;

pub use breakdown::{
    calorie_breakdown, BreakdownSlice, CalorieBreakdown, KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT,
    KCAL_PER_GRAM_PROTEIN,
};
pub use daily::{chronological, daily_totals, entries_on};
pub use progress::{compute_progress, goal_caption, percentage, Progress};
pub use weekly::{weekday_label, weekly_rollup, DayBucket, WeeklyRollup, WEEK_ORDER, WINDOW_DAYS};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveTime};

    use crate::models::{Entry, Macros};

    pub fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn entry(id: i64, date: &str, macros: Macros) -> Entry {
        Entry {
            id,
            user_id: "u1".to_string(),
            date: day(date),
            time: None,
            food: format!("food {}", id),
            macros,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn entry_at(id: i64, date: &str, time: Option<(u32, u32)>) -> Entry {
        Entry {
            time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            ..entry(id, date, Macros::new(100.0, 1.0, 1.0, 1.0))
        }
    }
}
