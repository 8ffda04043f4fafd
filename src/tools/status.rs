//! Macro Tracker Status Tool
//!
//! Runtime status of the service and the usage guide for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Workflow guide for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Macro Tracker Usage

## Session

Every tool except `login`, `tracker_status` and `usage_instructions` takes a
`user_id`. Call `login` with the user's name first; it returns the id and
creates the user on first use. Usernames are case-insensitive.

## Dates and Times

"Today" and "now" come from the server's configured time zone. Do not pass
them in when logging; `log_food` and `log_recipe` stamp the entry with the
local date and time. Dates are `YYYY-MM-DD`; times read as `h:mm AM/PM`.

## Logging Food

1. `log_food` with a food label and calories, protein, carbs and fat.
   All four values are required and must be zero or more.
2. `list_entries` shows a day's entries (today by default), earliest first,
   with the day's totals.
3. `update_entry` changes only the fields given; `delete_entry` removes one.

## Recipes

A recipe is a named macro template with a list of foods. Names are unique
per user and cannot be changed; update the foods or macros instead.
`log_recipe` adds an entry with the recipe's values. Later recipe edits do
not change entries already logged.

## Goals and Progress

- `get_goals` returns the saved targets, or 2000 calories, 150 protein,
  250 carbs and 70 fat when none were saved.
- `set_goals` replaces all four targets at once.
- `dashboard` shows today's totals, percentage of each goal (over 100 is
  possible), the calorie breakdown and the last seven days.
- `weekly_summary` covers the seven days ending at a date. Columns always
  run Sun..Sat; each carries its actual date.

## Calorie Breakdown

Computed from grams (protein x4, carbs x4, fat x9). It can differ from the
logged calorie total, which is never derived from macros.

## Charts and Import

- `export_charts` writes PNG charts into a directory.
- `import_food_log_csv` loads a legacy CSV with the header
  `date,time,food,calories,protein,carbs,fat`. Bad rows are reported and
  skipped.
"#;

/// Runtime status of the Macro Tracker service
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Zone used for "today"
    pub timezone: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    timezone: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, timezone: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            timezone: timezone.into(),
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> TrackerStatus {
        let build_info = BuildInfo::current();

        // Absent until the first write creates the file
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        TrackerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            timezone: self.timezone.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
