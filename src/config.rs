//! Runtime configuration
//!
//! Read from the environment (and a `.env` file when present).

use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;

pub const DATABASE_PATH_VAR: &str = "MACRO_TRACKER_DATABASE_PATH";
pub const TIMEZONE_VAR: &str = "MACRO_TRACKER_TIMEZONE";
pub const DEFAULT_TIMEZONE: &str = "US/Eastern";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown time zone '{0}' (expected an IANA name such as America/New_York)")]
    UnknownTimezone(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    /// Zone that decides what "today" and "now" mean
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Build from any key lookup, so tests don't have to touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let zone_name = lookup(TIMEZONE_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = parse_timezone(&zone_name)?;

        Ok(Self {
            database_path,
            timezone,
        })
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// `data/macro_tracker.db` beside the project root
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("macro_tracker.db");
    path
}
