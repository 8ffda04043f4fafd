//! Macro Tracker tools
//!
//! Tool implementations behind the MCP server. Each takes the database and
//! a per-request context and returns a serializable response.

pub mod charts;
pub mod dashboard;
pub mod food_log;
pub mod goals;
pub mod import;
pub mod recipes;
pub mod session;
pub mod status;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::db::DbError;
use crate::models::ValidationError;

/// Tool failure, mapped onto MCP errors by the server
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] DbError),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        tracing::warn!(error = %err, "Rejected input");
        ToolError::InvalidInput(err.to_string())
    }
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str) -> ToolResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ToolError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()))
    })
}

/// Parse a clock time written as "h:mm AM/PM", "HH:MM" or "HH:MM:SS"
pub fn parse_time(raw: &str) -> ToolResult<NaiveTime> {
    let raw = raw.trim();
    let upper = raw.to_uppercase();
    ["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&upper, fmt).ok())
        .ok_or_else(|| {
            ToolError::InvalidInput(format!("Invalid time '{}', expected h:mm AM/PM or HH:MM", raw))
        })
}

/// Trim a free-text label, rejecting an empty one
pub(crate) fn required_label(raw: &str, what: &'static str) -> Result<String, ValidationError> {
    let label = raw.trim();
    if label.is_empty() {
        return Err(ValidationError::Empty(what));
    }
    Ok(label.to_string())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MacroKind, Macros};

    #[test]
    fn test_required_label() {
        assert_eq!(required_label("  Oatmeal ", "food").unwrap(), "Oatmeal");
        assert_eq!(
            required_label("   ", "food").unwrap_err(),
            ValidationError::Empty("food")
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(" 2025-06-10 ").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
        );
        assert!(matches!(parse_date("06/10/2025"), Err(ToolError::InvalidInput(_))));
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_parse_time_formats() {
        let expected = NaiveTime::from_hms_opt(14, 5, 0).unwrap();
        assert_eq!(parse_time("2:05 PM").unwrap(), expected);
        assert_eq!(parse_time("2:05 pm").unwrap(), expected);
        assert_eq!(parse_time("02:05PM").unwrap(), expected);
        assert_eq!(parse_time("14:05").unwrap(), expected);
        assert_eq!(parse_time("14:05:00").unwrap(), expected);
        assert_eq!(
            parse_time("12:10 AM").unwrap(),
            NaiveTime::from_hms_opt(0, 10, 0).unwrap()
        );
        assert!(parse_time("lunch").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_validation_maps_to_invalid_input() {
        let err: ToolError = Macros::new(-1.0, 0.0, 0.0, 0.0).validate().unwrap_err().into();
        match err {
            ToolError::InvalidInput(msg) => assert!(msg.contains(MacroKind::Calories.as_str())),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
