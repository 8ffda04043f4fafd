//! Shared macro data structure
//!
//! Used across food log entries, recipes, goals, and aggregated totals.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input rejected at the boundary before it can reach aggregation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: MacroKind, value: f64 },

    #[error("{field} cannot be negative, got {value}")]
    Negative { field: MacroKind, value: f64 },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// One of the four tracked macros, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroKind {
    Calories,
    Protein,
    Carbs,
    Fat,
}

impl MacroKind {
    /// Display order shared by progress, captions and charts
    pub const ALL: [MacroKind; 4] = [
        MacroKind::Calories,
        MacroKind::Protein,
        MacroKind::Carbs,
        MacroKind::Fat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroKind::Calories => "calories",
            MacroKind::Protein => "protein",
            MacroKind::Carbs => "carbs",
            MacroKind::Fat => "fat",
        }
    }

    /// Capitalized label for metric headings
    pub fn label(&self) -> &'static str {
        match self {
            MacroKind::Calories => "Calories",
            MacroKind::Protein => "Protein",
            MacroKind::Carbs => "Carbs",
            MacroKind::Fat => "Fat",
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calories plus the three macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Create a new Macros with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MacroKind) -> f64 {
        match kind {
            MacroKind::Calories => self.calories,
            MacroKind::Protein => self.protein,
            MacroKind::Carbs => self.carbs,
            MacroKind::Fat => self.fat,
        }
    }

    pub fn is_zero(&self) -> bool {
        MacroKind::ALL.iter().all(|k| self.get(*k) == 0.0)
    }

    /// Add another set of macros to this one
    pub fn add(&self, other: &Macros) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }

    /// Reject negative and non-finite values
    pub fn validate(&self) -> Result<(), ValidationError> {
        for kind in MacroKind::ALL {
            let value = self.get(kind);
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field: kind, value });
            }
            if value < 0.0 {
                return Err(ValidationError::Negative { field: kind, value });
            }
        }
        Ok(())
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros::add(&self, &other)
    }
}

impl std::iter::Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Macros::zero(), |acc, m| acc + m)
    }
}

/// Render an amount without a trailing ".0" for whole numbers
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_macros() {
        let total: Macros = vec![
            Macros::new(100.0, 10.0, 5.0, 2.0),
            Macros::new(250.5, 0.0, 30.0, 8.0),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Macros::new(350.5, 10.0, 35.0, 10.0));
    }

    #[test]
    fn test_empty_sum_is_zero() {
        let total: Macros = std::iter::empty().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn test_validate_rejects_negative() {
        let err = Macros::new(100.0, -1.0, 0.0, 0.0).validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Negative {
                field: MacroKind::Protein,
                value: -1.0
            }
        );
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        assert!(Macros::new(f64::NAN, 0.0, 0.0, 0.0).validate().is_err());
        assert!(Macros::new(0.0, 0.0, f64::INFINITY, 0.0).validate().is_err());
        assert!(Macros::zero().validate().is_ok());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2000.0), "2000");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn test_macro_kind_order() {
        let names: Vec<&str> = MacroKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["calories", "protein", "carbs", "fat"]);
    }
}
