//! Goal progress
//!
//! Totals as a percentage of goals, and the caption that lists the goals.

use serde::Serialize;

use crate::models::{format_amount, MacroKind, Macros};

/// Per-macro percentage of goal, rounded to one decimal, uncapped
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Progress {
    pub fn get(&self, kind: MacroKind) -> f64 {
        match kind {
            MacroKind::Calories => self.calories,
            MacroKind::Protein => self.protein,
            MacroKind::Carbs => self.carbs,
            MacroKind::Fat => self.fat,
        }
    }
}

/// `total / goal * 100` rounded to one decimal
///
/// A goal of zero (or below) gives 0, and so does any non-finite result.
pub fn percentage(total: f64, goal: f64) -> f64 {
    if goal.is_nan() || goal <= 0.0 {
        return 0.0;
    }
    let pct = round_one_decimal(total / goal * 100.0);
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Round half to even at one decimal place
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

pub fn compute_progress(totals: &Macros, goals: &Macros) -> Progress {
    Progress {
        calories: percentage(totals.calories, goals.calories),
        protein: percentage(totals.protein, goals.protein),
        carbs: percentage(totals.carbs, goals.carbs),
        fat: percentage(totals.fat, goals.fat),
    }
}

/// "2000 calories, 150 protein, 250 carbs, 70 fat"
pub fn goal_caption(goals: &Macros) -> String {
    MacroKind::ALL
        .iter()
        .map(|kind| format!("{} {}", format_amount(goals.get(*kind)), kind))
        .collect::<Vec<_>>()
        .join(", ")
}
