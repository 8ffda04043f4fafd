//! Calorie breakdown
//!
//! Calories attributed to each macronutrient, recomputed from grams. This
//! can disagree with the logged calorie figure and is only used for the
//! breakdown chart.

use serde::Serialize;

use crate::models::Macros;

pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CalorieBreakdown {
    pub protein_kcal: f64,
    pub carbs_kcal: f64,
    pub fat_kcal: f64,
}

/// One slice of the breakdown chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownSlice {
    pub label: &'static str,
    pub kcal: f64,
    /// Share of the macro-derived total, 0-100, one decimal
    pub percent: f64,
}

impl CalorieBreakdown {
    /// Nothing to chart
    pub fn is_empty(&self) -> bool {
        self.total_kcal() == 0.0
    }

    pub fn total_kcal(&self) -> f64 {
        self.protein_kcal + self.carbs_kcal + self.fat_kcal
    }

    /// Protein, carbs, fat slices with their share of the total
    pub fn slices(&self) -> Vec<BreakdownSlice> {
        let total = self.total_kcal();
        [
            ("Protein", self.protein_kcal),
            ("Carbs", self.carbs_kcal),
            ("Fat", self.fat_kcal),
        ]
        .into_iter()
        .map(|(label, kcal)| BreakdownSlice {
            label,
            kcal,
            percent: super::percentage(kcal, total),
        })
        .collect()
    }
}

pub fn calorie_breakdown(totals: &Macros) -> CalorieBreakdown {
    CalorieBreakdown {
        protein_kcal: totals.protein * KCAL_PER_GRAM_PROTEIN,
        carbs_kcal: totals.carbs * KCAL_PER_GRAM_CARBS,
        fat_kcal: totals.fat * KCAL_PER_GRAM_FAT,
    }
}
