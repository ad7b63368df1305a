//! Presentation helpers. Rounding happens here and only here; everything
//! upstream works at full precision.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::nutrients::{NutrientKey, NutrientVector, Unit};
use crate::rda::{Percentage, Severity};

// Atwater energy factors, kcal per gram.
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARB: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds one nutrient value for display: calories to whole kcal, everything
/// else to two decimals.
pub fn round_nutrient(key: NutrientKey, value: f64) -> f64 {
    match key.unit() {
        Unit::Kcal => value.round(),
        _ => round_to(value, 2),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayNutrient {
    pub value: Option<f64>,
    pub unit: Unit,
}

/// A rounded copy of a nutrient vector, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayVector {
    pub nutrients: BTreeMap<NutrientKey, DisplayNutrient>,
}

impl DisplayVector {
    pub fn get(&self, key: NutrientKey) -> Option<f64> {
        self.nutrients.get(&key).and_then(|n| n.value)
    }
}

pub fn round_for_display(vector: &NutrientVector) -> DisplayVector {
    let nutrients = vector
        .iter()
        .map(|(key, value)| {
            (
                key,
                DisplayNutrient {
                    value: value.map(|v| round_nutrient(key, v)),
                    unit: key.unit(),
                },
            )
        })
        .collect();
    DisplayVector { nutrients }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPercentage {
    pub label: String,
    /// One decimal place.
    pub percent: f64,
    /// Decided on the unrounded percentage.
    pub severity: Severity,
}

pub fn round_percentages(report: &BTreeMap<NutrientKey, Percentage>) -> BTreeMap<NutrientKey, DisplayPercentage> {
    report
        .iter()
        .map(|(key, row)| {
            (
                *key,
                DisplayPercentage {
                    label: row.label.clone(),
                    percent: round_to(row.percent, 1),
                    severity: row.severity,
                },
            )
        })
        .collect()
}

/// Share of macro energy coming from each macronutrient, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroBreakdown {
    pub protein_percent: f64,
    pub carbs_percent: f64,
    pub fat_percent: f64,
}

impl MacroBreakdown {
    /// `None` when the macros carry no energy at all.
    pub fn from_vector(vector: &NutrientVector) -> Option<Self> {
        let protein = vector.proteins * KCAL_PER_G_PROTEIN;
        let carbs = vector.carbs * KCAL_PER_G_CARB;
        let fat = vector.fats * KCAL_PER_G_FAT;
        let energy = protein + carbs + fat;
        if energy <= 0.0 {
            return None;
        }
        Some(Self {
            protein_percent: protein * 100.0 / energy,
            carbs_percent: carbs * 100.0 / energy,
            fat_percent: fat * 100.0 / energy,
        })
    }
}
