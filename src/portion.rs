use crate::error::{NutritionError, Result};
use crate::nutrients::NutrientVector;

/// Reference mass that ingredient nutrient data is expressed against.
pub const REFERENCE_GRAMS: f64 = 100.0;

pub fn validate_amount(amount_grams: f64) -> Result<f64> {
    if amount_grams.is_finite() && amount_grams > 0.0 {
        Ok(amount_grams)
    } else {
        Err(NutritionError::InvalidAmount { amount: amount_grams })
    }
}

pub fn validate_portions(portions: f64) -> Result<f64> {
    if portions.is_finite() && portions > 0.0 {
        Ok(portions)
    } else {
        Err(NutritionError::InvalidPortions { portions })
    }
}

/// Converts a per-100g vector into the absolute contribution of `amount_grams`.
///
/// The amount is checked before any arithmetic happens.
pub fn scale(per_100g: &NutrientVector, amount_grams: f64) -> Result<NutrientVector> {
    let grams = validate_amount(amount_grams)?;
    Ok(per_100g.scale(grams / REFERENCE_GRAMS))
}
