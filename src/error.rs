use std::fmt;

use thiserror::Error;
use time::Date;

use crate::nutrients::NutrientKey;

/// Which kind of record a failed lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Ingredient,
    Meal,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Ingredient => write!(f, "ingredient"),
            ReferenceKind::Meal => write!(f, "meal"),
        }
    }
}

/// Errors raised by the nutrient computation core.
///
/// Every variant is a hard failure for the call that produced it: no operation
/// returns a partial total alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NutritionError {
    #[error("invalid amount {amount}: must be a finite number of grams greater than zero")]
    InvalidAmount { amount: f64 },

    #[error("invalid portion count {portions}: must be a finite number greater than zero")]
    InvalidPortions { portions: f64 },

    #[error("{kind} {id} could not be resolved")]
    MissingReference { kind: ReferenceKind, id: i64 },

    #[error("unknown nutrient key '{0}'")]
    UnknownNutrientKey(String),

    #[error("macro nutrient {0} is required and cannot be null")]
    MissingMacro(NutrientKey),

    #[error("invalid value {value} for {key}: nutrient values must be finite and non-negative")]
    InvalidNutrientValue { key: NutrientKey, value: f64 },

    #[error("could not build bucket key for {start}: {reason}")]
    BucketKey { start: Date, reason: String },
}

pub type Result<T, E = NutritionError> = std::result::Result<T, E>;
