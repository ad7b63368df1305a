use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

use super::key::{NutrientKey, MICRO_COUNT};
use crate::error::{NutritionError, Result};

/// A bundle of nutrient quantities: four macros that are always known, plus
/// vitamins and minerals that may be unknown.
///
/// An unknown micronutrient is `None`. It is not the same thing as a measured
/// zero, and arithmetic keeps the two apart:
///
/// * addition: `Some(a) + Some(b) = Some(a + b)`, `Some(a) + None = Some(a)`,
///   `None + None = None`
/// * scaling: `None * k = None`
///
/// The vector is serialized as a map keyed by nutrient wire names, with `null`
/// for unknown micronutrients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Option<f64>>")]
pub struct NutrientVector {
    pub proteins: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calories: f64,
    micros: [Option<f64>; MICRO_COUNT],
}

impl Default for NutrientVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl NutrientVector {
    /// All macros zero, all micronutrients unknown.
    pub const fn zero() -> Self {
        Self {
            proteins: 0.0,
            carbs: 0.0,
            fats: 0.0,
            calories: 0.0,
            micros: [None; MICRO_COUNT],
        }
    }

    pub const fn macros(proteins: f64, carbs: f64, fats: f64, calories: f64) -> Self {
        Self {
            proteins,
            carbs,
            fats,
            calories,
            micros: [None; MICRO_COUNT],
        }
    }

    /// Builder form of [`set`](Self::set) for a known value.
    pub fn with(mut self, key: NutrientKey, value: f64) -> Self {
        self.set(key, Some(value));
        self
    }

    pub fn get(&self, key: NutrientKey) -> Option<f64> {
        match key {
            NutrientKey::Proteins => Some(self.proteins),
            NutrientKey::Carbs => Some(self.carbs),
            NutrientKey::Fats => Some(self.fats),
            NutrientKey::Calories => Some(self.calories),
            micro => micro.micro_slot().and_then(|slot| self.micros[slot]),
        }
    }

    /// Sets a nutrient. Macros cannot be unknown, so `None` leaves a macro untouched.
    pub fn set(&mut self, key: NutrientKey, value: Option<f64>) {
        match (key, value) {
            (NutrientKey::Proteins, Some(v)) => self.proteins = v,
            (NutrientKey::Carbs, Some(v)) => self.carbs = v,
            (NutrientKey::Fats, Some(v)) => self.fats = v,
            (NutrientKey::Calories, Some(v)) => self.calories = v,
            (micro, value) => {
                if let Some(slot) = micro.micro_slot() {
                    self.micros[slot] = value;
                }
            }
        }
    }

    pub fn is_present(&self, key: NutrientKey) -> bool {
        self.get(key).is_some()
    }

    /// Every key in canonical order with its value.
    pub fn iter(&self) -> impl Iterator<Item = (NutrientKey, Option<f64>)> + '_ {
        NutrientKey::ALL.iter().map(move |&key| (key, self.get(key)))
    }

    /// Multiplies every known value by `factor`. Unknown values stay unknown.
    pub fn scale(&self, factor: f64) -> Self {
        let mut micros = self.micros;
        for slot in micros.iter_mut() {
            *slot = slot.map(|v| v * factor);
        }
        Self {
            proteins: self.proteins * factor,
            carbs: self.carbs * factor,
            fats: self.fats * factor,
            calories: self.calories * factor,
            micros,
        }
    }

    /// Checks that every known value is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(NutritionError::InvalidNutrientValue { key, value: v });
                }
            }
        }
        Ok(())
    }

    /// Field-wise comparison within `tolerance`. Presence must match exactly.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.iter().zip(other.iter()).all(|((_, a), (_, b))| match (a, b) {
            (Some(a), Some(b)) => (a - b).abs() <= tolerance,
            (None, None) => true,
            _ => false,
        })
    }

    /// Whether the four macros agree within `tolerance`, ignoring micronutrients.
    pub fn macros_approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        [
            (self.proteins, other.proteins),
            (self.carbs, other.carbs),
            (self.fats, other.fats),
            (self.calories, other.calories),
        ]
        .iter()
        .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

fn add_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

impl AddAssign<&NutrientVector> for NutrientVector {
    fn add_assign(&mut self, rhs: &NutrientVector) {
        self.proteins += rhs.proteins;
        self.carbs += rhs.carbs;
        self.fats += rhs.fats;
        self.calories += rhs.calories;
        for (slot, other) in self.micros.iter_mut().zip(rhs.micros.iter()) {
            *slot = add_optional(*slot, *other);
        }
    }
}

impl AddAssign for NutrientVector {
    fn add_assign(&mut self, rhs: NutrientVector) {
        *self += &rhs;
    }
}

impl Add for NutrientVector {
    type Output = NutrientVector;

    fn add(mut self, rhs: NutrientVector) -> NutrientVector {
        self += &rhs;
        self
    }
}

impl Add<&NutrientVector> for &NutrientVector {
    type Output = NutrientVector;

    fn add(self, rhs: &NutrientVector) -> NutrientVector {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Mul<f64> for &NutrientVector {
    type Output = NutrientVector;

    fn mul(self, factor: f64) -> NutrientVector {
        self.scale(factor)
    }
}

impl Sum for NutrientVector {
    fn sum<I: Iterator<Item = NutrientVector>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |acc, v| acc + v)
    }
}

impl<'a> Sum<&'a NutrientVector> for NutrientVector {
    fn sum<I: Iterator<Item = &'a NutrientVector>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |mut acc, v| {
            acc += v;
            acc
        })
    }
}

impl Serialize for NutrientVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NutrientKey::ALL.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key.as_str(), &value)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, Option<f64>>> for NutrientVector {
    type Error = NutritionError;

    fn try_from(raw: BTreeMap<String, Option<f64>>) -> Result<Self> {
        let mut vector = NutrientVector::zero();
        let mut seen_macros = [false; 4];

        for (name, value) in raw {
            let key = match name.parse::<NutrientKey>() {
                Ok(key) => key,
                Err(_) => {
                    tracing::debug!(key = %name, "ignoring unknown nutrient key");
                    continue;
                }
            };
            if key.is_macro() {
                let v = value.ok_or(NutritionError::MissingMacro(key))?;
                seen_macros[key as usize] = true;
                vector.set(key, Some(v));
            } else {
                vector.set(key, value);
            }
        }

        for key in NutrientKey::ALL.iter().copied().filter(|k| k.is_macro()) {
            if !seen_macros[key as usize] {
                return Err(NutritionError::MissingMacro(key));
            }
        }

        vector.validate()?;
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_has_no_known_micros() {
        let zero = NutrientVector::zero();
        assert_eq!(zero.get(NutrientKey::Proteins), Some(0.0));
        assert!(NutrientKey::ALL
            .iter()
            .filter(|k| !k.is_macro())
            .all(|k| zero.get(*k).is_none()));
    }

    #[test]
    fn test_addition_presence_rules() {
        let a = NutrientVector::macros(1.0, 2.0, 3.0, 40.0).with(NutrientKey::VitaminC, 5.0);
        let b = NutrientVector::macros(1.0, 0.0, 0.0, 10.0).with(NutrientKey::Iron, 2.0);
        let sum = &a + &b;

        assert_eq!(sum.proteins, 2.0);
        assert_eq!(sum.calories, 50.0);
        assert_eq!(sum.get(NutrientKey::VitaminC), Some(5.0));
        assert_eq!(sum.get(NutrientKey::Iron), Some(2.0));
        assert_eq!(sum.get(NutrientKey::Zinc), None);
    }

    #[test]
    fn test_explicit_zero_survives_addition_and_scaling() {
        let measured_zero = NutrientVector::zero().with(NutrientKey::VitaminD, 0.0);
        let total = (&measured_zero + &NutrientVector::zero()).scale(3.0);
        assert_eq!(total.get(NutrientKey::VitaminD), Some(0.0));
        assert_eq!(total.get(NutrientKey::VitaminA), None);
    }

    #[test]
    fn test_scaling_keeps_unknown_unknown() {
        let v = NutrientVector::macros(10.0, 20.0, 5.0, 165.0).with(NutrientKey::Calcium, 100.0);
        let half = &v * 0.5;
        assert_eq!(half.carbs, 10.0);
        assert_eq!(half.get(NutrientKey::Calcium), Some(50.0));
        assert_eq!(half.get(NutrientKey::Sodium), None);
    }

    #[test]
    fn test_sum_starts_from_zero() {
        let empty: Vec<NutrientVector> = Vec::new();
        assert_eq!(empty.iter().sum::<NutrientVector>(), NutrientVector::zero());
    }

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        let negative = NutrientVector::macros(-1.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            negative.validate(),
            Err(NutritionError::InvalidNutrientValue { key: NutrientKey::Proteins, .. })
        ));
        let nan = NutrientVector::zero().with(NutrientKey::Iron, f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_json_shape_uses_null_for_unknown() {
        let v = NutrientVector::macros(1.0, 2.0, 3.0, 4.0).with(NutrientKey::VitaminC, 0.0);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["proteins"], 1.0);
        assert_eq!(json["vitaminC"], 0.0);
        assert!(json["vitaminA"].is_null());
    }

    #[test]
    fn test_deserialize_requires_macros_and_ignores_unknown_keys() {
        let ok: NutrientVector = serde_json::from_str(
            r#"{"proteins": 1, "carbs": 2, "fats": 3, "calories": 4, "vitaminC": null, "omega3": 2}"#,
        )
        .unwrap();
        assert_eq!(ok.get(NutrientKey::VitaminC), None);
        assert_eq!(ok.fats, 3.0);

        let missing = serde_json::from_str::<NutrientVector>(r#"{"proteins": 1, "carbs": 2, "fats": 3}"#);
        assert!(missing.is_err());

        let negative = serde_json::from_str::<NutrientVector>(
            r#"{"proteins": 1, "carbs": 2, "fats": 3, "calories": 4, "iron": -1}"#,
        );
        assert!(negative.is_err());
    }
}
