use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NutritionError, Result};
use crate::nutrients::{NutrientKey, NutrientVector, Tier, Unit};

/// Recommended daily value for one nutrient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RdaValue {
    pub value: f64,
    pub unit: Unit,
    pub label: String,
}

/// Reference daily values keyed by nutrient.
///
/// Built once at startup and shared read-only; nothing in the core mutates a
/// table after it has been handed out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RdaTable {
    entries: BTreeMap<NutrientKey, RdaValue>,
}

// (key, daily value in the key's unit)
const VITAMIN_RDA: &[(NutrientKey, f64)] = &[
    (NutrientKey::VitaminA, 900.0),
    (NutrientKey::VitaminD, 20.0),
    (NutrientKey::VitaminE, 15.0),
    (NutrientKey::VitaminK, 120.0),
    (NutrientKey::VitaminC, 90.0),
    (NutrientKey::Thiamin, 1.2),
    (NutrientKey::Riboflavin, 1.3),
    (NutrientKey::Niacin, 16.0),
    (NutrientKey::PantothenicAcid, 5.0),
    (NutrientKey::VitaminB6, 1.7),
    (NutrientKey::Biotin, 30.0),
    (NutrientKey::Folate, 400.0),
    (NutrientKey::VitaminB12, 2.4),
];

const MINERAL_RDA: &[(NutrientKey, f64)] = &[
    (NutrientKey::Calcium, 1000.0),
    (NutrientKey::Iron, 18.0),
    (NutrientKey::Magnesium, 420.0),
    (NutrientKey::Phosphorus, 1250.0),
    (NutrientKey::Potassium, 4700.0),
    (NutrientKey::Sodium, 2300.0),
    (NutrientKey::Zinc, 11.0),
    (NutrientKey::Copper, 0.9),
    (NutrientKey::Manganese, 2.3),
    (NutrientKey::Selenium, 55.0),
    (NutrientKey::Chromium, 35.0),
    (NutrientKey::Molybdenum, 45.0),
    (NutrientKey::Iodine, 150.0),
];

lazy_static! {
    static ref STANDARD_TABLE: RdaTable = {
        let mut table = RdaTable::new();
        for &(key, value) in VITAMIN_RDA.iter().chain(MINERAL_RDA.iter()) {
            table.entries.insert(
                key,
                RdaValue {
                    value,
                    unit: key.unit(),
                    label: key.label().to_string(),
                },
            );
        }
        table
    };
}

impl RdaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adult reference values for every vitamin and mineral.
    pub fn standard() -> &'static RdaTable {
        &STANDARD_TABLE
    }

    /// Adds or replaces a reference value. The unit is always the key's own unit.
    pub fn insert(&mut self, key: NutrientKey, value: f64, label: Option<String>) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(NutritionError::InvalidNutrientValue { key, value });
        }
        self.entries.insert(
            key,
            RdaValue {
                value,
                unit: key.unit(),
                label: label.unwrap_or_else(|| key.label().to_string()),
            },
        );
        Ok(())
    }

    pub fn get(&self, key: NutrientKey) -> Option<&RdaValue> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NutrientKey, &RdaValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn vitamins(&self) -> impl Iterator<Item = (NutrientKey, &RdaValue)> {
        self.iter().filter(|(k, _)| k.tier() == Tier::Vitamin)
    }

    pub fn minerals(&self) -> impl Iterator<Item = (NutrientKey, &RdaValue)> {
        self.iter().filter(|(k, _)| k.tier() == Tier::Mineral)
    }
}

/// Presentation bucket for a percentage of RDA. Thresholds are strict:
/// exactly 90% is `Moderate`, not `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Moderate,
    Low,
    Deficient,
}

impl Severity {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 90.0 {
            Severity::Good
        } else if percent > 50.0 {
            Severity::Moderate
        } else if percent > 25.0 {
            Severity::Low
        } else {
            Severity::Deficient
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Good => "good",
            Severity::Moderate => "moderate",
            Severity::Low => "low",
            Severity::Deficient => "deficient",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentage {
    /// Unclamped; over-consumption shows as more than 100.
    pub percent: f64,
    pub severity: Severity,
    /// Intake in the nutrient's unit, `None` when unknown.
    pub intake: Option<f64>,
    pub rda: f64,
    pub unit: Unit,
    pub label: String,
}

/// Compares `vector` against every nutrient in `table`.
///
/// Unknown intake is reported as 0% so that every row has a number to show.
/// Nutrients that are not in the table get no row.
pub fn percent_of(vector: &NutrientVector, table: &RdaTable) -> BTreeMap<NutrientKey, Percentage> {
    table
        .iter()
        .map(|(key, rda)| {
            let intake = vector.get(key);
            let percent = intake.map_or(0.0, |value| value * 100.0 / rda.value);
            (
                key,
                Percentage {
                    percent,
                    severity: Severity::from_percent(percent),
                    intake,
                    rda: rda.value,
                    unit: rda.unit,
                    label: rda.label.clone(),
                },
            )
        })
        .collect()
}
