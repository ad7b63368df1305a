use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NutritionError;

/// Measurement unit attached to a nutrient. Fixed per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Kcal,
    Mg,
    Mcg,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::G => "g",
            Unit::Kcal => "kcal",
            Unit::Mg => "mg",
            Unit::Mcg => "mcg",
        };
        f.write_str(s)
    }
}

/// The macro/vitamin/mineral partition of the nutrient key set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Macro,
    Vitamin,
    Mineral,
}

macro_rules! nutrient_keys {
    ($( $variant:ident => ($name:literal, $label:literal, $tier:ident, $unit:ident) ),+ $(,)?) => {
        /// Every nutrient the core knows about, in canonical order.
        ///
        /// The first four keys are the macros; the order of the rest defines the
        /// slot layout of [`NutrientVector`](super::NutrientVector).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub enum NutrientKey {
            $( $variant, )+
        }

        impl NutrientKey {
            pub const ALL: &'static [NutrientKey] = &[ $( NutrientKey::$variant, )+ ];

            /// Wire name, as used in CSV headers and JSON documents.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( NutrientKey::$variant => $name, )+
                }
            }

            pub const fn label(self) -> &'static str {
                match self {
                    $( NutrientKey::$variant => $label, )+
                }
            }

            pub const fn tier(self) -> Tier {
                match self {
                    $( NutrientKey::$variant => Tier::$tier, )+
                }
            }

            pub const fn unit(self) -> Unit {
                match self {
                    $( NutrientKey::$variant => Unit::$unit, )+
                }
            }
        }

        impl FromStr for NutrientKey {
            type Err = NutritionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $name => Ok(NutrientKey::$variant), )+
                    other => Err(NutritionError::UnknownNutrientKey(other.to_string())),
                }
            }
        }
    };
}

nutrient_keys! {
    Proteins => ("proteins", "Proteins", Macro, G),
    Carbs => ("carbs", "Carbohydrates", Macro, G),
    Fats => ("fats", "Fats", Macro, G),
    Calories => ("calories", "Calories", Macro, Kcal),

    VitaminA => ("vitaminA", "Vitamin A", Vitamin, Mcg),
    VitaminD => ("vitaminD", "Vitamin D", Vitamin, Mcg),
    VitaminE => ("vitaminE", "Vitamin E", Vitamin, Mg),
    VitaminK => ("vitaminK", "Vitamin K", Vitamin, Mcg),
    VitaminC => ("vitaminC", "Vitamin C", Vitamin, Mg),
    Thiamin => ("thiamin", "Thiamin (B1)", Vitamin, Mg),
    Riboflavin => ("riboflavin", "Riboflavin (B2)", Vitamin, Mg),
    Niacin => ("niacin", "Niacin (B3)", Vitamin, Mg),
    PantothenicAcid => ("pantothenicAcid", "Pantothenic Acid (B5)", Vitamin, Mg),
    VitaminB6 => ("vitaminB6", "Vitamin B6", Vitamin, Mg),
    Biotin => ("biotin", "Biotin (B7)", Vitamin, Mcg),
    Folate => ("folate", "Folate (B9)", Vitamin, Mcg),
    VitaminB12 => ("vitaminB12", "Vitamin B12", Vitamin, Mcg),

    Calcium => ("calcium", "Calcium", Mineral, Mg),
    Iron => ("iron", "Iron", Mineral, Mg),
    Magnesium => ("magnesium", "Magnesium", Mineral, Mg),
    Phosphorus => ("phosphorus", "Phosphorus", Mineral, Mg),
    Potassium => ("potassium", "Potassium", Mineral, Mg),
    Sodium => ("sodium", "Sodium", Mineral, Mg),
    Zinc => ("zinc", "Zinc", Mineral, Mg),
    Copper => ("copper", "Copper", Mineral, Mg),
    Manganese => ("manganese", "Manganese", Mineral, Mg),
    Selenium => ("selenium", "Selenium", Mineral, Mcg),
    Chromium => ("chromium", "Chromium", Mineral, Mcg),
    Molybdenum => ("molybdenum", "Molybdenum", Mineral, Mcg),
    Iodine => ("iodine", "Iodine", Mineral, Mcg),
}

/// Number of macro keys. They lead [`NutrientKey::ALL`].
pub const MACRO_COUNT: usize = 4;

/// Number of optional (vitamin + mineral) keys.
pub const MICRO_COUNT: usize = 26;

impl NutrientKey {
    pub fn is_macro(self) -> bool {
        self.tier() == Tier::Macro
    }

    /// Position among the optional nutrients, `None` for macros.
    pub(crate) fn micro_slot(self) -> Option<usize> {
        let idx = self as usize;
        if idx < MACRO_COUNT {
            None
        } else {
            Some(idx - MACRO_COUNT)
        }
    }

    pub fn vitamins() -> impl Iterator<Item = NutrientKey> {
        Self::ALL.iter().copied().filter(|k| k.tier() == Tier::Vitamin)
    }

    pub fn minerals() -> impl Iterator<Item = NutrientKey> {
        Self::ALL.iter().copied().filter(|k| k.tier() == Tier::Mineral)
    }
}

impl fmt::Display for NutrientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
