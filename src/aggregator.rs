use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entry::{Entry, EntrySource};
use crate::error::{NutritionError, ReferenceKind, Result};
use crate::nutrients::NutrientVector;
use crate::portion::{self, REFERENCE_GRAMS};

/// Allowed gap between a meal's stored total and its recomputed total before
/// the stored one is reported as stale.
const MEAL_DRIFT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealId(pub i64);

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: String,
    /// Nutrient content of 100 g of this ingredient.
    pub per_100g: NutrientVector,
}

/// One ingredient and the grams of it consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub ingredient_id: IngredientId,
    pub amount_grams: f64,
}

impl Contribution {
    pub fn new(ingredient_id: i64, amount_grams: f64) -> Self {
        Self {
            ingredient_id: IngredientId(ingredient_id),
            amount_grams,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub contributions: Vec<Contribution>,
    /// Total stored when the meal was composed. Kept for reference only; totals
    /// are always recomputed from `contributions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precomputed_total: Option<NutrientVector>,
}

impl Meal {
    /// True when a stored total exists and its macros no longer match
    /// `recomputed` within [`MEAL_DRIFT_TOLERANCE`].
    pub fn has_stale_total(&self, recomputed: &NutrientVector) -> bool {
        self.precomputed_total
            .as_ref()
            .is_some_and(|stored| !stored.macros_approx_eq(recomputed, MEAL_DRIFT_TOLERANCE))
    }
}

/// Lookup seam for ingredient and meal records. The core never reaches storage
/// itself; callers hand in something that can resolve ids.
pub trait NutrientSource {
    fn ingredient(&self, id: IngredientId) -> Option<&Ingredient>;
    fn meal(&self, id: MealId) -> Option<&Meal>;
}

/// Mass and nutrient density of a set of contributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientProfile {
    pub total_mass_g: f64,
    pub total: NutrientVector,
    /// `None` when the total mass is zero.
    pub per_100g: Option<NutrientVector>,
}

/// Folds contributions, meals and entries into nutrient totals.
///
/// Every id is resolved through the [`NutrientSource`]. An id that cannot be
/// resolved fails the whole call with [`NutritionError::MissingReference`].
pub struct Aggregator<'a, S: NutrientSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: NutrientSource + ?Sized> Aggregator<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    fn resolve_ingredient(&self, id: IngredientId) -> Result<&'a Ingredient> {
        self.source
            .ingredient(id)
            .ok_or(NutritionError::MissingReference {
                kind: ReferenceKind::Ingredient,
                id: id.0,
            })
    }

    fn resolve_meal(&self, id: MealId) -> Result<&'a Meal> {
        self.source.meal(id).ok_or(NutritionError::MissingReference {
            kind: ReferenceKind::Meal,
            id: id.0,
        })
    }

    /// Absolute nutrients of a single contribution.
    pub fn contribution(&self, contribution: &Contribution) -> Result<NutrientVector> {
        portion::validate_amount(contribution.amount_grams)?;
        let ingredient = self.resolve_ingredient(contribution.ingredient_id)?;
        // Sources are not trusted to have run the loaders' checks.
        ingredient.per_100g.validate()?;
        portion::scale(&ingredient.per_100g, contribution.amount_grams)
    }

    pub fn aggregate(&self, contributions: &[Contribution]) -> Result<NutrientVector> {
        let mut total = NutrientVector::zero();
        for contribution in contributions {
            total += self.contribution(contribution)?;
        }
        Ok(total)
    }

    /// Recomputes a meal from its contributions and multiplies by `portions`.
    pub fn meal(&self, meal_id: MealId, portions: f64) -> Result<NutrientVector> {
        let portions = portion::validate_portions(portions)?;
        let meal = self.resolve_meal(meal_id)?;
        let single = self.aggregate(&meal.contributions)?;

        if meal.has_stale_total(&single) {
            tracing::warn!(
                meal_id = %meal.id,
                stored_calories = meal.precomputed_total.as_ref().map(|stored| stored.calories),
                recomputed_calories = single.calories,
                "stored meal total differs from current ingredient data"
            );
        }

        Ok(single.scale(portions))
    }

    pub fn entry(&self, entry: &Entry) -> Result<NutrientVector> {
        match &entry.source {
            EntrySource::Ingredients { contributions } => self.aggregate(contributions),
            EntrySource::Meal { meal_id, portions } => self.meal(*meal_id, *portions),
        }
    }

    pub fn entries<'e, I>(&self, entries: I) -> Result<NutrientVector>
    where
        I: IntoIterator<Item = &'e Entry>,
    {
        let mut total = NutrientVector::zero();
        let mut count = 0usize;
        for entry in entries {
            total += self.entry(entry)?;
            count += 1;
        }
        tracing::debug!(entries = count, calories = total.calories, "aggregated entries");
        Ok(total)
    }

    /// Total, mass and per-100g density of a list of contributions.
    pub fn profile(&self, contributions: &[Contribution]) -> Result<NutrientProfile> {
        let total = self.aggregate(contributions)?;
        let total_mass_g: f64 = contributions.iter().map(|c| c.amount_grams).sum();
        let per_100g = if total_mass_g > 0.0 {
            Some(total.scale(REFERENCE_GRAMS / total_mass_g))
        } else {
            None
        };
        Ok(NutrientProfile {
            total_mass_g,
            total,
            per_100g,
        })
    }

    /// Profile of one portion of a stored meal.
    pub fn meal_profile(&self, meal_id: MealId) -> Result<NutrientProfile> {
        let meal = self.resolve_meal(meal_id)?;
        self.profile(&meal.contributions)
    }
}

/// Aggregates `contributions` against `source`. See [`Aggregator::aggregate`].
pub fn aggregate<S: NutrientSource + ?Sized>(
    source: &S,
    contributions: &[Contribution],
) -> Result<NutrientVector> {
    Aggregator::new(source).aggregate(contributions)
}
