use std::collections::HashMap;

use crate::aggregator::{Ingredient, IngredientId, Meal, MealId, NutrientSource};

/// In-memory ingredient and meal records, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ingredients: HashMap<IngredientId, Ingredient>,
    meals: HashMap<MealId, Meal>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(ingredients: Vec<Ingredient>, meals: Vec<Meal>) -> Self {
        let mut catalog = Self::new();
        for ingredient in ingredients {
            catalog.insert_ingredient(ingredient);
        }
        for meal in meals {
            catalog.insert_meal(meal);
        }
        catalog
    }

    /// Later records with the same id replace earlier ones. The replaced
    /// record is returned and the duplicate id is logged as a warning.
    pub fn insert_ingredient(&mut self, ingredient: Ingredient) -> Option<Ingredient> {
        let previous = self.ingredients.insert(ingredient.id, ingredient);
        if let Some(previous) = &previous {
            tracing::warn!(id = %previous.id, name = %previous.name, "duplicate ingredient id, replacing earlier record");
        }
        previous
    }

    pub fn insert_meal(&mut self, meal: Meal) -> Option<Meal> {
        let previous = self.meals.insert(meal.id, meal);
        if let Some(previous) = &previous {
            tracing::warn!(id = %previous.id, name = %previous.name, "duplicate meal id, replacing earlier record");
        }
        previous
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn meal_count(&self) -> usize {
        self.meals.len()
    }
}

impl NutrientSource for Catalog {
    fn ingredient(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(&id)
    }

    fn meal(&self, id: MealId) -> Option<&Meal> {
        self.meals.get(&id)
    }
}
