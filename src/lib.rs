pub mod aggregator;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod display;
pub mod entry;
pub mod error;
pub mod nutrients;
pub mod portion;
pub mod rda;
pub mod rollup;

pub use aggregator::{aggregate, Aggregator, Contribution, Ingredient, IngredientId, Meal, MealId, NutrientSource};
pub use catalog::Catalog;
pub use entry::{Entry, EntryKind, EntrySource};
pub use error::{NutritionError, ReferenceKind};
pub use nutrients::{NutrientKey, NutrientVector};
pub use rda::{percent_of, RdaTable, Severity};
pub use rollup::{rollup, rollup_kind, Bucketing, Rollup, RollupBucket};
