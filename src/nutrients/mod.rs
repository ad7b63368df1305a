pub mod key;
pub mod vector;

pub use key::{NutrientKey, Tier, Unit, MACRO_COUNT, MICRO_COUNT};
pub use vector::NutrientVector;
