mod ingredient;
mod preferences;
mod result;
mod target;

pub use ingredient::{Category, Ingredient, Provenance};
pub use preferences::Preferences;
pub use result::{Achievement, MealItem, OptimizationRequest, OptimizationResult};
pub use target::{Macro, MacroTarget, MacroTotals};
