use serde::{Deserialize, Serialize};

use crate::models::ingredient::{Category, Ingredient};

/// Categorical filters applied when picking supplements from the catalog.
///
/// This is deliberately coarse: a category can be excluded outright and
/// individual ingredients avoided by name substring, nothing finer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub excluded_categories: Vec<Category>,

    /// Case-insensitive substrings matched against ingredient names.
    #[serde(default)]
    pub avoided_ingredients: Vec<String>,
}

impl Preferences {
    /// Whether the given catalog entry passes the filters.
    pub fn allows(&self, ingredient: &Ingredient) -> bool {
        if self.excluded_categories.contains(&ingredient.category) {
            return false;
        }
        let name = ingredient.name.to_lowercase();
        !self
            .avoided_ingredients
            .iter()
            .any(|avoided| !avoided.is_empty() && name.contains(&avoided.to_lowercase()))
    }
}
