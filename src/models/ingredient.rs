use serde::{Deserialize, Serialize};

use crate::models::target::{Macro, MacroTotals};

/// Broad catalog grouping used for gap coverage and bound defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Protein,
    Carb,
    Fat,
    Vegetable,
    Other,
}

impl Category {
    /// Realistic per-meal quantity ceiling in grams, used when the catalog
    /// entry does not carry its own bound.
    pub fn default_max_quantity(self) -> f64 {
        match self {
            Category::Protein => 300.0,
            Category::Carb => 350.0,
            Category::Fat => 30.0,
            Category::Vegetable => 400.0,
            Category::Other => 250.0,
        }
    }
}

/// Whether an ingredient came from the caller or was added to close a gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    #[default]
    Original,
    Supplement,
}

/// An ingredient with its macro profile per 100 g and the quantity it
/// currently holds in the working set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,

    pub calories_per_100: f64,
    pub protein_per_100: f64,
    pub carbs_per_100: f64,
    pub fat_per_100: f64,

    pub category: Category,

    /// Current quantity in grams. Zero for entries the caller only nominated.
    #[serde(default, alias = "current_quantity")]
    pub quantity: f64,

    /// Maximum practical quantity in grams. Falls back to the category default.
    #[serde(default)]
    pub max_quantity: Option<f64>,

    #[serde(default)]
    pub provenance: Provenance,
}

impl Ingredient {
    /// Canonical key for lookups (lowercase name).
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Upper quantity bound in grams for this ingredient.
    #[inline]
    pub fn bound(&self) -> f64 {
        self.max_quantity
            .unwrap_or_else(|| self.category.default_max_quantity())
    }

    /// Per-100 g amount of the given macro.
    #[inline]
    pub fn per_100(&self, m: Macro) -> f64 {
        match m {
            Macro::Calories => self.calories_per_100,
            Macro::Protein => self.protein_per_100,
            Macro::Carbs => self.carbs_per_100,
            Macro::Fat => self.fat_per_100,
        }
    }

    /// Macro contribution of `quantity` grams of this ingredient.
    pub fn macros_for(&self, quantity: f64) -> MacroTotals {
        MacroTotals {
            calories: quantity / 100.0 * self.calories_per_100,
            protein: quantity / 100.0 * self.protein_per_100,
            carbs: quantity / 100.0 * self.carbs_per_100,
            fat: quantity / 100.0 * self.fat_per_100,
        }
    }

    /// How much of the given macro one calorie of this ingredient buys.
    ///
    /// Used to rank supplement candidates. Zero-calorie sources of the macro
    /// rank above everything else.
    pub fn macro_per_calorie(&self, m: Macro) -> f64 {
        let amount = self.per_100(m);
        if self.calories_per_100 > 0.0 {
            amount / self.calories_per_100
        } else if amount > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Basic validation: finite, non-negative profile with a positive bound.
    pub fn is_valid(&self) -> bool {
        let profile_ok = Macro::ALL
            .iter()
            .all(|&m| self.per_100(m).is_finite() && self.per_100(m) >= 0.0);
        profile_ok
            && self.quantity.is_finite()
            && self.quantity >= 0.0
            && self.bound().is_finite()
            && self.bound() > 0.0
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ingredient {}
