use serde::{Deserialize, Serialize};

use crate::models::ingredient::{Ingredient, Provenance};
use crate::models::preferences::Preferences;
use crate::models::target::{MacroTarget, MacroTotals};

/// A single portioned ingredient row in the final meal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub provenance: Provenance,
}

impl MealItem {
    pub fn from_ingredient(ingredient: &Ingredient, quantity: f64) -> Self {
        let totals = ingredient.macros_for(quantity);
        Self {
            name: ingredient.name.clone(),
            quantity,
            calories: totals.calories,
            protein: totals.protein,
            carbs: totals.carbs,
            fat: totals.fat,
            provenance: ingredient.provenance,
        }
    }
}

/// Per-macro achievement flags against the configured tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Achievement {
    pub calories: bool,
    pub protein: bool,
    pub carbs: bool,
    pub fat: bool,
}

impl Achievement {
    pub fn overall(&self) -> bool {
        self.calories && self.protein && self.carbs && self.fat
    }
}

/// The externally visible outcome of one optimization call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Name of the solver that produced the winning quantities.
    pub solver: String,
    pub items: Vec<MealItem>,
    pub totals: MacroTotals,
    pub achievement: Achievement,
    pub target_achieved: bool,
    /// Penalty score of the winning candidate (0 is a perfect match).
    pub penalty: f64,
    /// Total wall-clock time of the solve, in seconds.
    pub computation_time: f64,
    /// Names of ingredients added to close macro gaps.
    pub supplements: Vec<String>,
}

/// A full optimization request as read from a request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub ingredients: Vec<Ingredient>,
    pub target: MacroTarget,
    #[serde(default)]
    pub preferences: Preferences,
}
