use std::time::Duration;

use crate::engine::Candidate;
use crate::models::{
    Achievement, Ingredient, MacroTarget, MealItem, OptimizationResult, Provenance,
};

/// Absolute slack allowed on a macro whose target is exactly zero.
///
/// The relative tolerance test is undefined at zero, so those macros count as
/// achieved only when the meal is effectively free of them.
pub const ZERO_TARGET_EPSILON: f64 = 1e-6;

/// Whether a single macro landed within tolerance of its target.
pub fn macro_achieved(actual: f64, target: f64, tolerance: f64) -> bool {
    if target > 0.0 {
        (actual - target).abs() / target <= tolerance
    } else {
        actual.abs() <= ZERO_TARGET_EPSILON
    }
}

/// Combine the winning candidate with the target into the final result.
pub fn assemble(
    ingredients: &[Ingredient],
    candidate: &Candidate,
    target: &MacroTarget,
    tolerance: f64,
    total_elapsed: Duration,
) -> OptimizationResult {
    let items: Vec<MealItem> = ingredients
        .iter()
        .zip(&candidate.quantities)
        .map(|(ingredient, &q)| MealItem::from_ingredient(ingredient, q))
        .collect();

    let totals = candidate.totals;
    let achievement = Achievement {
        calories: macro_achieved(totals.calories, target.calories, tolerance),
        protein: macro_achieved(totals.protein, target.protein, tolerance),
        carbs: macro_achieved(totals.carbs, target.carbs, tolerance),
        fat: macro_achieved(totals.fat, target.fat, tolerance),
    };

    let supplements = ingredients
        .iter()
        .filter(|i| i.provenance == Provenance::Supplement)
        .map(|i| i.name.clone())
        .collect();

    OptimizationResult {
        solver: candidate.solver.to_string(),
        items,
        totals,
        target_achieved: achievement.overall(),
        achievement,
        penalty: candidate.penalty,
        computation_time: total_elapsed.as_secs_f64(),
        supplements,
    }
}
