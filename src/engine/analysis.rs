use std::collections::HashSet;

use crate::models::{Category, Ingredient, Macro, MacroTarget, MacroTotals};

/// Snapshot of how far a working set currently is from the target.
#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    /// Macro totals at the current quantities.
    pub totals: MacroTotals,
    /// Per-macro shortfall, `max(target - current, 0)`.
    pub deficits: MacroTotals,
    /// Categories already represented in the working set.
    pub covered: HashSet<Category>,
}

impl GapReport {
    pub fn deficit(&self, m: Macro) -> f64 {
        self.deficits.get(m)
    }
}

/// Macro totals of an ingredient list at its current quantities.
pub fn current_totals(ingredients: &[Ingredient]) -> MacroTotals {
    let mut totals = MacroTotals::default();
    for ingredient in ingredients {
        totals.add(ingredient.macros_for(ingredient.quantity));
    }
    totals
}

/// Compute totals, deficits and category coverage for a working set.
///
/// Pure and deterministic: the same input always yields the same report.
pub fn analyze_gaps(ingredients: &[Ingredient], target: &MacroTarget) -> GapReport {
    let totals = current_totals(ingredients);

    let deficits = MacroTotals {
        calories: (target.calories - totals.calories).max(0.0),
        protein: (target.protein - totals.protein).max(0.0),
        carbs: (target.carbs - totals.carbs).max(0.0),
        fat: (target.fat - totals.fat).max(0.0),
    };

    let covered = ingredients.iter().map(|i| i.category).collect();

    GapReport {
        totals,
        deficits,
        covered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;

    fn ingredient(name: &str, cal: f64, p: f64, c: f64, f: f64, category: Category, qty: f64) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            calories_per_100: cal,
            protein_per_100: p,
            carbs_per_100: c,
            fat_per_100: f,
            category,
            quantity: qty,
            max_quantity: None,
            provenance: Provenance::Original,
        }
    }

    #[test]
    fn test_deficits_are_clamped_at_zero() {
        let ingredients = vec![ingredient(
            "Chicken Breast",
            165.0,
            31.0,
            0.0,
            3.6,
            Category::Protein,
            200.0,
        )];
        let target = MacroTarget::new(165.0, 31.0, 40.0, 0.0);
        let report = analyze_gaps(&ingredients, &target);

        // 200 g exceeds the calorie and protein targets; no negative deficit.
        assert_eq!(report.deficit(Macro::Calories), 0.0);
        assert_eq!(report.deficit(Macro::Protein), 0.0);
        assert_eq!(report.deficit(Macro::Carbs), 40.0);
        assert_eq!(report.deficit(Macro::Fat), 0.0);
    }

    #[test]
    fn test_empty_set_deficits_equal_target() {
        let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);
        let report = analyze_gaps(&[], &target);

        assert_eq!(report.totals, MacroTotals::default());
        assert_eq!(report.deficit(Macro::Calories), 500.0);
        assert_eq!(report.deficit(Macro::Protein), 50.0);
        assert_eq!(report.deficit(Macro::Carbs), 45.0);
        assert_eq!(report.deficit(Macro::Fat), 15.0);
        assert!(report.covered.is_empty());
    }

    #[test]
    fn test_category_coverage() {
        let ingredients = vec![
            ingredient("Chicken Breast", 165.0, 31.0, 0.0, 3.6, Category::Protein, 100.0),
            ingredient("Spinach", 23.0, 2.9, 3.6, 0.4, Category::Vegetable, 50.0),
        ];
        let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);
        let report = analyze_gaps(&ingredients, &target);

        assert!(report.covered.contains(&Category::Protein));
        assert!(report.covered.contains(&Category::Vegetable));
        assert!(!report.covered.contains(&Category::Carb));
        assert!(!report.covered.contains(&Category::Fat));
    }

    #[test]
    fn test_idempotent() {
        let ingredients = vec![ingredient(
            "Brown Rice",
            111.0,
            2.6,
            23.0,
            0.9,
            Category::Carb,
            150.0,
        )];
        let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);

        let first = analyze_gaps(&ingredients, &target);
        let second = analyze_gaps(&ingredients, &target);
        assert_eq!(first, second);
    }
}
