use std::collections::HashSet;

use crate::catalog::IngredientCatalog;
use crate::engine::analysis::GapReport;
use crate::models::{Category, Ingredient, Macro, Preferences, Provenance};

/// The three macro dimensions that can be closed by a categorized supplement,
/// paired with the category that supplies each.
const SUPPLEMENT_MACROS: [(Macro, Category); 3] = [
    (Macro::Protein, Category::Protein),
    (Macro::Carbs, Category::Carb),
    (Macro::Fat, Category::Fat),
];

/// Pick supplements to close macro gaps before optimization runs.
///
/// At most one supplement per uncovered macro category. The candidate is the
/// catalog entry with the best macro-per-calorie ratio that is not already in
/// the working set; its quantity is sized to the deficit and clipped to the
/// entry's bound. Residual deficit after clipping is left for the solvers.
pub fn select_supplements(
    report: &GapReport,
    existing: &[Ingredient],
    catalog: &IngredientCatalog,
    preferences: &Preferences,
) -> Vec<Ingredient> {
    let mut taken: HashSet<String> = existing.iter().map(|i| i.key()).collect();
    let mut supplements = Vec::new();

    for (m, category) in SUPPLEMENT_MACROS {
        let deficit = report.deficit(m);
        if deficit <= 0.0 || report.covered.contains(&category) {
            continue;
        }

        let Some(entry) = catalog.best_source(m, &taken, preferences) else {
            continue;
        };

        let per_gram = entry.per_100(m) / 100.0;
        let quantity = (deficit / per_gram).min(entry.bound());

        let mut supplement = entry.clone();
        supplement.quantity = quantity;
        supplement.provenance = Provenance::Supplement;

        taken.insert(supplement.key());
        supplements.push(supplement);
    }

    supplements
}
