use std::collections::HashMap;
use std::collections::HashSet;

use crate::models::{Category, Ingredient, Macro, Preferences};

/// Read-only pool of known ingredients, keyed by case-insensitive name.
///
/// The catalog is shared data for the duration of a solve; nothing in the
/// engine mutates it.
pub struct IngredientCatalog {
    entries: Vec<Ingredient>,
}

impl IngredientCatalog {
    /// Build a catalog from a list of entries.
    ///
    /// Deduplicates by lowercase name, last occurrence wins.
    pub fn new(entries: Vec<Ingredient>) -> Self {
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut deduped: Vec<Ingredient> = Vec::with_capacity(entries.len());

        for entry in entries {
            match by_key.get(&entry.key()) {
                Some(&idx) => deduped[idx] = entry,
                None => {
                    by_key.insert(entry.key(), deduped.len());
                    deduped.push(entry);
                }
            }
        }

        Self { entries: deduped }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Ingredient] {
        &self.entries
    }

    /// Look up an entry by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        let key = name.to_lowercase();
        self.entries.iter().find(|e| e.key() == key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All entries of the given category.
    pub fn by_category(&self, category: Category) -> Vec<&Ingredient> {
        self.entries
            .iter()
            .filter(|e| e.category == category)
            .collect()
    }

    /// Best supplement candidate for a macro: the entry with the highest
    /// macro-per-calorie ratio that actually carries the macro, passes the
    /// preference filters, and is not already present by name.
    pub fn best_source(
        &self,
        m: Macro,
        excluded_names: &HashSet<String>,
        preferences: &Preferences,
    ) -> Option<&Ingredient> {
        self.entries
            .iter()
            .filter(|e| e.per_100(m) > 0.0)
            .filter(|e| !excluded_names.contains(&e.key()))
            .filter(|e| preferences.allows(e))
            .max_by(|a, b| {
                a.macro_per_calorie(m)
                    .partial_cmp(&b.macro_per_calorie(m))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
