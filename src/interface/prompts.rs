use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::catalog::IngredientCatalog;
use crate::error::{OptimError, Result};
use crate::models::{Ingredient, MacroTarget, Provenance};

/// Minimum similarity for a fuzzy catalog match.
const FUZZY_THRESHOLD: f64 = 0.7;

fn prompt_number(prompt: &str, default: &str) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;

    input
        .parse()
        .map_err(|_| OptimError::invalid_input(prompt, "Invalid number"))
}

/// Prompt for the four macro targets.
pub fn prompt_target() -> Result<MacroTarget> {
    let calories = prompt_number("Target calories", "600")?;
    let protein = prompt_number("Target protein (g)", "40")?;
    let carbs = prompt_number("Target carbs (g)", "60")?;
    let fat = prompt_number("Target fat (g)", "20")?;

    let target = MacroTarget::new(calories, protein, carbs, fat);
    if !target.is_valid() {
        return Err(OptimError::invalid_input(
            "target",
            "Targets must be non-negative numbers",
        ));
    }
    Ok(target)
}

/// Resolve a typed name against the catalog: exact match first, then fuzzy
/// matching with confirmation.
fn resolve_catalog_name(catalog: &IngredientCatalog, input: &str) -> Result<Option<String>> {
    if let Some(entry) = catalog.get(input) {
        return Ok(Some(entry.name.clone()));
    }

    let mut candidates: Vec<(&Ingredient, f64)> = catalog
        .entries()
        .iter()
        .map(|e| {
            (
                e,
                jaro_winkler(&e.name.to_lowercase(), &input.to_lowercase()),
            )
        })
        .filter(|(_, score)| *score > FUZZY_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if candidates.is_empty() {
        println!("No matching catalog entry for '{}'", input);
        return Ok(None);
    }

    if candidates.len() == 1 {
        let entry = candidates[0].0;
        let confirm = Confirm::new()
            .with_prompt(format!("Did you mean '{}'?", entry.name))
            .default(true)
            .interact()?;
        return Ok(confirm.then(|| entry.name.clone()));
    }

    // Multiple matches - let the user pick.
    let options: Vec<String> = candidates
        .iter()
        .take(5)
        .map(|(e, _)| e.name.clone())
        .collect();
    let mut selection_options = options.clone();
    selection_options.push("None of these".to_string());

    let selection = Select::new()
        .with_prompt("Which did you mean?")
        .items(&selection_options)
        .default(0)
        .interact()?;

    if selection < options.len() {
        Ok(Some(options[selection].clone()))
    } else {
        Ok(None)
    }
}

/// Collect starting ingredients from the catalog, with quantities.
pub fn prompt_ingredients(catalog: &IngredientCatalog) -> Result<Vec<Ingredient>> {
    let mut ingredients: Vec<Ingredient> = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Add an ingredient (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        let Some(name) = resolve_catalog_name(catalog, input)? else {
            continue;
        };

        if ingredients.iter().any(|i| i.key() == name.to_lowercase()) {
            println!("'{}' is already in the meal", name);
            continue;
        }

        let quantity = prompt_number(&format!("Quantity of {} in grams", name), "0")?;
        if quantity < 0.0 {
            println!("Quantity must be non-negative");
            continue;
        }

        let mut ingredient = catalog
            .get(&name)
            .ok_or_else(|| OptimError::IngredientNotFound(name.clone()))?
            .clone();
        ingredient.quantity = quantity;
        ingredient.provenance = Provenance::Original;

        println!("Added: {}", ingredient.name);
        ingredients.push(ingredient);
    }

    Ok(ingredients)
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
