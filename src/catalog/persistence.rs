use std::fs;
use std::path::Path;

use crate::catalog::IngredientCatalog;
use crate::error::{OptimError, Result};
use crate::models::{Ingredient, OptimizationResult};

/// Load an ingredient catalog from a JSON or CSV file, by extension.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<IngredientCatalog> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let entries = if is_csv {
        load_csv(path)?
    } else {
        load_json(path)?
    };

    let invalid = entries.iter().find(|e| !e.is_valid());
    if let Some(entry) = invalid {
        return Err(OptimError::invalid_input(
            format!("catalog.{}", entry.name),
            "negative or non-finite macro profile",
        ));
    }

    Ok(IngredientCatalog::new(entries))
}

fn load_json(path: &Path) -> Result<Vec<Ingredient>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn load_csv(path: &Path) -> Result<Vec<Ingredient>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut entries = Vec::new();
    for record in reader.deserialize() {
        let ingredient: Ingredient = record?;
        entries.push(ingredient);
    }
    Ok(entries)
}

/// Write an optimization result as pretty-printed JSON.
pub fn save_result<P: AsRef<Path>>(path: P, result: &OptimizationResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json)?;
    Ok(())
}
