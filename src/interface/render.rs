use crate::models::{MacroTarget, OptimizationResult, Provenance};

fn mark(achieved: bool) -> &'static str {
    if achieved { "ok" } else { "miss" }
}

/// Display an optimization result as a formatted table.
pub fn display_result(result: &OptimizationResult, target: &MacroTarget) {
    if result.items.is_empty() {
        println!("No quantities to show (empty ingredient set).");
        return;
    }

    println!();
    println!("=== Optimized Meal ===");
    println!();

    let max_name_len = result
        .items
        .iter()
        .map(|i| i.name.len())
        .max()
        .unwrap_or(10);

    for (i, item) in result.items.iter().enumerate() {
        let tag = if item.provenance == Provenance::Supplement {
            "  [supplement]"
        } else {
            ""
        };

        println!(
            "{:>3}. {:<width$} {:>7.1} g | {:>6.1} kcal  P {:>5.1}  C {:>5.1}  F {:>5.1}{}",
            i + 1,
            item.name,
            item.quantity,
            item.calories,
            item.protein,
            item.carbs,
            item.fat,
            tag,
            width = max_name_len
        );
    }

    println!();
    println!("--- Summary ---");
    println!(
        "Calories: {:>7.1} / {:<7.1} [{}]",
        result.totals.calories,
        target.calories,
        mark(result.achievement.calories)
    );
    println!(
        "Protein:  {:>7.1} / {:<7.1} [{}]",
        result.totals.protein,
        target.protein,
        mark(result.achievement.protein)
    );
    println!(
        "Carbs:    {:>7.1} / {:<7.1} [{}]",
        result.totals.carbs,
        target.carbs,
        mark(result.achievement.carbs)
    );
    println!(
        "Fat:      {:>7.1} / {:<7.1} [{}]",
        result.totals.fat,
        target.fat,
        mark(result.achievement.fat)
    );
    println!();
    println!(
        "Solver: {} | penalty {:.4} | {:.0} ms | target {}",
        result.solver,
        result.penalty,
        result.computation_time * 1e3,
        if result.target_achieved {
            "achieved"
        } else {
            "not achieved"
        }
    );
    if !result.supplements.is_empty() {
        println!("Supplements added: {}", result.supplements.join(", "));
    }
    println!();
}
