pub mod analysis;
pub mod assemble;
pub mod supplement;

pub use analysis::{GapReport, analyze_gaps, current_totals};
pub use assemble::{ZERO_TARGET_EPSILON, assemble, macro_achieved};
pub use supplement::select_supplements;

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::catalog::IngredientCatalog;
use crate::error::{OptimError, Result};
use crate::models::{Ingredient, Macro, MacroTarget, MacroTotals, OptimizationResult, Preferences};
use crate::solvers::{
    BayesianSearch, DifferentialSearch, ExactProgram, GeneticSearch, HybridSearch,
    QuantityProblem, QuantitySolver, SolverBudget, penalty,
};

/// Default relative tolerance for the per-macro achievement flags.
pub const DEFAULT_TOLERANCE: f64 = 0.10;

/// Solver name reported when the proportional-scaling fallback produced the
/// result.
pub const FALLBACK_SOLVER: &str = "fallback";

/// Immutable per-call configuration. No process-wide state exists; everything
/// a solve needs travels in this value.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Relative tolerance for the achievement flags.
    pub tolerance: f64,
    /// Iteration and wall-clock limits applied to each solver independently.
    pub budget: SolverBudget,
    /// Seed for the stochastic solvers. One seed reproduces the whole
    /// portfolio; absent, entropy is used and runs vary.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            budget: SolverBudget::default(),
            seed: None,
        }
    }
}

/// One solver's successful output, scored and timed. Consumed once by the
/// selector; only the winner survives into the result.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub solver: &'static str,
    pub quantities: Vec<f64>,
    pub totals: MacroTotals,
    pub penalty: f64,
    pub elapsed: Duration,
}

/// Run the full optimization: validate, close gaps, race the solver
/// portfolio, select the best candidate (or fall back), and assemble the
/// result.
pub fn optimize(
    ingredients: &[Ingredient],
    target: &MacroTarget,
    preferences: &Preferences,
    catalog: &IngredientCatalog,
    config: &EngineConfig,
) -> Result<OptimizationResult> {
    let start = Instant::now();
    validate_inputs(ingredients, target)?;

    let report = analyze_gaps(ingredients, target);
    let supplements = select_supplements(&report, ingredients, catalog, preferences);
    if !supplements.is_empty() {
        info!(
            "added {} supplement(s): {}",
            supplements.len(),
            supplements
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut working: Vec<Ingredient> = ingredients.to_vec();
    working.extend(supplements);

    if working.is_empty() {
        if Macro::ALL.iter().any(|&m| target.get(m) > 0.0) {
            return Err(OptimError::invalid_input(
                "ingredients",
                "empty ingredient list and no catalog candidates for the deficient macros",
            ));
        }
        // Zero targets and nothing to portion: the empty meal is the answer.
        let problem = QuantityProblem::new(&working, target);
        let candidate = fallback_candidate(&problem)?;
        return Ok(assemble(
            &working,
            &candidate,
            target,
            config.tolerance,
            start.elapsed(),
        ));
    }

    let problem = QuantityProblem::new(&working, target);
    let candidates = run_portfolio(&problem, config);

    let winner = match select_best(candidates) {
        Some(candidate) => {
            info!(
                "selected solver {} (penalty {:.6}, {:.1} ms)",
                candidate.solver,
                candidate.penalty,
                candidate.elapsed.as_secs_f64() * 1e3
            );
            candidate
        }
        None => {
            warn!("all solvers failed, using proportional-scaling fallback");
            fallback_candidate(&problem)?
        }
    };

    Ok(assemble(
        &working,
        &winner,
        target,
        config.tolerance,
        start.elapsed(),
    ))
}

/// Reject malformed targets and ingredients before any solver runs,
/// naming the offending field.
fn validate_inputs(ingredients: &[Ingredient], target: &MacroTarget) -> Result<()> {
    for m in Macro::ALL {
        let value = target.get(m);
        if !value.is_finite() || value < 0.0 {
            return Err(OptimError::invalid_input(
                format!("target.{}", m.label()),
                "must be a non-negative finite number",
            ));
        }
    }

    for (idx, ingredient) in ingredients.iter().enumerate() {
        if ingredient.name.trim().is_empty() {
            return Err(OptimError::invalid_input(
                format!("ingredients[{idx}].name"),
                "must not be empty",
            ));
        }
        for m in Macro::ALL {
            let value = ingredient.per_100(m);
            if !value.is_finite() || value < 0.0 {
                return Err(OptimError::invalid_input(
                    format!("ingredients[{idx}].{}_per_100", m.label()),
                    "must be a non-negative finite number",
                ));
            }
        }
        if !ingredient.quantity.is_finite() || ingredient.quantity < 0.0 {
            return Err(OptimError::invalid_input(
                format!("ingredients[{idx}].quantity"),
                "must be a non-negative finite number",
            ));
        }
        if !ingredient.bound().is_finite() || ingredient.bound() <= 0.0 {
            return Err(OptimError::invalid_input(
                format!("ingredients[{idx}].max_quantity"),
                "must be positive",
            ));
        }
    }

    Ok(())
}

/// The closed set of solvers, each with a seed derived from the base so one
/// configured seed reproduces the whole portfolio.
fn build_portfolio(seed: u64) -> Vec<Box<dyn QuantitySolver>> {
    vec![
        Box::new(ExactProgram::new()),
        Box::new(DifferentialSearch::new(seed.wrapping_add(1))),
        Box::new(GeneticSearch::new(seed.wrapping_add(2))),
        Box::new(BayesianSearch::new(seed.wrapping_add(3))),
        Box::new(HybridSearch::new(seed.wrapping_add(4))),
    ]
}

/// Fan the portfolio out across threads and join on the collected candidates.
/// Per-solver failures are absorbed here and never abort siblings.
fn run_portfolio(problem: &QuantityProblem<'_>, config: &EngineConfig) -> Vec<Candidate> {
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let solvers = build_portfolio(seed);

    solvers
        .par_iter()
        .filter_map(|solver| {
            let started = Instant::now();
            debug!("solver {} started", solver.name());

            match solver.solve(problem, &config.budget) {
                Ok(mut quantities) => {
                    problem.clamp(&mut quantities);
                    let totals = problem.totals(&quantities);
                    let score = penalty(&totals, problem.target);
                    if !score.is_finite() {
                        warn!("solver {} produced a non-finite penalty", solver.name());
                        return None;
                    }
                    let elapsed = started.elapsed();
                    info!(
                        "solver {} finished: penalty={:.6} elapsed={:.1}ms",
                        solver.name(),
                        score,
                        elapsed.as_secs_f64() * 1e3
                    );
                    Some(Candidate {
                        solver: solver.name(),
                        quantities,
                        totals,
                        penalty: score,
                        elapsed,
                    })
                }
                Err(failure) => {
                    warn!("solver {} failed: {}", solver.name(), failure);
                    None
                }
            }
        })
        .collect()
}

/// Minimum penalty wins; ties go to the faster solver.
fn select_best(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.sort_by(|a, b| {
        a.penalty
            .partial_cmp(&b.penalty)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.elapsed.cmp(&b.elapsed))
    });
    candidates.into_iter().next()
}

/// Deterministic proportional scaling of the working set's current
/// quantities so total calories match the target, clipped to bounds.
fn fallback_candidate(problem: &QuantityProblem<'_>) -> Result<Candidate> {
    let started = Instant::now();

    let current: Vec<f64> = problem.ingredients.iter().map(|i| i.quantity).collect();
    let current_totals = problem.totals(&current);

    let scale = if current_totals.calories > 0.0 {
        problem.target.calories / current_totals.calories
    } else if problem.target.calories > 0.0 {
        return Err(OptimError::FallbackUndefined);
    } else {
        1.0
    };

    let mut quantities: Vec<f64> = current.iter().map(|q| q * scale).collect();
    problem.clamp(&mut quantities);

    let totals = problem.totals(&quantities);
    Ok(Candidate {
        solver: FALLBACK_SOLVER,
        penalty: penalty(&totals, problem.target),
        quantities,
        totals,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Provenance};

    fn ingredient(name: &str, cal: f64, p: f64, c: f64, f: f64, qty: f64) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            calories_per_100: cal,
            protein_per_100: p,
            carbs_per_100: c,
            fat_per_100: f,
            category: Category::Protein,
            quantity: qty,
            max_quantity: Some(1000.0),
            provenance: Provenance::Original,
        }
    }

    #[test]
    fn test_validate_rejects_negative_target() {
        let target = MacroTarget::new(500.0, -1.0, 45.0, 15.0);
        let err = validate_inputs(&[], &target).unwrap_err();
        match err {
            OptimError::InvalidInput { field, .. } => assert_eq!(field, "target.protein"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_profile() {
        let mut bad = ingredient("Broken", 100.0, 10.0, 10.0, 5.0, 0.0);
        bad.fat_per_100 = f64::NAN;
        let target = MacroTarget::new(500.0, 50.0, 45.0, 15.0);

        let err = validate_inputs(&[bad], &target).unwrap_err();
        match err {
            OptimError::InvalidInput { field, .. } => {
                assert_eq!(field, "ingredients[0].fat_per_100")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_select_best_breaks_ties_by_time() {
        let mk = |solver: &'static str, penalty: f64, ms: u64| Candidate {
            solver,
            quantities: vec![],
            totals: MacroTotals::default(),
            penalty,
            elapsed: Duration::from_millis(ms),
        };

        let winner = select_best(vec![
            mk("slow", 1.0, 100),
            mk("fast", 1.0, 10),
            mk("worse", 2.0, 1),
        ])
        .unwrap();
        assert_eq!(winner.solver, "fast");

        assert!(select_best(vec![]).is_none());
    }

    #[test]
    fn test_fallback_scales_to_target_calories() {
        let ingredients = vec![
            ingredient("A", 100.0, 10.0, 5.0, 2.0, 100.0),
            ingredient("B", 200.0, 5.0, 20.0, 3.0, 50.0),
        ];
        // Current calories: 100 + 100 = 200. Target 400 doubles everything.
        let target = MacroTarget::new(400.0, 0.0, 0.0, 0.0);
        let problem = QuantityProblem::new(&ingredients, &target);

        let candidate = fallback_candidate(&problem).unwrap();
        assert_eq!(candidate.solver, FALLBACK_SOLVER);
        assert_eq!(candidate.quantities, vec![200.0, 100.0]);
        assert!((candidate.totals.calories - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_undefined_with_zero_calories() {
        let ingredients = vec![ingredient("A", 100.0, 10.0, 5.0, 2.0, 0.0)];
        let target = MacroTarget::new(400.0, 0.0, 0.0, 0.0);
        let problem = QuantityProblem::new(&ingredients, &target);

        assert!(matches!(
            fallback_candidate(&problem),
            Err(OptimError::FallbackUndefined)
        ));
    }

    #[test]
    fn test_fallback_keeps_quantities_when_both_zero() {
        let ingredients = vec![ingredient("A", 100.0, 10.0, 5.0, 2.0, 0.0)];
        let target = MacroTarget::new(0.0, 0.0, 0.0, 0.0);
        let problem = QuantityProblem::new(&ingredients, &target);

        let candidate = fallback_candidate(&problem).unwrap();
        assert_eq!(candidate.quantities, vec![0.0]);
        assert_eq!(candidate.penalty, 0.0);
    }

    #[test]
    fn test_portfolio_has_five_solvers() {
        let names: Vec<&str> = build_portfolio(0).iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "exact_program",
                "differential_search",
                "genetic_search",
                "bayesian_search",
                "hybrid_search"
            ]
        );
    }
}
