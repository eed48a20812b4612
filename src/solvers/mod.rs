mod bayesian;
mod differential;
mod exact;
mod genetic;
mod hybrid;
mod penalty;

pub use bayesian::BayesianSearch;
pub use differential::DifferentialSearch;
pub use exact::ExactProgram;
pub use genetic::GeneticSearch;
pub use hybrid::HybridSearch;
pub use penalty::{OVERSHOOT_WEIGHT, penalty};

use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

use crate::models::{Ingredient, MacroTarget, MacroTotals};

/// Iteration and wall-clock limits applied to a single solver run.
#[derive(Debug, Clone, Copy)]
pub struct SolverBudget {
    /// Iterations, generations or trials, depending on the solver.
    pub max_iterations: usize,
    pub time_limit: Duration,
}

impl Default for SolverBudget {
    fn default() -> Self {
        Self {
            max_iterations: 120,
            time_limit: Duration::from_millis(750),
        }
    }
}

impl SolverBudget {
    pub fn new(max_iterations: usize, time_limit: Duration) -> Self {
        Self {
            max_iterations,
            time_limit,
        }
    }

    /// A budget that forces immediate failure. Useful in tests.
    pub fn exhausted() -> Self {
        Self {
            max_iterations: 0,
            time_limit: Duration::ZERO,
        }
    }

    pub fn deadline(&self) -> Instant {
        Instant::now() + self.time_limit
    }

    /// A budget with both limits halved, for staged solvers.
    pub fn halved(&self) -> Self {
        Self {
            max_iterations: self.max_iterations / 2,
            time_limit: self.time_limit / 2,
        }
    }
}

/// Why a single solver produced no candidate.
///
/// These are absorbed by the selector and never surface to the caller on
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolverFailure {
    #[error("feasible region is empty")]
    Infeasible,

    #[error("iteration budget exhausted before any usable vector was found")]
    BudgetExhausted,

    #[error("wall-clock limit exceeded")]
    TimedOut,

    #[error("produced non-finite quantities")]
    NonFinite,
}

/// A fully specified quantity problem handed to each solver.
///
/// The ingredient set and target are borrowed read-only; every solver owns
/// its own search state.
pub struct QuantityProblem<'a> {
    pub ingredients: &'a [Ingredient],
    pub target: &'a MacroTarget,
    pub bounds: Vec<f64>,
}

impl<'a> QuantityProblem<'a> {
    pub fn new(ingredients: &'a [Ingredient], target: &'a MacroTarget) -> Self {
        let bounds = ingredients.iter().map(|i| i.bound()).collect();
        Self {
            ingredients,
            target,
            bounds,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.ingredients.len()
    }

    /// Aggregate macros of a quantity vector.
    pub fn totals(&self, quantities: &[f64]) -> MacroTotals {
        let mut totals = MacroTotals::default();
        for (ingredient, &q) in self.ingredients.iter().zip(quantities) {
            totals.add(ingredient.macros_for(q));
        }
        totals
    }

    /// Shared objective: penalty of a quantity vector against the target.
    pub fn penalty_of(&self, quantities: &[f64]) -> f64 {
        penalty(&self.totals(quantities), self.target)
    }

    /// Clamp a vector into the per-ingredient [0, bound] box.
    pub fn clamp(&self, quantities: &mut [f64]) {
        for (q, &bound) in quantities.iter_mut().zip(&self.bounds) {
            *q = q.clamp(0.0, bound);
        }
    }

    /// Reject non-finite output, per the solver contract.
    pub fn check_finite(&self, quantities: &[f64]) -> Result<(), SolverFailure> {
        if quantities.iter().all(|q| q.is_finite()) {
            Ok(())
        } else {
            Err(SolverFailure::NonFinite)
        }
    }
}

/// Uniform contract implemented by every solver in the portfolio.
///
/// Solvers are pure functions of (problem, budget, own seed) and are safe to
/// invoke concurrently.
pub trait QuantitySolver: Send + Sync {
    /// Solver name as reported in results and events.
    fn name(&self) -> &'static str;

    /// Produce a quantity vector in the [0, bound] box, or an explicit failure.
    fn solve(
        &self,
        problem: &QuantityProblem<'_>,
        budget: &SolverBudget,
    ) -> Result<Vec<f64>, SolverFailure>;
}

/// Draw from N(mu, sigma) via the Box-Muller transform.
pub(crate) fn gaussian<R: Rng>(rng: &mut R, mu: f64, sigma: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mu + sigma * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Provenance};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chicken() -> Ingredient {
        Ingredient {
            name: "Chicken Breast".to_string(),
            calories_per_100: 165.0,
            protein_per_100: 31.0,
            carbs_per_100: 0.0,
            fat_per_100: 3.6,
            category: Category::Protein,
            quantity: 0.0,
            max_quantity: None,
            provenance: Provenance::Original,
        }
    }

    #[test]
    fn test_problem_totals_and_clamp() {
        let ingredients = vec![chicken()];
        let target = MacroTarget::new(165.0, 31.0, 0.0, 3.6);
        let problem = QuantityProblem::new(&ingredients, &target);

        assert_eq!(problem.dim(), 1);
        assert_eq!(problem.bounds, vec![300.0]);

        let totals = problem.totals(&[100.0]);
        assert_eq!(totals.calories, 165.0);

        let mut q = vec![500.0];
        problem.clamp(&mut q);
        assert_eq!(q, vec![300.0]);

        let mut neg = vec![-3.0];
        problem.clamp(&mut neg);
        assert_eq!(neg, vec![0.0]);
    }

    #[test]
    fn test_check_finite_rejects_nan() {
        let ingredients = vec![chicken()];
        let target = MacroTarget::new(165.0, 31.0, 0.0, 3.6);
        let problem = QuantityProblem::new(&ingredients, &target);

        assert!(problem.check_finite(&[100.0]).is_ok());
        assert_eq!(
            problem.check_finite(&[f64::NAN]),
            Err(SolverFailure::NonFinite)
        );
    }

    #[test]
    fn test_gaussian_is_roughly_centered() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 2000;
        let mean: f64 = (0..n).map(|_| gaussian(&mut rng, 50.0, 10.0)).sum::<f64>() / n as f64;
        assert!((mean - 50.0).abs() < 1.5);
    }

    #[test]
    fn test_budget_exhausted_helper() {
        let budget = SolverBudget::exhausted();
        assert_eq!(budget.max_iterations, 0);
    }
}
