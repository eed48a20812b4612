use crate::solvers::{
    DifferentialSearch, GeneticSearch, QuantityProblem, QuantitySolver, SolverBudget,
    SolverFailure,
};

/// Two-stage solver: a coarse genetic pass finds a promising region, then a
/// differential pass seeded around the genetic winner refines it. If the
/// refinement stage fails, the genetic result is returned unchanged.
pub struct HybridSearch {
    seed: u64,
}

impl HybridSearch {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl QuantitySolver for HybridSearch {
    fn name(&self) -> &'static str {
        "hybrid_search"
    }

    fn solve(
        &self,
        problem: &QuantityProblem<'_>,
        budget: &SolverBudget,
    ) -> Result<Vec<f64>, SolverFailure> {
        if budget.max_iterations == 0 {
            return Err(SolverFailure::BudgetExhausted);
        }

        let stage_budget = budget.halved();
        if stage_budget.max_iterations == 0 {
            return Err(SolverFailure::BudgetExhausted);
        }

        let coarse = GeneticSearch::new(self.seed).solve(problem, &stage_budget)?;

        let refiner = DifferentialSearch::seeded_around(self.seed.wrapping_add(1), coarse.clone());
        match refiner.solve(problem, &stage_budget) {
            Ok(refined) => {
                if problem.penalty_of(&refined) <= problem.penalty_of(&coarse) {
                    Ok(refined)
                } else {
                    Ok(coarse)
                }
            }
            Err(_) => Ok(coarse),
        }
    }
}
