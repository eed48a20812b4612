use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::solvers::{QuantityProblem, QuantitySolver, SolverBudget, SolverFailure, gaussian};

/// Trials drawn between proposal updates.
const BATCH_SIZE: usize = 16;

/// Share of a batch used to re-fit the proposal.
const ELITE_FRACTION: f64 = 0.25;

/// Sigma never shrinks below this fraction of the bound, so late trials keep
/// a little exploration.
const MIN_SIGMA_FRAC: f64 = 0.02;

/// Trials whose projected calories exceed this multiple of the target are
/// pruned without scoring.
const PRUNE_CALORIE_FACTOR: f64 = 3.0;

/// Sequential model-based search: samples quantity vectors from an adaptive
/// per-dimension Gaussian proposal, re-fits the proposal to the elite share
/// of observed trials, and prunes clearly unpromising samples early.
pub struct BayesianSearch {
    seed: u64,
}

impl BayesianSearch {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl QuantitySolver for BayesianSearch {
    fn name(&self) -> &'static str {
        "bayesian_search"
    }

    fn solve(
        &self,
        problem: &QuantityProblem<'_>,
        budget: &SolverBudget,
    ) -> Result<Vec<f64>, SolverFailure> {
        if budget.max_iterations == 0 {
            return Err(SolverFailure::BudgetExhausted);
        }
        let n = problem.dim();
        if n == 0 {
            return Ok(Vec::new());
        }

        let deadline = budget.deadline();
        let mut rng = StdRng::seed_from_u64(self.seed);

        // Wide initial proposal centered on the middle of the box.
        let mut mean: Vec<f64> = problem.bounds.iter().map(|b| b / 2.0).collect();
        let mut sigma: Vec<f64> = problem.bounds.iter().map(|b| b / 2.0).collect();

        let mut best: Option<(Vec<f64>, f64)> = None;
        let mut trials_left = budget.max_iterations;

        while trials_left > 0 {
            if Instant::now() > deadline {
                return Err(SolverFailure::TimedOut);
            }

            let batch = BATCH_SIZE.min(trials_left);
            trials_left -= batch;

            let mut observed: Vec<(Vec<f64>, f64)> = Vec::with_capacity(batch);
            for _ in 0..batch {
                let mut sample: Vec<f64> = (0..n)
                    .map(|j| gaussian(&mut rng, mean[j], sigma[j]))
                    .collect();
                problem.clamp(&mut sample);

                if should_prune(problem, &sample) {
                    continue;
                }

                let score = problem.penalty_of(&sample);
                observed.push((sample, score));
            }

            if observed.is_empty() {
                continue;
            }

            observed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if best
                .as_ref()
                .map(|(_, score)| observed[0].1 < *score)
                .unwrap_or(true)
            {
                best = Some(observed[0].clone());
            }

            // Re-fit the proposal to the elites of this batch.
            let elite_count = ((observed.len() as f64 * ELITE_FRACTION).ceil() as usize).max(1);
            let elites = &observed[..elite_count];
            for j in 0..n {
                let m: f64 = elites.iter().map(|(v, _)| v[j]).sum::<f64>() / elite_count as f64;
                let var: f64 = elites.iter().map(|(v, _)| (v[j] - m).powi(2)).sum::<f64>()
                    / elite_count as f64;
                mean[j] = m;
                sigma[j] = var.sqrt().max(MIN_SIGMA_FRAC * problem.bounds[j]);
            }
        }

        let (mut quantities, _) = best.ok_or(SolverFailure::BudgetExhausted)?;
        problem.check_finite(&quantities)?;
        problem.clamp(&mut quantities);
        Ok(quantities)
    }
}

/// Cheap rejection check before full scoring.
fn should_prune(problem: &QuantityProblem<'_>, sample: &[f64]) -> bool {
    let target_calories = problem.target.calories;
    if target_calories <= 0.0 {
        return false;
    }
    let projected: f64 = problem
        .ingredients
        .iter()
        .zip(sample)
        .map(|(i, &q)| q / 100.0 * i.calories_per_100)
        .sum();
    projected > PRUNE_CALORIE_FACTOR * target_calories
}
