use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::solvers::{QuantityProblem, QuantitySolver, SolverBudget, SolverFailure, gaussian};

const POPULATION: usize = 30;
const DIFFERENTIAL_WEIGHT: f64 = 0.8;
const CROSSOVER_RATE: f64 = 0.9;

/// Generations without a global improvement before the search stops early.
const STALL_LIMIT: usize = 25;

/// Relative jitter used to spread a seeded population around its center.
const SEED_JITTER_FRAC: f64 = 0.15;

/// Stochastic global search via differential evolution (rand/1 mutation with
/// binomial recombination).
pub struct DifferentialSearch {
    seed: u64,
    initial: Option<Vec<f64>>,
}

impl DifferentialSearch {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            initial: None,
        }
    }

    /// Start the population clustered around a known-good vector instead of
    /// uniformly across the box. Used by the hybrid refinement stage.
    pub fn seeded_around(seed: u64, initial: Vec<f64>) -> Self {
        Self {
            seed,
            initial: Some(initial),
        }
    }

    fn initial_population(&self, problem: &QuantityProblem<'_>, rng: &mut StdRng) -> Vec<Vec<f64>> {
        let n = problem.dim();
        let mut population = Vec::with_capacity(POPULATION);

        if let Some(center) = &self.initial {
            let mut exact = center.clone();
            problem.clamp(&mut exact);
            population.push(exact.clone());

            for _ in 1..POPULATION {
                let mut member: Vec<f64> = (0..n)
                    .map(|j| gaussian(rng, exact[j], SEED_JITTER_FRAC * problem.bounds[j]))
                    .collect();
                problem.clamp(&mut member);
                population.push(member);
            }
        } else {
            for _ in 0..POPULATION {
                let member: Vec<f64> = (0..n)
                    .map(|j| rng.gen_range(0.0..=problem.bounds[j]))
                    .collect();
                population.push(member);
            }
        }

        population
    }
}

impl QuantitySolver for DifferentialSearch {
    fn name(&self) -> &'static str {
        "differential_search"
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

        let mut population = self.initial_population(problem, &mut rng);
        let mut scores: Vec<f64> = population.iter().map(|m| problem.penalty_of(m)).collect();

        let mut best_idx = argmin(&scores);
        let mut best = population[best_idx].clone();
        let mut best_score = scores[best_idx];
        let mut stall = 0usize;

        for _ in 0..budget.max_iterations {
            if Instant::now() > deadline {
                return Err(SolverFailure::TimedOut);
            }

            let mut improved = false;
            for i in 0..POPULATION {
                let (r1, r2, r3) = distinct_indices(&mut rng, POPULATION, i);
                let j_rand = rng.gen_range(0..n);

                let mut trial: Vec<f64> = (0..n)
                    .map(|j| {
                        if j == j_rand || rng.gen_bool(CROSSOVER_RATE) {
                            population[r1][j]
                                + DIFFERENTIAL_WEIGHT * (population[r2][j] - population[r3][j])
                        } else {
                            population[i][j]
                        }
                    })
                    .collect();
                problem.clamp(&mut trial);

                let trial_score = problem.penalty_of(&trial);
                if trial_score <= scores[i] {
                    if trial_score < best_score {
                        best_score = trial_score;
                        best = trial.clone();
                        improved = true;
                    }
                    population[i] = trial;
                    scores[i] = trial_score;
                }
            }

            if improved {
                stall = 0;
            } else {
                stall += 1;
                if stall >= STALL_LIMIT {
                    break;
                }
            }
        }

        best_idx = argmin(&scores);
        if scores[best_idx] < best_score {
            best = population[best_idx].clone();
        }

        problem.check_finite(&best)?;
        problem.clamp(&mut best);
        Ok(best)
    }
}

fn argmin(scores: &[f64]) -> usize {
    let mut idx = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s < scores[idx] {
            idx = i;
        }
    }
    idx
}

/// Three distinct population indices, all different from `avoid`.
fn distinct_indices(rng: &mut StdRng, len: usize, avoid: usize) -> (usize, usize, usize) {
    let mut pick = |taken: &[usize]| loop {
        let candidate = rng.gen_range(0..len);
        if candidate != avoid && !taken.contains(&candidate) {
            return candidate;
        }
    };
    let r1 = pick(&[]);
    let r2 = pick(&[r1]);
    let r3 = pick(&[r1, r2]);
    (r1, r2, r3)
}
