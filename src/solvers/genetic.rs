use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::solvers::{QuantityProblem, QuantitySolver, SolverBudget, SolverFailure, gaussian};

const POPULATION: usize = 50;
const TOURNAMENT_SIZE: usize = 3;
const BLEND_ALPHA: f64 = 0.5;
const CROSSOVER_PROB: f64 = 0.7;
const MUTATION_PROB: f64 = 0.2;
const GENE_MUTATION_PROB: f64 = 0.1;

/// Mutation sigma as a fraction of each ingredient's bound.
const MUTATION_SIGMA_FRAC: f64 = 0.08;

/// How many of the best individuals survive each generation untouched.
const ELITE_COUNT: usize = 2;

/// Stochastic global search via a generational genetic algorithm: tournament
/// selection, blend crossover and Gaussian mutation. Fitness is the negated
/// penalty, so selection minimizes the shared objective.
pub struct GeneticSearch {
    seed: u64,
}

impl GeneticSearch {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl QuantitySolver for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic_search"
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

        let mut population: Vec<Vec<f64>> = (0..POPULATION)
            .map(|_| {
                (0..n)
                    .map(|j| rng.gen_range(0.0..=problem.bounds[j]))
                    .collect()
            })
            .collect();
        let mut scores: Vec<f64> = population.iter().map(|m| problem.penalty_of(m)).collect();

        for _ in 0..budget.max_iterations {
            if Instant::now() > deadline {
                return Err(SolverFailure::TimedOut);
            }

            // Elites carry over unchanged.
            let mut order: Vec<usize> = (0..POPULATION).collect();
            order.sort_by(|&a, &b| {
                scores[a]
                    .partial_cmp(&scores[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut next: Vec<Vec<f64>> = order
                .iter()
                .take(ELITE_COUNT)
                .map(|&i| population[i].clone())
                .collect();

            while next.len() < POPULATION {
                let a = tournament(&mut rng, &scores);
                let b = tournament(&mut rng, &scores);

                let mut child = if rng.gen_bool(CROSSOVER_PROB) {
                    blend(&mut rng, &population[a], &population[b])
                } else {
                    population[a].clone()
                };

                if rng.gen_bool(MUTATION_PROB) {
                    for j in 0..n {
                        if rng.gen_bool(GENE_MUTATION_PROB) {
                            let sigma = MUTATION_SIGMA_FRAC * problem.bounds[j];
                            child[j] = gaussian(&mut rng, child[j], sigma);
                        }
                    }
                }

                problem.clamp(&mut child);
                next.push(child);
            }

            population = next;
            scores = population.iter().map(|m| problem.penalty_of(m)).collect();
        }

        let best = (0..POPULATION)
            .min_by(|&a, &b| {
                scores[a]
                    .partial_cmp(&scores[b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or(SolverFailure::BudgetExhausted)?;

        let mut winner = population[best].clone();
        problem.check_finite(&winner)?;
        problem.clamp(&mut winner);
        Ok(winner)
    }
}

/// Index of the best of `TOURNAMENT_SIZE` random contestants (lowest penalty).
fn tournament(rng: &mut StdRng, scores: &[f64]) -> usize {
    let mut winner = rng.gen_range(0..scores.len());
    for _ in 1..TOURNAMENT_SIZE {
        let challenger = rng.gen_range(0..scores.len());
        if scores[challenger] < scores[winner] {
            winner = challenger;
        }
    }
    winner
}

/// Blend crossover: each gene sampled uniformly from the parents' range
/// widened by `BLEND_ALPHA` on both sides.
fn blend(rng: &mut StdRng, a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let lo = x.min(y);
            let hi = x.max(y);
            let spread = (hi - lo) * BLEND_ALPHA;
            if hi > lo {
                rng.gen_range((lo - spread)..=(hi + spread))
            } else {
                x
            }
        })
        .collect()
}
