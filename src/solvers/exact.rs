use std::time::Instant;

use crate::models::Macro;
use crate::solvers::{QuantityProblem, QuantitySolver, SolverBudget, SolverFailure};

const EPS: f64 = 1e-9;

/// Deterministic linear-programming solver.
///
/// Minimizes total calories subject to protein, carb and fat floors at the
/// target values, with a [0, bound] box per ingredient, using a dense
/// two-phase simplex. Fails with `Infeasible` when the floors cannot be met
/// even at full bounds.
pub struct ExactProgram;

impl ExactProgram {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExactProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantitySolver for ExactProgram {
    fn name(&self) -> &'static str {
        "exact_program"
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

        // One >= row per macro floor with a positive target; coefficients are
        // per-gram contributions.
        let mut floors: Vec<(Vec<f64>, f64)> = Vec::new();
        for m in [Macro::Protein, Macro::Carbs, Macro::Fat] {
            let t = problem.target.get(m);
            if t <= 0.0 {
                continue;
            }
            let coeffs: Vec<f64> = problem
                .ingredients
                .iter()
                .map(|i| i.per_100(m) / 100.0)
                .collect();

            // Coefficients are non-negative, so the box corner at full bounds
            // is the best any vector can do for this floor.
            let capacity: f64 = coeffs.iter().zip(&problem.bounds).map(|(a, u)| a * u).sum();
            if capacity + EPS < t {
                return Err(SolverFailure::Infeasible);
            }
            floors.push((coeffs, t));
        }

        let objective: Vec<f64> = problem
            .ingredients
            .iter()
            .map(|i| i.calories_per_100 / 100.0)
            .collect();

        let mut quantities = simplex_solve(
            &floors,
            &problem.bounds,
            &objective,
            budget.max_iterations,
            budget.deadline(),
        )?;

        problem.check_finite(&quantities)?;
        problem.clamp(&mut quantities);
        Ok(quantities)
    }
}

/// Two-phase simplex for: minimize c.q s.t. A q >= b, 0 <= q <= u.
///
/// Column layout: [q (n)] [surplus (m1)] [bound slack (n)] [artificial (m1)],
/// where m1 is the number of floor rows. Bland's rule throughout, so the
/// method terminates without cycling; the pivot count doubles as the
/// iteration budget.
fn simplex_solve(
    floors: &[(Vec<f64>, f64)],
    bounds: &[f64],
    objective: &[f64],
    max_pivots: usize,
    deadline: Instant,
) -> Result<Vec<f64>, SolverFailure> {
    let n = bounds.len();
    let m1 = floors.len();
    let m = m1 + n;
    let art_start = n + m1 + n;
    let ncols = art_start + m1;

    let mut tableau = vec![vec![0.0; ncols + 1]; m];
    for (j, (coeffs, b)) in floors.iter().enumerate() {
        tableau[j][..n].copy_from_slice(coeffs);
        tableau[j][n + j] = -1.0;
        tableau[j][art_start + j] = 1.0;
        tableau[j][ncols] = *b;
    }
    for i in 0..n {
        let row = m1 + i;
        tableau[row][i] = 1.0;
        tableau[row][n + m1 + i] = 1.0;
        tableau[row][ncols] = bounds[i];
    }

    // Artificials basic on floor rows, bound slacks on box rows.
    let mut basis: Vec<usize> = (0..m1)
        .map(|j| art_start + j)
        .chain((0..n).map(|i| n + m1 + i))
        .collect();

    let mut pivots_left = max_pivots;

    // Phase 1: drive the artificials to zero.
    let mut phase1_cost = vec![0.0; ncols];
    for j in 0..m1 {
        phase1_cost[art_start + j] = 1.0;
    }
    run_simplex(
        &mut tableau,
        &mut basis,
        &phase1_cost,
        ncols,
        &mut pivots_left,
        deadline,
    )?;

    let infeasibility: f64 = basis
        .iter()
        .enumerate()
        .filter(|&(_, &col)| col >= art_start)
        .map(|(row, _)| tableau[row][ncols])
        .sum();
    if infeasibility > 1e-7 {
        return Err(SolverFailure::Infeasible);
    }

    // Pivot any leftover degenerate artificials out of the basis so phase 2
    // cannot grow them again.
    for row in 0..m {
        if basis[row] >= art_start {
            if let Some(col) = (0..art_start).find(|&j| tableau[row][j].abs() > EPS) {
                pivot(&mut tableau, &mut basis, row, col, ncols);
            }
        }
    }

    // Phase 2: minimize calories, artificial columns locked out.
    let mut phase2_cost = vec![0.0; ncols];
    phase2_cost[..n].copy_from_slice(objective);
    run_simplex(
        &mut tableau,
        &mut basis,
        &phase2_cost,
        art_start,
        &mut pivots_left,
        deadline,
    )?;

    let mut quantities = vec![0.0; n];
    for (row, &col) in basis.iter().enumerate() {
        if col < n {
            quantities[col] = tableau[row][ncols];
        }
    }
    Ok(quantities)
}

fn run_simplex(
    tableau: &mut [Vec<f64>],
    basis: &mut [usize],
    cost: &[f64],
    enterable_cols: usize,
    pivots_left: &mut usize,
    deadline: Instant,
) -> Result<(), SolverFailure> {
    let m = tableau.len();
    let ncols = tableau[0].len() - 1;

    loop {
        if Instant::now() > deadline {
            return Err(SolverFailure::TimedOut);
        }

        // Bland's rule: first column with a negative reduced cost.
        let mut entering = None;
        for j in 0..enterable_cols {
            let mut reduced = cost[j];
            for i in 0..m {
                let basic_cost = cost[basis[i]];
                if basic_cost != 0.0 {
                    reduced -= basic_cost * tableau[i][j];
                }
            }
            if reduced < -EPS {
                entering = Some(j);
                break;
            }
        }
        let Some(e) = entering else {
            return Ok(());
        };

        // Ratio test; ties go to the smallest basis index (Bland).
        let mut leaving: Option<usize> = None;
        let mut best_ratio = f64::INFINITY;
        for i in 0..m {
            if tableau[i][e] > EPS {
                let ratio = tableau[i][ncols] / tableau[i][e];
                let better = ratio < best_ratio - EPS
                    || (ratio < best_ratio + EPS
                        && leaving.map_or(true, |l| basis[i] < basis[l]));
                if better {
                    best_ratio = ratio;
                    leaving = Some(i);
                }
            }
        }
        // Every variable is boxed, so an unbounded ray means the arithmetic
        // has broken down.
        let Some(l) = leaving else {
            return Err(SolverFailure::NonFinite);
        };

        if *pivots_left == 0 {
            return Err(SolverFailure::BudgetExhausted);
        }
        *pivots_left -= 1;

        pivot(tableau, basis, l, e, ncols);
    }
}

fn pivot(tableau: &mut [Vec<f64>], basis: &mut [usize], row: usize, col: usize, ncols: usize) {
    let pv = tableau[row][col];
    for value in tableau[row].iter_mut() {
        *value /= pv;
    }
    for i in 0..tableau.len() {
        if i == row {
            continue;
        }
        let factor = tableau[i][col];
        if factor != 0.0 {
            for j in 0..=ncols {
                tableau[i][j] -= factor * tableau[row][j];
            }
        }
    }
    basis[row] = col;
}
