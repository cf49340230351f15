use log::debug;
use serde::Serialize;

use super::engine::{MAX_MONTHS, simulate};
use super::error::{PayoffError, Result};
use super::types::Debt;

#[derive(Debug, Clone, Copy)]
pub struct BudgetSolveConfig {
    pub target_months: u32,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl BudgetSolveConfig {
    /// Bounds run from the sum of minimum payments to the amount that clears
    /// every balance, interest included, in the first month.
    pub fn for_debts(ordered: &[Debt], target_months: u32) -> Self {
        let search_min = ordered.iter().map(|d| d.min_payment).sum();
        let search_max = ordered
            .iter()
            .map(|d| d.balance * (1.0 + d.monthly_rate()))
            .sum::<f64>()
            .max(search_min);
        Self {
            target_months,
            search_min,
            search_max,
            tolerance: 0.01,
            max_iterations: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_budget: f64,
    pub completion_month: Option<u32>,
    pub feasible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSolveResult {
    pub target_months: u32,
    pub solved_budget: Option<f64>,
    pub completion_month: Option<u32>,
    pub iterations: Vec<BudgetSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Finds the smallest monthly budget (to the cent) that retires every debt
/// within `config.target_months`. Relies on a larger budget never delaying
/// completion.
pub fn solve_budget(ordered: &[Debt], config: BudgetSolveConfig) -> Result<BudgetSolveResult> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = evaluate_candidate(ordered, config.search_min);
    let high_eval = evaluate_candidate(ordered, config.search_max);

    let mut solved_budget = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_eval.meets(config.target_months) {
        solved_budget = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Minimum payments alone meet the target.".to_string();
    } else if !high_eval.meets(config.target_months) {
        feasible = false;
        message = "No feasible budget found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let eval = evaluate_candidate(ordered, mid);
            let meets = eval.meets(config.target_months);
            iterations.push(BudgetSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_budget: mid,
                completion_month: eval.completion_month,
                feasible: meets,
            });

            if meets {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_budget = Some(smallest_feasible_cent(ordered, config, lo, hi));
        feasible = true;
        message = if converged {
            "Solved required monthly budget.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let completion_month =
        solved_budget.and_then(|budget| evaluate_candidate(ordered, budget).completion_month);
    debug!(
        "budget solve for {} months: {:?} after {} iterations",
        config.target_months,
        solved_budget,
        iterations.len()
    );

    Ok(BudgetSolveResult {
        target_months: config.target_months,
        solved_budget,
        completion_month,
        iterations,
        converged,
        feasible,
        message,
    })
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    completion_month: Option<u32>,
}

impl CandidateEval {
    fn meets(self, target_months: u32) -> bool {
        self.completion_month
            .is_some_and(|month| month <= target_months)
    }
}

fn evaluate_candidate(ordered: &[Debt], budget: f64) -> CandidateEval {
    CandidateEval {
        completion_month: simulate(ordered, budget)
            .ok()
            .map(|plan| plan.completion_month),
    }
}

fn round_up_to_cent(amount: f64) -> f64 {
    (amount * 100.0 - 1e-6).ceil() / 100.0
}

// `lo` is known infeasible and `hi` feasible; walk the cents in between.
fn smallest_feasible_cent(ordered: &[Debt], config: BudgetSolveConfig, lo: f64, hi: f64) -> f64 {
    let fallback = round_up_to_cent(hi).min(config.search_max);
    if hi - lo > 1.0 {
        return fallback;
    }
    let mut cents = (lo * 100.0).floor() + 1.0;
    loop {
        let candidate = cents / 100.0;
        if candidate >= hi {
            return fallback;
        }
        if evaluate_candidate(ordered, candidate).meets(config.target_months) {
            return candidate;
        }
        cents += 1.0;
    }
}

fn validate_config(config: BudgetSolveConfig) -> Result<()> {
    let invalid =
        |msg: &str| -> Result<()> { Err(PayoffError::InvalidSolverConfig(msg.to_string())) };
    if config.target_months == 0 || config.target_months > MAX_MONTHS {
        return invalid("target_months must be between 1 and 600");
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return invalid("search bounds must be finite");
    }
    if config.search_min < 0.0 {
        return invalid("search_min must be >= 0");
    }
    if config.search_max < config.search_min {
        return invalid("search_max must be >= search_min");
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return invalid("tolerance must be > 0");
    }
    if config.max_iterations == 0 {
        return invalid("max_iterations must be > 0");
    }
    Ok(())
}
