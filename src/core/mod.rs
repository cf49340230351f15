mod engine;
mod error;
mod prioritizer;
mod solver;
mod types;

pub use engine::{
    MAX_MONTHS, ZERO_EPSILON, longest_payoff_month, simulate, simulate_with_schedule,
};
pub use error::PayoffError;
pub use prioritizer::order;
pub use solver::{BudgetSolveConfig, BudgetSolveIteration, BudgetSolveResult, solve_budget};
pub use types::{Debt, MonthRecord, PayoffPlan, Strategy};
