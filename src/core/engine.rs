use log::{debug, trace, warn};

use super::error::{PayoffError, Result};
use super::types::{Debt, MonthRecord, PayoffPlan};

/// Balances at or below this are treated as fully paid.
pub const ZERO_EPSILON: f64 = 1e-9;
/// Runaway guard: 50 years.
pub const MAX_MONTHS: u32 = 600;

#[derive(Debug)]
struct WorkingSet {
    balances: Vec<f64>,
    payoff_months: Vec<Option<u32>>,
    target: usize,
    month: u32,
    total_interest: f64,
    total_paid: f64,
}

impl WorkingSet {
    fn new(ordered: &[Debt]) -> Self {
        Self {
            balances: ordered.iter().map(|d| d.balance).collect(),
            payoff_months: vec![None; ordered.len()],
            target: 0,
            month: 0,
            total_interest: 0.0,
            total_paid: 0.0,
        }
    }

    fn all_paid(&self) -> bool {
        self.target >= self.balances.len()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DebtFlow {
    interest: f64,
    payment: f64,
}

/// Runs the month-by-month payoff for debts already in priority order.
///
/// The caller is expected to have checked that `monthly_budget` covers every
/// minimum payment; if it does not, the run ends in
/// [`PayoffError::UnsustainableDebt`].
pub fn simulate(ordered: &[Debt], monthly_budget: f64) -> Result<PayoffPlan> {
    run_simulation(ordered, monthly_budget, None)
}

/// Same as [`simulate`], also returning one [`MonthRecord`] per simulated month.
pub fn simulate_with_schedule(
    ordered: &[Debt],
    monthly_budget: f64,
) -> Result<(PayoffPlan, Vec<MonthRecord>)> {
    let mut schedule = Vec::new();
    let plan = run_simulation(ordered, monthly_budget, Some(&mut schedule))?;
    Ok((plan, schedule))
}

/// Month in which the last debt is retired, or 0 when nothing has a payoff month.
pub fn longest_payoff_month(debts: &[Debt]) -> u32 {
    debts
        .iter()
        .filter_map(|d| d.payoff_month)
        .max()
        .unwrap_or(0)
}

fn is_settled(balance: f64) -> bool {
    balance.abs() <= ZERO_EPSILON
}

fn run_simulation(
    ordered: &[Debt],
    monthly_budget: f64,
    mut schedule: Option<&mut Vec<MonthRecord>>,
) -> Result<PayoffPlan> {
    let mut state = WorkingSet::new(ordered);
    debug!(
        "simulating payoff of {} debts with a monthly budget of {:.2}",
        ordered.len(),
        monthly_budget
    );

    while !state.all_paid() {
        state.month += 1;
        if state.month > MAX_MONTHS {
            warn!(
                "payoff not reached within {MAX_MONTHS} months; {} of {} debts still open",
                state.payoff_months.iter().filter(|m| m.is_none()).count(),
                ordered.len()
            );
            return Err(PayoffError::UnsustainableDebt {
                months: state.month,
            });
        }

        let mut flows = vec![DebtFlow::default(); ordered.len()];
        let available =
            apply_interest_and_minimums(ordered, &mut state, &mut flows, monthly_budget);
        let available = cascade_surplus(&mut state, &mut flows, available);
        settle_paid_debts(ordered, &mut state);
        advance_target(&mut state);

        let month_paid: f64 = flows.iter().map(|f| f.payment).sum();
        state.total_paid += month_paid;
        trace!(
            "month {}: paid {:.2}, unallocated {:.2}, remaining {:.2}, target {}",
            state.month,
            month_paid,
            available,
            state.balances.iter().sum::<f64>(),
            state.target
        );

        if let Some(rows) = schedule.as_deref_mut() {
            rows.push(MonthRecord {
                month: state.month,
                interest: flows.iter().map(|f| f.interest).collect(),
                payment: flows.iter().map(|f| f.payment).collect(),
                end_balance: state.balances.clone(),
                unallocated: available.max(0.0),
            });
        }
    }

    let debts: Vec<Debt> = ordered
        .iter()
        .zip(&state.payoff_months)
        .map(|(debt, &payoff_month)| Debt {
            payoff_month,
            ..debt.clone()
        })
        .collect();
    let completion_month = longest_payoff_month(&debts);
    debug!(
        "all debts retired in month {completion_month}; interest paid {:.2}",
        state.total_interest
    );

    Ok(PayoffPlan {
        monthly_budget,
        debts,
        completion_month,
        total_interest: state.total_interest,
        total_paid: state.total_paid,
    })
}

// Every open debt accrues interest and receives its minimum, in index order.
fn apply_interest_and_minimums(
    ordered: &[Debt],
    state: &mut WorkingSet,
    flows: &mut [DebtFlow],
    mut available: f64,
) -> f64 {
    for (i, debt) in ordered.iter().enumerate() {
        let mut balance = state.balances[i];
        if balance <= ZERO_EPSILON {
            continue;
        }
        let interest = balance * debt.monthly_rate();
        balance += interest;
        let payment = balance.min(debt.min_payment);
        balance -= payment;
        available -= payment;

        state.balances[i] = balance;
        state.total_interest += interest;
        flows[i].interest = interest;
        flows[i].payment = payment;
    }
    available
}

// Whatever is left goes to the target, rolling down the priority order.
fn cascade_surplus(state: &mut WorkingSet, flows: &mut [DebtFlow], mut available: f64) -> f64 {
    for i in state.target..state.balances.len() {
        if available <= ZERO_EPSILON {
            break;
        }
        let balance = state.balances[i];
        if balance <= ZERO_EPSILON {
            continue;
        }
        let payment = balance.min(available);
        state.balances[i] = balance - payment;
        available -= payment;
        flows[i].payment += payment;
    }
    available
}

fn settle_paid_debts(ordered: &[Debt], state: &mut WorkingSet) {
    for (i, debt) in ordered.iter().enumerate() {
        if state.payoff_months[i].is_none() && is_settled(state.balances[i]) {
            trace!("{} paid off in month {}", debt.name, state.month);
            state.payoff_months[i] = Some(state.month);
        }
    }
}

fn advance_target(state: &mut WorkingSet) {
    while state.target < state.payoff_months.len() && state.payoff_months[state.target].is_some() {
        state.target += 1;
    }
}
