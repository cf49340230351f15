use super::types::{Debt, Strategy};

/// Returns the debts in payoff priority order. The sort is stable, so ties
/// keep their input order.
pub fn order(debts: &[Debt], strategy: Strategy) -> Vec<Debt> {
    let mut ordered = debts.to_vec();
    match strategy {
        Strategy::Snowball => ordered.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
        Strategy::Avalanche => ordered.sort_by(|a, b| b.annual_rate.total_cmp(&a.annual_rate)),
    }
    ordered
}
