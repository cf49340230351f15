use serde::Serialize;

/// Order in which surplus payment capacity is directed at debts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Smallest balance first.
    Snowball,
    /// Highest annual interest rate first.
    Avalanche,
}

impl Strategy {
    pub fn label(self) -> &'static str {
        match self {
            Strategy::Snowball => "debt snowball (smallest balance first)",
            Strategy::Avalanche => "debt avalanche (highest interest rate first)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    /// Nominal annual rate in percent, e.g. `12.8`.
    pub annual_rate: f64,
    pub min_payment: f64,
    pub payoff_month: Option<u32>,
}

impl Debt {
    pub fn new(name: impl Into<String>, balance: f64, annual_rate: f64, min_payment: f64) -> Self {
        Self {
            name: name.into(),
            balance,
            annual_rate,
            min_payment,
            payoff_month: None,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 1200.0
    }

    pub fn is_paid_off(&self) -> bool {
        self.payoff_month.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPlan {
    pub monthly_budget: f64,
    /// Debts in priority order with their starting balances and payoff months.
    pub debts: Vec<Debt>,
    pub completion_month: u32,
    pub total_interest: f64,
    pub total_paid: f64,
}

/// One simulated month. Per-debt vectors are parallel to `PayoffPlan::debts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub month: u32,
    pub interest: Vec<f64>,
    pub payment: Vec<f64>,
    pub end_balance: Vec<f64>,
    pub unallocated: f64,
}

impl MonthRecord {
    pub fn total_payment(&self) -> f64 {
        self.payment.iter().sum()
    }

    pub fn remaining_balance(&self) -> f64 {
        self.end_balance.iter().sum()
    }
}
