use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use log::info;

use crate::core::{BudgetSolveResult, Debt, MonthRecord, PayoffPlan, Strategy};

pub const DEFAULT_REPORT_PATH: &str = "Debt Payoff.txt";

const COLUMN_LABELS: [&str; 5] = [
    "Name/description",
    "Current balance",
    "Annual Interest Rate",
    "Minimum Monthly Payment",
    "Months until Payoff",
];
const BALANCE_WIDTH: usize = 17;
const RATE_WIDTH: usize = 22;
const MIN_PAYMENT_WIDTH: usize = 25;
const MONTHS_WIDTH: usize = 22;
const SCHEDULE_MIN_WIDTH: usize = 12;

/// Plain-text payoff report.
pub struct Report<'a> {
    pub plan: &'a PayoffPlan,
    pub strategy: Strategy,
    pub schedule: Option<&'a [MonthRecord]>,
    pub budget_goal: Option<&'a BudgetSolveResult>,
}

pub fn render_report(
    plan: &PayoffPlan,
    strategy: Strategy,
    schedule: Option<&[MonthRecord]>,
    budget_goal: Option<&BudgetSolveResult>,
) -> String {
    Report {
        plan,
        strategy,
        schedule,
        budget_goal,
    }
    .to_string()
}

fn name_width(debts: &[Debt]) -> usize {
    debts
        .iter()
        .map(|d| d.name.chars().count())
        .chain(std::iter::once(COLUMN_LABELS[0].len()))
        .max()
        .unwrap_or(0)
        + 2
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        writeln!(
            f,
            "Here is your completed debt payoff plan assuming total payments of ${} per month, using the {}. \
             Make the minimum payment on every debt, put all of your extra money toward the first debt in the list \
             until it is paid off, then continue down the list. You should be debt free in about {} months.",
            plan.monthly_budget,
            self.strategy.label(),
            plan.completion_month
        )?;
        writeln!(f)?;

        let name_w = name_width(&plan.debts);
        let widths = [
            name_w,
            BALANCE_WIDTH,
            RATE_WIDTH,
            MIN_PAYMENT_WIDTH,
            MONTHS_WIDTH,
        ];
        for (label, width) in COLUMN_LABELS.iter().zip(widths) {
            write!(f, "{label:<width$}")?;
        }
        writeln!(f)?;

        for debt in &plan.debts {
            let months = debt
                .payoff_month
                .map_or_else(|| "-".to_string(), |m| m.to_string());
            writeln!(
                f,
                "{:<name_w$}{:<BALANCE_WIDTH$}{:<RATE_WIDTH$}{:<MIN_PAYMENT_WIDTH$}{:<MONTHS_WIDTH$}",
                debt.name,
                money(debt.balance),
                format!("{}%", debt.annual_rate),
                format!("${}", debt.min_payment),
                months,
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Total interest paid: {}. Total paid: {}.",
            money(plan.total_interest),
            money(plan.total_paid)
        )?;

        if let Some(goal) = self.budget_goal {
            match goal.solved_budget {
                Some(budget) if goal.feasible => writeln!(
                    f,
                    "To be debt free within {} months you need about {} per month.",
                    goal.target_months,
                    money(budget)
                )?,
                _ => writeln!(
                    f,
                    "No monthly budget retires every debt within {} months: {}",
                    goal.target_months, goal.message
                )?,
            }
        }

        if let Some(rows) = self.schedule {
            write_schedule(f, &plan.debts, rows)?;
        }
        Ok(())
    }
}

fn write_schedule(f: &mut fmt::Formatter<'_>, debts: &[Debt], rows: &[MonthRecord]) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "Remaining balance at the end of each month:")?;
    let widths: Vec<usize> = debts
        .iter()
        .map(|d| d.name.chars().count().max(SCHEDULE_MIN_WIDTH) + 2)
        .collect();

    write!(f, "{:<8}", "Month")?;
    for (debt, width) in debts.iter().zip(widths.iter().copied()) {
        write!(f, "{:<width$}", debt.name)?;
    }
    writeln!(f, "{:<SCHEDULE_MIN_WIDTH$}Interest", "Total")?;

    for row in rows {
        write!(f, "{:<8}", row.month)?;
        for (balance, width) in row.end_balance.iter().zip(widths.iter().copied()) {
            write!(f, "{:<width$}", money(*balance))?;
        }
        write!(f, "{:<SCHEDULE_MIN_WIDTH$}", money(row.remaining_balance()))?;
        writeln!(f, "{}", money(row.interest.iter().sum()))?;
    }
    Ok(())
}

pub fn write_report(path: &Path, report: &str) -> io::Result<()> {
    fs::write(path, report)?;
    info!("wrote payoff report to {}", path.display());
    Ok(())
}

/// Reads the written report back and prints it, preceded by where it lives.
pub fn echo_report<W: Write>(path: &Path, out: &mut W) -> io::Result<()> {
    let contents = fs::read_to_string(path)?;
    let shown = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    writeln!(
        out,
        "\nYour debt plan has been calculated, the following information has been written to {}:\n",
        shown.display()
    )?;
    out.write_all(contents.as_bytes())?;
    out.flush()
}
