//! Debt and budget gathering: delimited text files and interactive prompts.
//!
//! Everything here runs before the engine sees any data, so every debt that
//! leaves this module has a non-empty name, a positive balance and
//! non-negative rate and minimum payment, and every budget covers the
//! minimum payments.

use std::io::{BufRead, Write};

use log::{debug, info};
use thiserror::Error;

use crate::core::{Debt, Strategy};

#[derive(Error, Debug)]
pub enum InputError {
    #[error(
        "entry {entry}: expected 4 fields (name, balance, annual rate, minimum payment), found {found}"
    )]
    FieldCount { entry: usize, found: usize },

    #[error("entry {entry}: debt name must not be empty")]
    EmptyName { entry: usize },

    #[error("entry {entry}: {field} must be a number, got {value:?}")]
    NotANumber {
        entry: usize,
        field: &'static str,
        value: String,
    },

    #[error("entry {entry}: {field} must be {requirement}, got {value}")]
    OutOfRange {
        entry: usize,
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("monthly budget must be a finite number, got {0}")]
    InvalidBudget(f64),

    #[error(
        "You do not have enough disposable income to meet your minimum payments: a budget of ${budget:.2} is below the ${required:.2} required"
    )]
    InsufficientBudget { budget: f64, required: f64 },

    #[error("input ended while waiting for {0}")]
    UnexpectedEof(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InputError>;

/// Parses a money or percentage amount. Surrounding whitespace, a leading
/// `$` and a trailing `%` are accepted.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    trimmed
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn parse_strategy_choice(raw: &str) -> Option<Strategy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "snowball" => Some(Strategy::Snowball),
        "2" | "avalanche" => Some(Strategy::Avalanche),
        _ => None,
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}

fn parse_field(entry: usize, field: &'static str, raw: &str) -> Result<f64> {
    parse_amount(raw).ok_or_else(|| InputError::NotANumber {
        entry,
        field,
        value: raw.trim().to_string(),
    })
}

/// Checks the per-field constraints the engine relies on.
pub fn validate_debt(entry: usize, debt: &Debt) -> Result<()> {
    if debt.name.trim().is_empty() {
        return Err(InputError::EmptyName { entry });
    }
    let checks: [(&'static str, f64, fn(f64) -> bool, &'static str); 3] = [
        ("balance", debt.balance, is_positive, "greater than 0"),
        (
            "annual rate",
            debt.annual_rate,
            is_non_negative,
            "0 or more",
        ),
        (
            "minimum payment",
            debt.min_payment,
            is_non_negative,
            "0 or more",
        ),
    ];
    for (field, value, ok, requirement) in checks {
        if !value.is_finite() || !ok(value) {
            return Err(InputError::OutOfRange {
                entry,
                field,
                requirement,
                value,
            });
        }
    }
    Ok(())
}

/// Parses one debt per line: `name<d>balance<d>annual_rate<d>min_payment`.
///
/// The numeric fields are split off from the right, so names may contain the
/// delimiter. Blank lines and `#` comments are skipped.
pub fn parse_debts(text: &str, delimiter: char) -> Result<Vec<Debt>> {
    let mut debts = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let entry = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.rsplitn(4, delimiter).collect();
        let [min_payment, annual_rate, balance, name] = fields[..] else {
            return Err(InputError::FieldCount {
                entry,
                found: fields.len(),
            });
        };

        let debt = Debt::new(
            name.trim(),
            parse_field(entry, "balance", balance)?,
            parse_field(entry, "annual rate", annual_rate)?,
            parse_field(entry, "minimum payment", min_payment)?,
        );
        validate_debt(entry, &debt)?;
        debts.push(debt);
    }
    info!("parsed {} debts", debts.len());
    Ok(debts)
}

/// Rejects a budget that cannot cover every minimum payment.
pub fn check_budget(debts: &[Debt], budget: f64) -> Result<f64> {
    if !budget.is_finite() {
        return Err(InputError::InvalidBudget(budget));
    }
    let required: f64 = debts.iter().map(|d| d.min_payment).sum();
    if budget < required {
        return Err(InputError::InsufficientBudget { budget, required });
    }
    Ok(budget)
}

/// Question-and-answer input over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_until<T>(
        &mut self,
        prompt: &str,
        retry: &str,
        what: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T> {
        let mut current = prompt;
        loop {
            let answer = self.ask(current)?.ok_or(InputError::UnexpectedEof(what))?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            debug!("rejected {what}: {answer:?}");
            current = retry;
        }
    }

    /// Reads debts until a blank name or end of input.
    pub fn read_debts(&mut self) -> Result<Vec<Debt>> {
        let mut debts = Vec::new();
        loop {
            let name = self.ask(
                "Enter the name of a debt, or press Enter to quit and run the calculation: ",
            )?;
            let Some(name) = name.filter(|n| !n.is_empty()) else {
                break;
            };

            let balance = self.ask_until(
                "Enter the current debt balance: ",
                "Error, you must enter a number greater than 0.0. Try again: ",
                "a debt balance",
                |raw| parse_amount(raw).filter(|v| is_positive(*v)),
            )?;
            let annual_rate = self.ask_until(
                "Enter the annual interest rate on the debt: ",
                "Error, you must enter a non-negative number. Try again: ",
                "an interest rate",
                |raw| parse_amount(raw).filter(|v| is_non_negative(*v)),
            )?;
            let min_payment = self.ask_until(
                "Enter the minimum monthly payment on the debt: ",
                "Error, you must enter a non-negative number. Try again: ",
                "a minimum payment",
                |raw| parse_amount(raw).filter(|v| is_non_negative(*v)),
            )?;

            debts.push(Debt::new(name, balance, annual_rate, min_payment));
        }
        info!("read {} debts interactively", debts.len());
        Ok(debts)
    }

    pub fn read_budget(&mut self) -> Result<f64> {
        self.ask_until(
            "Enter the total monthly amount you can spend on debt payments: ",
            "Incorrect input. You must enter a number: ",
            "a monthly budget",
            parse_amount,
        )
    }

    pub fn read_strategy(&mut self) -> Result<Strategy> {
        writeln!(
            self.output,
            "\nDebt payoff methods:\n1. Debt Snowball (smallest debt first)\n2. Debt Avalanche (highest interest rate first)"
        )?;
        self.ask_until(
            "Enter your selection: ",
            "Invalid entry, you must enter either \"1\" or \"2\": ",
            "a payoff method",
            parse_strategy_choice,
        )
    }
}
