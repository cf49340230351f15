use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoffError {
    /// Interest outpaces payments; retrying with the same inputs gives the same result.
    #[error(
        "Unsustainable debt load: payoff would take more than 50 years (600 months); gave up at month {months}"
    )]
    UnsustainableDebt { months: u32 },

    #[error("Invalid solver configuration: {0}")]
    InvalidSolverConfig(String),
}

pub type Result<T> = std::result::Result<T, PayoffError>;
