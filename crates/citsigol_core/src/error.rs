use thiserror::Error;

/// Contract errors raised by the map engine.
///
/// Domain exits and non-convergence are not errors: they are reported through
/// empty point-sets and [`crate::convergence::ConvergenceOutcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("Invalid branch tag {0}; expected -1, 0, or 1.")]
    InvalidBranch(i32),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Map parameter must be finite, got {0}.")]
    InvalidParameter(f64),
    #[error("Period must be at least 1, got {0}.")]
    InvalidPeriod(usize),
    #[error("Period {period} exceeds the supported maximum of {max}.")]
    PeriodTooLarge { period: usize, max: usize },
    #[error("Tolerance must be finite and non-negative, got {0}.")]
    InvalidTolerance(f64),
    #[error("Quest has {len} directions but step {step} was requested.")]
    QuestExhausted { step: usize, len: usize },
}

pub type MapResult<T> = Result<T, MapError>;
