//! Error types for risk engine

use thiserror::Error;

/// Risk engine error
///
/// Only raised while validating rule definitions. Scoring never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Rule name missing
    #[error("Invalid rule: name must not be empty")]
    MissingName,

    /// Field is not one the scorer can read
    #[error("Invalid rule: unknown field '{0}'")]
    UnknownField(String),

    /// Condition is not one the scorer can evaluate
    #[error("Invalid rule: unknown condition '{0}'")]
    UnknownCondition(String),

    /// Numeric comparison against a non-numeric value
    #[error("Invalid rule: threshold '{0}' is not a decimal number")]
    InvalidThreshold(String),

    /// Comparison value is empty
    #[error("Invalid rule: value for condition '{0}' must not be empty")]
    EmptyValue(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
