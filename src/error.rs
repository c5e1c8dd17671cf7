//! Error types shared by the preprocessing, transform, and persistence layers.

use thiserror::Error;

/// Errors raised while analyzing appliance current signatures.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Signal is empty, too short, non-finite, or degenerate.
    #[error("Invalid signal: {reason}")]
    InvalidSignal { reason: String },

    /// Transform parameters or signal lengths disagree between two inputs.
    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    #[must_use]
    pub fn invalid_signal(reason: impl Into<String>) -> Self {
        Self::InvalidSignal {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::ParameterMismatch(msg.into())
    }
}
