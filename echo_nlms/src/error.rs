//! Error types for echo synthesis and adaptive filtering.

use thiserror::Error;

/// Result type used throughout the crate.
pub type EchoResult<T> = Result<T, EchoError>;

/// Fatal conditions detected before any processing starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EchoError {
    /// A signal is too short for the requested convolution or window alignment.
    #[error("insufficient samples for {stage}: need {required}, got {available}")]
    InsufficientData {
        stage: &'static str,
        required: usize,
        available: usize,
    },

    /// A parameter is outside the range the algorithm is defined for.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EchoError {
    pub(crate) fn insufficient(stage: &'static str, required: usize, available: usize) -> Self {
        EchoError::InsufficientData {
            stage,
            required,
            available,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EchoError::InvalidConfiguration(msg.into())
    }
}
