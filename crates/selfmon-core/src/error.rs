//! Shared error type across selfmon crates.

use thiserror::Error;

/// Stable error codes, used in logs and matched by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Label key not declared in the vector's schema.
    UndefinedLabel,
    /// More label pairs supplied than the schema has keys.
    TooManyLabels,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UndefinedLabel => "UNDEFINED_LABEL",
            ErrorCode::TooManyLabels => "TOO_MANY_LABELS",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SelfMonError>;

/// Unified error type used by core and agent.
#[derive(Debug, Error)]
pub enum SelfMonError {
    #[error("undefined label: {key} in {defined:?}")]
    UndefinedLabel { key: String, defined: Vec<String> },
    #[error("too many labels, expected {expected}, got {got}. defined labels: {defined:?}")]
    TooManyLabels {
        expected: usize,
        got: usize,
        defined: Vec<String>,
    },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl SelfMonError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SelfMonError::UndefinedLabel { .. } => ErrorCode::UndefinedLabel,
            SelfMonError::TooManyLabels { .. } => ErrorCode::TooManyLabels,
            SelfMonError::BadConfig(_) => ErrorCode::BadConfig,
            SelfMonError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            SelfMonError::Internal(_) => ErrorCode::Internal,
        }
    }
}
