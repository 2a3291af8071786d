//! Core error types for ROWGATE.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Result of compiling a residual
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors raised while compiling a residual into a backend predicate.
///
/// Every variant is a policy-authoring or programming error: compiling the
/// same residual again fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Reference has too few segments after the unknown namespace prefix
    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    /// Expression does not have exactly two operands
    #[error("Invalid expression: expected 2 operands, found {count}")]
    TooManyOperands {
        /// Number of operands found
        count: usize,
    },

    /// Operands are not one constant and one reference
    #[error("Invalid expression: operands of {operator} must be one constant and one reference")]
    AmbiguousOperands {
        /// Operator of the offending expression
        operator: String,
    },

    /// Operator outside the supported set
    #[error("Invalid expression: operator not supported: {0}")]
    UnsupportedOperator(String),
}

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid encoding
    InvalidEncoding {
        /// Underlying serializer message
        message: String,
    },

    /// Parse error
    ParseError {
        /// What could not be parsed
        message: String,
    },

    /// Validation error
    Validation {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Residual compilation failed
    Compile(CompileError),
}

impl CoreError {
    /// Shorthand for a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Shorthand for a validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding { message } => write!(f, "Invalid encoding: {}", message),
            Self::ParseError { message } => write!(f, "Parse error: {}", message),
            Self::Validation { field, reason } => {
                write!(f, "Validation failed for {}: {}", field, reason)
            }
            Self::Compile(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CompileError> for CoreError {
    fn from(err: CompileError) -> Self {
        Self::Compile(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidEncoding {
            message: err.to_string(),
        }
    }
}
