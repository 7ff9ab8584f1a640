//! Error types for the interpreter.
//!
//! All errors are strongly typed using thiserror. Configuration problems
//! surface as [`ValidationError`] while building a knowledge base, run-time
//! failures of the inference procedure as [`ExecutionError`], and failures of
//! the ask collaborator as [`AskError`].

use thiserror::Error;

/// Configuration errors raised while building a knowledge base.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Confidence value {value} is out of range [-1.0, 1.0]")]
    ConfidenceOutOfRange {
        value: f64,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: String,
    },

    #[error("Unknown parameter: {name}")]
    UnknownParameter {
        name: String,
    },

    #[error("Unknown context: {name}")]
    UnknownContext {
        name: String,
    },

    #[error("Unknown operation: {name}")]
    UnknownOperation {
        name: String,
    },

    #[error("Parameter '{parameter}' belongs to context '{expected}', not '{actual}'")]
    ContextMismatch {
        parameter: String,
        expected: String,
        actual: String,
    },

    #[error("Value '{value}' is not accepted for '{parameter}' ({help})")]
    ValueNotAccepted {
        parameter: String,
        value: String,
        help: String,
    },

    #[error("Malformed acceptance for '{parameter}': {reason}")]
    MalformedAcceptance {
        parameter: String,
        reason: String,
    },

    #[error("Operation '{name}' is already registered")]
    DuplicateOperation {
        name: String,
    },

    #[error("Rule {number} is already registered")]
    DuplicateRule {
        number: u32,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },
}

/// Errors raised while resolving parameters.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Cannot combine certainty {a} with {b}: the combination is undefined")]
    UndefinedCombination {
        a: f64,
        b: f64,
    },

    #[error("Cyclic dependency resolving '{parameter}' for {instance} (depth {depth})")]
    CyclicDependency {
        parameter: String,
        instance: String,
        depth: usize,
    },

    #[error("No current instance for context '{context}'")]
    NoCurrentInstance {
        context: String,
    },
}

/// Failures of the ask collaborator itself (not invalid replies).
#[derive(Debug, Error)]
pub enum AskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input closed while asking for '{parameter}'")]
    Closed {
        parameter: String,
    },
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum EmycinError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Ask error: {0}")]
    Ask(#[from] AskError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl EmycinError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if the ask collaborator failed.
    #[must_use]
    pub const fn is_ask(&self) -> bool {
        matches!(self, Self::Ask(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for interpreter operations.
pub type EmycinResult<T> = Result<T, EmycinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_confidence() {
        let err = ValidationError::ConfidenceOutOfRange { value: 1.5 };
        let msg = format!("{err}");
        assert!(msg.contains("1.5"));
        assert!(msg.contains("out of range"));
    }

    #[test]
    fn test_context_mismatch_message() {
        let err = ValidationError::ContextMismatch {
            parameter: "gram".to_string(),
            expected: "organism".to_string(),
            actual: "patient".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("gram"));
        assert!(msg.contains("organism"));
        assert!(msg.contains("patient"));
    }

    #[test]
    fn test_undefined_combination_message() {
        let err = ExecutionError::UndefinedCombination { a: 1.0, b: -1.0 };
        let msg = format!("{err}");
        assert!(msg.contains("undefined"));
    }

    #[test]
    fn test_emycin_error_from_validation() {
        let err: EmycinError = ValidationError::UnknownParameter {
            name: "x".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_execution());
    }

    #[test]
    fn test_emycin_error_from_execution() {
        let err: EmycinError = ExecutionError::NoCurrentInstance {
            context: "patient".to_string(),
        }
        .into();
        assert!(err.is_execution());
        assert!(err.to_string().contains("patient"));
    }

    #[test]
    fn test_emycin_error_from_ask() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: EmycinError = AskError::from(io).into();
        assert!(err.is_ask());
    }

    #[test]
    fn test_emycin_error_internal() {
        let err = EmycinError::internal("unexpected state");
        assert!(err.is_internal());
        assert!(err.to_string().contains("unexpected state"));
    }
}
