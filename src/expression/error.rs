//! Error types for building and evaluating expression trees.

use thiserror::Error;

/// Errors that can occur while building or evaluating an expression tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Field is not declared on the record schema (or the schema is unknown)
    #[error("Unknown field '{field}' on record type '{record_type}'")]
    UnknownField { record_type: String, field: String },

    /// Operator applied to operands of incompatible types
    #[error("Type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    /// Tree references a parameter that is not declared on it
    #[error("Unbound variable '{name}' of type '{record_type}'")]
    UnboundVariable { name: String, record_type: String },

    /// Member access could not be resolved against the value actually supplied
    #[error("Cannot read field '{field}' of record type '{record_type}' from the supplied value")]
    FieldLookup { record_type: String, field: String },

    /// Predicate invoked with the wrong number of arguments
    #[error("Predicate expects {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// Same parameter name declared twice on one tree
    #[error("Parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String },
}

impl ExpressionError {
    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        ExpressionError::TypeMismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
