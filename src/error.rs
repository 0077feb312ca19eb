//! Error types for the interpreter core

use thiserror::Error;

/// Main error type for the interpreter core.
///
/// Every fallible operation returns `Result<_, JsError>`; the `Err` arm is
/// the thrown-completion channel. Callers propagate it with `?` until the
/// evaluator's try/catch machinery consumes it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("SyntaxError: {message}")]
    SyntaxError { message: String },

    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        JsError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl Into<String>) -> Self {
        JsError::ReferenceError { name: name.into() }
    }

    /// The error constructor name, e.g. `"TypeError"`.
    pub fn name(&self) -> &'static str {
        match self {
            JsError::TypeError { .. } => "TypeError",
            JsError::RangeError { .. } => "RangeError",
            JsError::SyntaxError { .. } => "SyntaxError",
            JsError::ReferenceError { .. } => "ReferenceError",
            JsError::Internal(_) => "InternalError",
        }
    }

    /// The message part of the (name, message) diagnostic pair.
    pub fn message(&self) -> String {
        match self {
            JsError::TypeError { message }
            | JsError::RangeError { message }
            | JsError::SyntaxError { message } => message.clone(),
            JsError::ReferenceError { name } => format!("{} is not defined", name),
            JsError::Internal(message) => message.clone(),
        }
    }
}
