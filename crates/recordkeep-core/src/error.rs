//! Error types for Recordkeep Core.

use thiserror::Error;

/// Core errors that can occur when handling identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid record id: {0:?}")]
    InvalidId(String),
}

/// Validation errors for record fields.
///
/// These are recoverable: an interactive caller re-prompts and tries again.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` must be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("field `{0}` cannot be empty")]
    EmptyField(String),

    #[error("field `{field}` must be a positive integer, got {value}")]
    NotPositive { field: String, value: i64 },

    #[error("field `{field}` cannot be negative, got {value}")]
    Negative { field: String, value: i64 },

    #[error("field `{field}` must be one of {allowed:?}, got {value:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("field `{field}` is not a YYYY-MM-DD date: {value:?}")]
    InvalidDate { field: String, value: String },

    #[error("field `{field}` must be between {min} and {max} characters, got {len}")]
    LengthOutOfRange {
        field: String,
        min: usize,
        max: usize,
        len: usize,
    },

    #[error("field `{0}` may only contain letters and spaces")]
    InvalidCharacters(String),

    #[error("{0}")]
    Custom(String),
}
