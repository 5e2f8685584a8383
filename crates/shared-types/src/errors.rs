//! # Error Types
//!
//! Schema errors raised when a field map is read as a typed entity.

use thiserror::Error;

/// A node's fields do not match the schema of its entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// Required field absent or null.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Field present with the wrong scalar type.
    #[error("field {field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// Field present with an unusable value.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
