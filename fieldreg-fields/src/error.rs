//! Error types for the field registry model

use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors raised when an entity configuration breaks one of its invariants
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FieldsError {
    /// Two fields share a `field_name`
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// Two stages share a `value`
    #[error("duplicate stage value: {value}")]
    DuplicateStage { value: String },

    /// A field has an empty machine key
    #[error("field at position {index} has an empty field_name")]
    EmptyFieldName { index: usize },

    /// `default_value` does not match the field's type
    #[error("default value for '{field}' must be {expected}")]
    DefaultTypeMismatch {
        field: String,
        expected: &'static str,
    },
}
