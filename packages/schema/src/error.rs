//! Validation errors for schema payloads

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Invalid validation rules: {0}")]
    InvalidRules(String),

    #[error("{rules} rules do not apply to '{field_type}' fields")]
    IncompatibleRules {
        field_type: String,
        rules: &'static str,
    },

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
