//! Error types for the editor

use formdraft_client::ClientError;
use formdraft_schema::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Form service error: {0}")]
    Client(#[from] ClientError),

    #[error("Could not create a draft for form {form_id}: {source}")]
    BranchFailed {
        form_id: String,
        source: ClientError,
    },

    #[error("Field {field_id} no longer exists in the draft, please reselect")]
    StaleReference { field_id: String },

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Form {form_id} has no version to publish")]
    NoVersion { form_id: String },

    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("Validation error: {0}")]
    Validation(#[from] SchemaError),
}

impl EditorError {
    /// The user has to pick a field again before retrying
    pub fn is_selection_lost(&self) -> bool {
        match self {
            EditorError::StaleReference { .. } => true,
            EditorError::Client(e) => e.is_stale_reference(),
            _ => false,
        }
    }
}
