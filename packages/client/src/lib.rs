//! FormService trait: the only boundary between the editing engine and the
//! remote form service.
//!
//! Two implementations ship here:
//! - [`HttpFormService`] talks JSON over HTTPS with a bearer token.
//! - [`InMemoryFormService`] keeps everything in process and enforces the same
//!   draft rules the remote store does. Tests and offline runs use it.

pub mod config;
pub mod error;
pub mod http;
pub mod memory;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpFormService;
pub use memory::{Call, InMemoryFormService};

use async_trait::async_trait;
use formdraft_schema::{
    BranchedVersion, Field, FieldOrder, FieldPatch, FieldTypeInfo, Form, FormPatch, NewField,
    VersionDetail, VersionSummary,
};

pub type Result<T> = std::result::Result<T, ClientError>;

/// Remote operations the engine consumes
///
/// Every call against a `version_id`/`field_id` fails with a client error when
/// the version is no longer the draft or the field does not exist in it.
#[async_trait]
pub trait FormService: Send + Sync {
    async fn get_form(&self, form_id: &str) -> Result<Form>;

    async fn list_field_types(&self) -> Result<Vec<FieldTypeInfo>>;

    /// Version summaries, in the order the service returns them
    async fn list_versions(&self, form_id: &str) -> Result<Vec<VersionSummary>>;

    async fn get_version(&self, form_id: &str, version_id: &str) -> Result<VersionDetail>;

    /// Create a new draft as a field-for-field copy of the active version.
    /// Returns the new version and its copied fields in one round trip.
    async fn create_branch(&self, form_id: &str) -> Result<BranchedVersion>;

    async fn publish_version(&self, form_id: &str, version_id: &str) -> Result<()>;

    /// Make the version the sole active one; the prior active is superseded
    async fn activate_version(&self, form_id: &str, version_id: &str) -> Result<()>;

    async fn add_field(&self, version_id: &str, field: &NewField) -> Result<Field>;

    async fn update_field(
        &self,
        version_id: &str,
        field_id: &str,
        patch: &FieldPatch,
    ) -> Result<Field>;

    async fn delete_field(&self, version_id: &str, field_id: &str) -> Result<()>;

    async fn reorder_fields(&self, version_id: &str, order: &[FieldOrder]) -> Result<()>;

    /// Form-scoped metadata update (title, theme, settings)
    async fn update_form(&self, form_id: &str, patch: &FormPatch) -> Result<Form>;
}

/// Operation names, used for call journals and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetForm,
    ListFieldTypes,
    ListVersions,
    GetVersion,
    CreateBranch,
    PublishVersion,
    ActivateVersion,
    AddField,
    UpdateField,
    DeleteField,
    ReorderFields,
    UpdateForm,
}

impl Operation {
    /// True for calls that change remote state
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Operation::GetForm
                | Operation::ListFieldTypes
                | Operation::ListVersions
                | Operation::GetVersion
        )
    }
}
