//! # Branch-on-Write
//!
//! Hands field mutations a version they are allowed to write to.
//!
//! ```text
//! bound version is a draft? ──yes──▶ Current       (no remote writes)
//!          │ no
//!          ▼
//! another draft exists?     ──yes──▶ ExistingDraft (rebind, no branch)
//!          │ no
//!          ▼
//! create_branch(form)       ───────▶ Branched      (copy of the active)
//! ```
//!
//! In the last two cases the focus field id is reconciled into the new
//! version. The old version's fields are read before the branch is created,
//! so a failed read leaves nothing behind on the remote.

use crate::draft_resolver::DraftResolver;
use crate::reconciler::FieldReconciler;
use crate::version_store::VersionStore;
use crate::EditorError;
use formdraft_client::FormService;
use formdraft_schema::Field;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How the writable version was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    /// The bound version was already the draft
    Current,
    /// Another draft existed and the caller was rebound to it
    ExistingDraft,
    /// A new draft was created from the active version
    Branched,
}

/// A version id that accepts field writes, plus the focus field's id in it
#[derive(Debug, Clone, PartialEq)]
pub struct WritableVersion {
    pub version_id: String,
    pub version: u32,
    /// `None` when no focus was given or it could not be reconciled
    pub field_id: Option<String>,
    pub target: WriteTarget,
    /// Fields of the newly bound version; `None` for [`WriteTarget::Current`]
    pub fields: Option<Vec<Field>>,
}

pub struct BranchCoordinator {
    store: VersionStore,
    service: Arc<dyn FormService>,
}

impl BranchCoordinator {
    pub fn new(service: Arc<dyn FormService>) -> Self {
        Self {
            store: VersionStore::new(service.clone()),
            service,
        }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Make sure the next field write has a draft to land on.
    ///
    /// No remote writes happen when the current version is already a draft.
    /// Either a fully consistent result is returned or an error is, with no
    /// session-visible side effects in between.
    #[instrument(skip(self))]
    pub async fn ensure_writable_version(
        &self,
        form_id: &str,
        current_version_id: Option<&str>,
        focus_field_id: Option<&str>,
    ) -> Result<WritableVersion, EditorError> {
        let versions = self.store.list_versions(form_id).await?;
        let current = current_version_id.and_then(|id| versions.iter().find(|v| v.id == id));

        if let Some(current) = current.filter(|v| DraftResolver::is_writable(Some(*v))) {
            return Ok(WritableVersion {
                version_id: current.id.clone(),
                version: current.version,
                field_id: focus_field_id.map(str::to_string),
                target: WriteTarget::Current,
                fields: None,
            });
        }

        let old_fields = match (focus_field_id, current) {
            (Some(_), Some(current)) => Some(
                self.store
                    .get_version_detail(form_id, &current.id)
                    .await?
                    .fields,
            ),
            _ => None,
        };

        let resolution = DraftResolver::resolve(&versions);
        let (version_id, version, new_fields, target) = match resolution.draft {
            Some(draft) => {
                info!(draft_id = %draft.id, "Rebinding to the existing draft");
                let detail = self.store.get_version_detail(form_id, &draft.id).await?;
                (detail.id, detail.version, detail.fields, WriteTarget::ExistingDraft)
            }
            None => {
                let branched = self
                    .service
                    .create_branch(form_id)
                    .await
                    .map_err(|source| EditorError::BranchFailed {
                        form_id: form_id.to_string(),
                        source,
                    })?;
                info!(
                    from = ?current_version_id,
                    to = %branched.version_id,
                    version = branched.version,
                    "Branched a new draft"
                );
                (
                    branched.version_id,
                    branched.version,
                    branched.fields,
                    WriteTarget::Branched,
                )
            }
        };

        let field_id = match (focus_field_id, &old_fields) {
            (Some(focus), Some(old)) => {
                let mapped = FieldReconciler::reconcile(old, focus, &new_fields);
                if mapped.is_none() {
                    warn!(field_id = %focus, version_id = %version_id, "Focus field lost in the new draft");
                }
                mapped
            }
            _ => None,
        };

        Ok(WritableVersion {
            version_id,
            version,
            field_id,
            target,
            fields: Some(new_fields),
        })
    }
}
