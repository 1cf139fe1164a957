//! # Edit Session
//!
//! The façade a form editor drives. Holds the bound version's snapshot, the
//! field types, the form itself and the selected field.
//!
//! ## Write paths
//!
//! Field mutations (add, update, toggle required, delete, reorder) first ask
//! the [`BranchCoordinator`] for a writable version, rebind the session when
//! that version is new, then perform the remote write and refetch.
//!
//! Form-scoped updates (details, theme, settings) never touch the version
//! lifecycle and go straight to the remote.
//!
//! ## Snapshot
//!
//! Fields are kept sorted by `order`. Every successful write ends with a
//! refetch, so the snapshot is always the remote's view except while an
//! optimistic change is pending.

use crate::branch::{BranchCoordinator, WritableVersion, WriteTarget};
use crate::draft_resolver::DraftResolver;
use crate::events::{SessionEvent, SessionListener};
use crate::optimistic::{self, Pending, ReorderPlan};
use crate::reconciler::FieldReconciler;
use crate::{EditorError, Result};
use formdraft_client::FormService;
use formdraft_schema::{
    Field, FieldPatch, FieldTypeInfo, Form, FormPatch, FormSettings, NewField, ThemePatch,
    VersionDetail, VersionState,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Label given to choice fields until the user edits them
const DEFAULT_OPTION_LABEL: &str = "Option 1";

pub struct EditSession {
    form_id: String,
    service: Arc<dyn FormService>,
    coordinator: BranchCoordinator,
    form: Form,
    field_types: Vec<FieldTypeInfo>,
    /// Bound version; `None` only for a form without any version
    version: Option<VersionDetail>,
    selected_field: Option<String>,
    /// Set when a rollback could not fetch authoritative state
    stale: bool,
    listeners: Vec<Arc<dyn SessionListener>>,
}

impl EditSession {
    /// Load a form and bind to its draft, or to its active version if there
    /// is no draft.
    #[instrument(skip(service))]
    pub async fn open(service: Arc<dyn FormService>, form_id: &str) -> Result<Self> {
        let coordinator = BranchCoordinator::new(service.clone());

        let form = service.get_form(form_id).await?;
        let field_types = service.list_field_types().await?;
        let versions = coordinator.store().list_versions(form_id).await?;

        let version = match DraftResolver::resolve(&versions).edit_target() {
            Some(target) => Some(sorted(
                coordinator.store().get_version_detail(form_id, &target.id).await?,
            )),
            None => None,
        };

        info!(
            version_id = ?version.as_ref().map(|v| &v.id),
            versions = versions.len(),
            "Opened edit session"
        );

        Ok(Self {
            form_id: form_id.to_string(),
            service,
            coordinator,
            form,
            field_types,
            version,
            selected_field: None,
            stale: false,
            listeners: Vec::new(),
        })
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn field_types(&self) -> &[FieldTypeInfo] {
        &self.field_types
    }

    pub fn version_id(&self) -> Option<&str> {
        self.version.as_ref().map(|v| v.id.as_str())
    }

    pub fn version_number(&self) -> Option<u32> {
        self.version.as_ref().map(|v| v.version)
    }

    /// Fields of the bound version in display order
    pub fn fields(&self) -> &[Field] {
        self.version.as_ref().map(|v| v.fields.as_slice()).unwrap_or(&[])
    }

    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.id == field_id)
    }

    pub fn selected_field(&self) -> Option<&str> {
        self.selected_field.as_deref()
    }

    pub fn selected(&self) -> Option<&Field> {
        self.selected_field.as_deref().and_then(|id| self.field(id))
    }

    /// The snapshot may still hold a change the remote rejected
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn subscribe(&mut self, listener: Arc<dyn SessionListener>) {
        self.listeners.push(listener);
    }

    pub fn select_field(&mut self, field_id: &str) -> Result<()> {
        if self.field(field_id).is_none() {
            return Err(EditorError::FieldNotFound(field_id.to_string()));
        }
        self.set_selection(Some(field_id.to_string()));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    /// Refetch the form and the bound version
    pub async fn refresh(&mut self) -> Result<()> {
        let form = self.service.get_form(&self.form_id).await?;
        let version = self.fetch_bound_version().await?;
        self.form = form;
        self.replace_snapshot(version);
        Ok(())
    }

    /// Add a field of the given type (catalog id or key) at the end.
    ///
    /// The new field becomes the selection. Returns its id.
    #[instrument(skip(self), fields(form_id = %self.form_id))]
    pub async fn add_field(&mut self, field_type: &str) -> Result<String> {
        let info = self
            .field_types
            .iter()
            .find(|t| t.id == field_type || t.key == field_type)
            .cloned()
            .ok_or_else(|| EditorError::UnknownFieldType(field_type.to_string()))?;

        let baseline = self.fields().to_vec();
        let focus = self.selected_field.clone();
        let writable = self.prepare_write(focus.as_deref(), &baseline).await?;

        let payload = NewField {
            label: format!("New {}", info.key),
            field_type_id: info.id.clone(),
            required: false,
            order: next_order(self.fields()),
            options: info
                .has_options
                .then(|| vec![DEFAULT_OPTION_LABEL.to_string()]),
        };
        let created = self.service.add_field(&writable.version_id, &payload).await?;
        info!(field_id = %created.id, field_type = %info.key, "Added field");

        self.refresh().await?;
        self.set_selection(Some(created.id.clone()));
        Ok(created.id)
    }

    /// Apply a partial update to a field.
    ///
    /// Rules are checked against the field's type before anything is sent.
    /// Returns the field's id in the version that was written, which differs
    /// from `field_id` after a branch.
    #[instrument(skip(self, patch), fields(form_id = %self.form_id))]
    pub async fn update_field(&mut self, field_id: &str, patch: FieldPatch) -> Result<String> {
        let field = self
            .field(field_id)
            .ok_or_else(|| EditorError::FieldNotFound(field_id.to_string()))?;
        if let Some(rules) = &patch.rules {
            field.kind.check_rules(rules)?;
        }
        if patch.is_empty() {
            return Ok(field_id.to_string());
        }

        let baseline = self.fields().to_vec();
        let writable = self.prepare_write(Some(field_id), &baseline).await?;
        let target = reconciled_focus(&writable, field_id)?;

        self.service
            .update_field(&writable.version_id, &target, &patch)
            .await?;
        debug!(field_id = %target, "Updated field");

        self.refresh().await?;
        Ok(target)
    }

    /// Flip `required`, showing the new value before the remote confirms.
    ///
    /// Returns the field's id in the written version and the new value.
    pub async fn toggle_required(&mut self, field_id: &str) -> Result<(String, bool)> {
        let required = !self
            .field(field_id)
            .ok_or_else(|| EditorError::FieldNotFound(field_id.to_string()))?
            .required;

        let pending = optimistic::apply("toggle-required", &mut self.version, |version| {
            if let Some(field) = version
                .as_mut()
                .and_then(|v| v.fields.iter_mut().find(|f| f.id == field_id))
            {
                field.required = required;
            }
        });

        match self.update_field(field_id, FieldPatch::required(required)).await {
            Ok(written) => {
                pending.confirm();
                Ok((written, required))
            }
            Err(err) => {
                self.roll_back(pending, &err).await;
                Err(err)
            }
        }
    }

    /// Returns the id the field had in the version it was deleted from.
    #[instrument(skip(self), fields(form_id = %self.form_id))]
    pub async fn delete_field(&mut self, field_id: &str) -> Result<String> {
        if self.field(field_id).is_none() {
            return Err(EditorError::FieldNotFound(field_id.to_string()));
        }

        let baseline = self.fields().to_vec();
        let writable = self.prepare_write(Some(field_id), &baseline).await?;
        let target = reconciled_focus(&writable, field_id)?;

        self.service
            .delete_field(&writable.version_id, &target)
            .await?;
        info!(field_id = %target, "Deleted field");

        if self.selected_field.as_deref() == Some(target.as_str()) {
            self.set_selection(None);
        }
        self.refresh().await?;
        Ok(target)
    }

    /// Put the fields in the given order; every field id must appear once.
    ///
    /// The new order shows immediately. If the remote refuses it, the
    /// snapshot is replaced by a refetch.
    #[instrument(skip(self, ordered_ids), fields(form_id = %self.form_id))]
    pub async fn reorder_fields(&mut self, ordered_ids: &[String]) -> Result<()> {
        let plan = ReorderPlan::new(self.fields(), ordered_ids)?;
        if self.fields().iter().map(|f| &f.id).eq(ordered_ids.iter()) {
            return Ok(());
        }

        let pending = optimistic::apply("reorder", &mut self.version, |version| {
            if let Some(v) = version.as_mut() {
                plan.apply_local(&mut v.fields);
            }
        });

        match self.push_reorder(&plan).await {
            Ok(()) => {
                pending.confirm();
                Ok(())
            }
            Err(err) => {
                self.roll_back(pending, &err).await;
                Err(err)
            }
        }
    }

    pub async fn update_details(&mut self, title: &str, description: Option<String>) -> Result<()> {
        self.update_form(FormPatch::details(title, description)).await
    }

    pub async fn update_theme(&mut self, theme: ThemePatch) -> Result<()> {
        theme.validate()?;
        if theme.is_empty() {
            return Ok(());
        }
        self.update_form(FormPatch::theme(theme)).await
    }

    pub async fn update_settings(&mut self, settings: FormSettings) -> Result<()> {
        settings.validate()?;
        self.update_form(FormPatch::settings(settings)).await
    }

    /// Publish the draft and make it the active one. Returns the published
    /// version number.
    ///
    /// Without a draft, a version left published but not activated by an
    /// earlier failed call is activated; failing that the active version is
    /// kept as is.
    #[instrument(skip(self), fields(form_id = %self.form_id))]
    pub async fn publish(&mut self) -> Result<u32> {
        let store = self.coordinator.store();
        let versions = store.list_versions(&self.form_id).await?;
        let target = DraftResolver::publish_target(&versions)
            .ok_or_else(|| EditorError::NoVersion {
                form_id: self.form_id.clone(),
            })?;

        let state = target.state();
        if state == VersionState::Draft {
            self.service
                .publish_version(&self.form_id, &target.id)
                .await?;
        }
        if state != VersionState::Active {
            self.service
                .activate_version(&self.form_id, &target.id)
                .await?;
        }
        info!(version_id = %target.id, version = target.version, from = %state, "Published version");

        let form = self.service.get_form(&self.form_id).await?;
        let detail = sorted(store.get_version_detail(&self.form_id, &target.id).await?);

        if self.version_id() != Some(target.id.as_str()) {
            let baseline = self.fields().to_vec();
            if let Some(selected) = self.selected_field.take() {
                self.remap_selection(selected, &baseline, &detail.fields, None);
            }
        }
        self.form = form;
        self.replace_snapshot(Some(detail));

        self.emit(SessionEvent::Published {
            version_id: target.id,
            version: target.version,
        });
        Ok(target.version)
    }

    async fn push_reorder(&mut self, plan: &ReorderPlan) -> Result<()> {
        let focus = self.selected_field.clone();
        let writable = self.prepare_write(focus.as_deref(), plan.before()).await?;

        let plan = match &writable.fields {
            Some(fields) => {
                let remapped = plan.remap(fields)?;
                if let Some(v) = self.version.as_mut() {
                    remapped.apply_local(&mut v.fields);
                }
                remapped
            }
            None => plan.clone(),
        };

        self.service
            .reorder_fields(&writable.version_id, &plan.assignments())
            .await?;
        debug!(fields = plan.ordered_ids().len(), "Reordered fields");

        self.refresh().await
    }

    async fn update_form(&mut self, patch: FormPatch) -> Result<()> {
        self.service.update_form(&self.form_id, &patch).await?;
        self.form = self.service.get_form(&self.form_id).await?;
        debug!(form_id = %self.form_id, "Updated form");
        Ok(())
    }

    /// Get a writable version and rebind to it if it is not the bound one.
    ///
    /// `baseline` is the field list ids currently held by the session refer
    /// to; the selection is carried over through it.
    async fn prepare_write(
        &mut self,
        focus: Option<&str>,
        baseline: &[Field],
    ) -> Result<WritableVersion> {
        let previous = self.version_id().map(str::to_string);
        let writable = self
            .coordinator
            .ensure_writable_version(&self.form_id, previous.as_deref(), focus)
            .await?;

        if let Some(fields) = &writable.fields {
            let event = match writable.target {
                WriteTarget::Branched => SessionEvent::Branched {
                    from: previous,
                    to: writable.version_id.clone(),
                    version: writable.version,
                },
                _ => SessionEvent::Rebound {
                    from: previous,
                    to: writable.version_id.clone(),
                },
            };
            self.version = Some(sorted(VersionDetail {
                id: writable.version_id.clone(),
                version: writable.version,
                fields: fields.clone(),
            }));
            self.emit(event);

            if let Some(selected) = self.selected_field.take() {
                let known = (focus == Some(selected.as_str())).then(|| writable.field_id.clone());
                self.remap_selection(selected, baseline, fields, known);
            }
        }

        Ok(writable)
    }

    /// Carry `selected` over to `fields`; `known` short-circuits reconciliation
    fn remap_selection(
        &mut self,
        selected: String,
        baseline: &[Field],
        fields: &[Field],
        known: Option<Option<String>>,
    ) {
        let mapped =
            known.unwrap_or_else(|| FieldReconciler::reconcile(baseline, &selected, fields));
        match mapped {
            Some(id) => {
                self.selected_field = Some(id.clone());
                self.emit(SessionEvent::SelectionChanged(Some(id)));
            }
            None => self.emit(SessionEvent::SelectionLost { field_id: selected }),
        }
    }

    async fn roll_back(&mut self, pending: Pending, reason: &EditorError) {
        match self.fetch_bound_version().await {
            Ok(authoritative) => {
                pending.rollback(&mut self.version, authoritative.map(sorted));
                self.stale = false;
                self.drop_vanished_selection();
                self.emit(SessionEvent::RolledBack {
                    reason: reason.to_string(),
                });
            }
            Err(err) => {
                warn!(error = %err, "Could not refetch after a rejected change");
                pending.abandon();
                self.stale = true;
            }
        }
    }

    async fn fetch_bound_version(&self) -> Result<Option<VersionDetail>> {
        let store = self.coordinator.store();
        let version_id = match self.version_id() {
            Some(id) => id.to_string(),
            None => {
                let versions = store.list_versions(&self.form_id).await?;
                match DraftResolver::resolve(&versions).edit_target() {
                    Some(target) => target.id.clone(),
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(store.get_version_detail(&self.form_id, &version_id).await?))
    }

    fn replace_snapshot(&mut self, version: Option<VersionDetail>) {
        self.version = version.map(sorted);
        self.stale = false;
        self.drop_vanished_selection();
        self.emit(SessionEvent::SnapshotRefreshed {
            version_id: self.version_id().map(str::to_string),
        });
    }

    fn drop_vanished_selection(&mut self) {
        let vanished = self
            .selected_field
            .as_deref()
            .map(|id| self.field(id).is_none())
            .unwrap_or(false);
        if vanished {
            if let Some(field_id) = self.selected_field.take() {
                self.emit(SessionEvent::SelectionLost { field_id });
            }
        }
    }

    fn set_selection(&mut self, selection: Option<String>) {
        if self.selected_field != selection {
            self.selected_field = selection.clone();
            self.emit(SessionEvent::SelectionChanged(selection));
        }
    }

    fn emit(&self, event: SessionEvent) {
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }
}

fn sorted(mut detail: VersionDetail) -> VersionDetail {
    detail.fields.sort_by_key(|f| f.order);
    detail
}

/// Next free `order` value; stays unique after deletions leave gaps
fn next_order(fields: &[Field]) -> u32 {
    fields.iter().map(|f| f.order + 1).max().unwrap_or(0)
}

fn reconciled_focus(writable: &WritableVersion, field_id: &str) -> Result<String> {
    writable
        .field_id
        .clone()
        .ok_or_else(|| EditorError::StaleReference {
            field_id: field_id.to_string(),
        })
}
