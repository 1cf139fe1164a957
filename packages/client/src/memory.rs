//! # In-Memory Form Service
//!
//! Process-local stand-in for the remote form service. It enforces the same
//! rules the remote store does:
//!
//! - at most one draft per form (a second branch is rejected)
//! - field mutations only against the draft
//! - publish only from draft, activate only once published
//! - activating supersedes (closes) the previously active version
//!
//! It also keeps a journal of every call and can fail the next call of a given
//! operation, which is how the engine's failure paths are exercised.

use crate::{ClientError, FormService, Operation, Result};
use async_trait::async_trait;
use chrono::Utc;
use formdraft_schema::{
    BranchedVersion, Field, FieldKind, FieldOrder, FieldPatch, FieldTypeInfo, Form, FormPatch,
    FormSettings, NewField, RulesPatch, Theme, VersionDetail, VersionState, VersionSummary,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded call: the operation and the id it targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub target: String,
}

#[derive(Debug)]
struct StoredVersion {
    summary: VersionSummary,
    fields: Vec<Field>,
}

impl StoredVersion {
    fn detail(&self) -> VersionDetail {
        let mut fields = self.fields.clone();
        fields.sort_by_key(|f| f.order);
        VersionDetail {
            id: self.summary.id.clone(),
            version: self.summary.version,
            fields,
        }
    }

    fn ensure_draft(&self) -> Result<()> {
        if self.summary.is_draft() {
            Ok(())
        } else {
            Err(ClientError::rejected(format!(
                "version {} is {}, not a draft",
                self.summary.id,
                self.summary.state()
            )))
        }
    }

    fn field_mut(&mut self, field_id: &str) -> Result<&mut Field> {
        self.fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| ClientError::not_found(format!("field {}", field_id)))
    }
}

#[derive(Debug)]
struct StoredForm {
    form: Form,
    versions: Vec<StoredVersion>,
}

#[derive(Debug, Default)]
struct StoreState {
    forms: HashMap<String, StoredForm>,
    field_types: Vec<FieldTypeInfo>,
    calls: Vec<Call>,
    failures: HashMap<Operation, ClientError>,
    next_id: u64,
}

impl StoreState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Journal the call, then fire any injected failure for it
    fn record(&mut self, operation: Operation, target: &str) -> Result<()> {
        self.calls.push(Call {
            operation,
            target: target.to_string(),
        });

        match self.failures.remove(&operation) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn form_mut(&mut self, form_id: &str) -> Result<&mut StoredForm> {
        self.forms
            .get_mut(form_id)
            .ok_or_else(|| ClientError::not_found(format!("form {}", form_id)))
    }

    fn version_mut(&mut self, version_id: &str) -> Result<&mut StoredVersion> {
        self.forms
            .values_mut()
            .flat_map(|f| f.versions.iter_mut())
            .find(|v| v.summary.id == version_id)
            .ok_or_else(|| ClientError::not_found(format!("version {}", version_id)))
    }
}

#[derive(Debug)]
pub struct InMemoryFormService {
    state: Mutex<StoreState>,
}

impl Default for InMemoryFormService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFormService {
    /// Empty store with the standard field-type catalog
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                field_types: default_field_types(),
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a form with no versions; returns its id
    pub fn create_form(&self, title: &str) -> String {
        let mut state = self.state();
        let id = state.next_id("form");
        let settings_id = state.next_id("settings");

        let form = Form {
            id: id.clone(),
            title: title.to_string(),
            description: None,
            slug: title.to_lowercase().replace(' ', "-"),
            version: 0,
            theme: Theme::default(),
            settings: Some(FormSettings {
                id: Some(settings_id),
                ..Default::default()
            }),
        };

        state.forms.insert(
            id.clone(),
            StoredForm {
                form,
                versions: Vec::new(),
            },
        );
        id
    }

    /// Seed a version in the given state, numbered after the existing ones.
    ///
    /// Field ids are kept as given. Seeding an `Active` version deactivates
    /// (but does not close) any other active version.
    pub fn insert_version(
        &self,
        form_id: &str,
        state: VersionState,
        fields: Vec<Field>,
    ) -> Result<String> {
        let mut store = self.state();
        let id = store.next_id("ver");
        let stored = store.form_mut(form_id)?;
        let now = Utc::now();

        let number = stored.versions.iter().map(|v| v.summary.version).max().unwrap_or(0) + 1;
        let published_at = (state != VersionState::Draft).then_some(now);
        let closed_at = (state == VersionState::Closed).then_some(now);
        let is_active = state == VersionState::Active;

        if is_active {
            for v in &mut stored.versions {
                v.summary.is_active = false;
            }
            stored.form.version = number;
        }

        stored.versions.push(StoredVersion {
            summary: VersionSummary {
                id: id.clone(),
                version: number,
                is_active,
                published_at,
                closed_at,
            },
            fields,
        });

        Ok(id)
    }

    /// Change a stored field directly, bypassing every rule.
    ///
    /// Simulates a concurrent server-side change.
    pub fn edit_field(
        &self,
        version_id: &str,
        field_id: &str,
        edit: impl FnOnce(&mut Field),
    ) -> Result<()> {
        let mut state = self.state();
        let field = state.version_mut(version_id)?.field_mut(field_id)?;
        edit(field);
        Ok(())
    }

    /// Fail the next call of `operation` with a transport error
    pub fn fail_next(&self, operation: Operation) {
        self.fail_next_with(
            operation,
            ClientError::Transport(format!("injected {:?} failure", operation)),
        );
    }

    pub fn fail_next_with(&self, operation: Operation, error: ClientError) {
        self.state().failures.insert(operation, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn versions(&self, form_id: &str) -> Vec<VersionSummary> {
        self.state()
            .forms
            .get(form_id)
            .map(|f| f.versions.iter().map(|v| v.summary.clone()).collect())
            .unwrap_or_default()
    }

    /// Fields of a version in display order; empty if the version is unknown
    pub fn fields(&self, version_id: &str) -> Vec<Field> {
        self.state()
            .version_mut(version_id)
            .map(|v| v.detail().fields)
            .unwrap_or_default()
    }

    pub fn form(&self, form_id: &str) -> Option<Form> {
        self.state().forms.get(form_id).map(|f| f.form.clone())
    }
}

/// Build a field for seeding; the type id is `type-<key>`
pub fn field(id: &str, label: &str, order: u32, type_key: &str) -> Field {
    Field {
        id: id.to_string(),
        label: label.to_string(),
        description: String::new(),
        required: false,
        order,
        type_id: format!("type-{}", type_key),
        kind: FieldKind::from_key(type_key),
    }
}

pub fn default_field_types() -> Vec<FieldTypeInfo> {
    [
        ("text", "string", false),
        ("email", "string", false),
        ("url", "string", false),
        ("phone", "string", false),
        ("number", "number", false),
        ("rating", "number", false),
        ("select", "string", true),
        ("multiselect", "array", true),
        ("date", "date", false),
        ("boolean", "boolean", false),
    ]
    .into_iter()
    .map(|(key, value_kind, has_options)| FieldTypeInfo {
        id: format!("type-{}", key),
        key: key.to_string(),
        value_kind: value_kind.to_string(),
        has_options,
    })
    .collect()
}

#[async_trait]
impl FormService for InMemoryFormService {
    async fn get_form(&self, form_id: &str) -> Result<Form> {
        let mut state = self.state();
        state.record(Operation::GetForm, form_id)?;
        Ok(state.form_mut(form_id)?.form.clone())
    }

    async fn list_field_types(&self) -> Result<Vec<FieldTypeInfo>> {
        let mut state = self.state();
        state.record(Operation::ListFieldTypes, "")?;
        Ok(state.field_types.clone())
    }

    async fn list_versions(&self, form_id: &str) -> Result<Vec<VersionSummary>> {
        let mut state = self.state();
        state.record(Operation::ListVersions, form_id)?;
        let stored = state.form_mut(form_id)?;
        Ok(stored.versions.iter().map(|v| v.summary.clone()).collect())
    }

    async fn get_version(&self, form_id: &str, version_id: &str) -> Result<VersionDetail> {
        let mut state = self.state();
        state.record(Operation::GetVersion, version_id)?;
        state
            .form_mut(form_id)?
            .versions
            .iter()
            .find(|v| v.summary.id == version_id)
            .map(StoredVersion::detail)
            .ok_or_else(|| ClientError::not_found(format!("version {}", version_id)))
    }

    async fn create_branch(&self, form_id: &str) -> Result<BranchedVersion> {
        let mut state = self.state();
        state.record(Operation::CreateBranch, form_id)?;

        let (number, source) = {
            let stored = state.form_mut(form_id)?;
            if stored.versions.iter().any(|v| v.summary.is_draft()) {
                return Err(ClientError::rejected(format!(
                    "form {} already has a draft version",
                    form_id
                )));
            }

            let number = stored.versions.iter().map(|v| v.summary.version).max().unwrap_or(0) + 1;
            let source = stored
                .versions
                .iter()
                .find(|v| v.summary.is_active)
                .map(|v| v.detail().fields)
                .unwrap_or_default();
            (number, source)
        };

        // Deep copy: same order, label and type, fresh ids throughout
        let mut fields = Vec::with_capacity(source.len());
        for mut f in source {
            f.id = state.next_id("fld");
            if let FieldKind::Select(options) | FieldKind::MultiSelect(options) = &mut f.kind {
                for option in options.iter_mut() {
                    option.id = state.next_id("opt");
                }
            }
            fields.push(f);
        }

        let version_id = state.next_id("ver");
        state.form_mut(form_id)?.versions.push(StoredVersion {
            summary: VersionSummary {
                id: version_id.clone(),
                version: number,
                is_active: false,
                published_at: None,
                closed_at: None,
            },
            fields: fields.clone(),
        });

        Ok(BranchedVersion {
            version_id,
            version: number,
            fields,
        })
    }

    async fn publish_version(&self, form_id: &str, version_id: &str) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::PublishVersion, version_id)?;

        let version = state
            .form_mut(form_id)?
            .versions
            .iter_mut()
            .find(|v| v.summary.id == version_id)
            .ok_or_else(|| ClientError::not_found(format!("version {}", version_id)))?;

        version.ensure_draft()?;
        version.summary.published_at = Some(Utc::now());
        Ok(())
    }

    async fn activate_version(&self, form_id: &str, version_id: &str) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::ActivateVersion, version_id)?;

        let stored = state.form_mut(form_id)?;
        let target = stored
            .versions
            .iter()
            .find(|v| v.summary.id == version_id)
            .ok_or_else(|| ClientError::not_found(format!("version {}", version_id)))?;

        if !target.summary.is_published() || target.summary.is_closed() {
            return Err(ClientError::rejected(format!(
                "version {} is {} and cannot be activated",
                version_id,
                target.summary.state()
            )));
        }

        let now = Utc::now();
        let mut number = 0;
        for v in &mut stored.versions {
            if v.summary.id == version_id {
                v.summary.is_active = true;
                number = v.summary.version;
            } else if v.summary.is_active {
                v.summary.is_active = false;
                v.summary.closed_at = Some(now);
            }
        }
        stored.form.version = number;
        Ok(())
    }

    async fn add_field(&self, version_id: &str, new_field: &NewField) -> Result<Field> {
        let mut state = self.state();
        state.record(Operation::AddField, version_id)?;

        let field_type = state
            .field_types
            .iter()
            .find(|t| t.id == new_field.field_type_id)
            .cloned()
            .ok_or_else(|| {
                ClientError::rejected(format!("unknown field type {}", new_field.field_type_id))
            })?;

        state.version_mut(version_id)?.ensure_draft()?;

        let mut kind = FieldKind::from_key(&field_type.key);
        if let Some(labels) = &new_field.options {
            let mut option_ids = Vec::with_capacity(labels.len());
            for _ in labels {
                option_ids.push(state.next_id("opt"));
            }
            let mut ids = option_ids.into_iter();
            kind.apply_rules(&RulesPatch::Options(labels.clone()), || {
                ids.next().unwrap_or_default()
            })
            .map_err(|e| ClientError::Rejected {
                status: 422,
                message: e.to_string(),
            })?;
        }

        let field = Field {
            id: state.next_id("fld"),
            label: new_field.label.clone(),
            description: String::new(),
            required: new_field.required,
            order: new_field.order,
            type_id: field_type.id,
            kind,
        };

        state.version_mut(version_id)?.fields.push(field.clone());
        Ok(field)
    }

    async fn update_field(
        &self,
        version_id: &str,
        field_id: &str,
        patch: &FieldPatch,
    ) -> Result<Field> {
        let mut state = self.state();
        state.record(Operation::UpdateField, field_id)?;

        let option_ids: Vec<String> = match &patch.rules {
            Some(RulesPatch::Options(labels)) => labels.iter().map(|_| state.next_id("opt")).collect(),
            _ => Vec::new(),
        };

        let version = state.version_mut(version_id)?;
        version.ensure_draft()?;
        let field = version.field_mut(field_id)?;

        // Validate before touching anything so a rejected patch leaves no trace
        if let Some(rules) = &patch.rules {
            field.kind.check_rules(rules).map_err(|e| ClientError::Rejected {
                status: 422,
                message: e.to_string(),
            })?;
        }

        if let Some(label) = &patch.label {
            field.label = label.clone();
        }
        if let Some(description) = &patch.description {
            field.description = description.clone();
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(rules) = &patch.rules {
            let mut ids = option_ids.into_iter();
            field
                .kind
                .apply_rules(rules, || ids.next().unwrap_or_default())
                .map_err(|e| ClientError::Rejected {
                    status: 422,
                    message: e.to_string(),
                })?;
        }

        Ok(field.clone())
    }

    async fn delete_field(&self, version_id: &str, field_id: &str) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::DeleteField, field_id)?;

        let version = state.version_mut(version_id)?;
        version.ensure_draft()?;

        let before = version.fields.len();
        version.fields.retain(|f| f.id != field_id);
        if version.fields.len() == before {
            return Err(ClientError::not_found(format!("field {}", field_id)));
        }
        Ok(())
    }

    async fn reorder_fields(&self, version_id: &str, order: &[FieldOrder]) -> Result<()> {
        let mut state = self.state();
        state.record(Operation::ReorderFields, version_id)?;

        let version = state.version_mut(version_id)?;
        version.ensure_draft()?;

        let requested: HashSet<&str> = order.iter().map(|o| o.field_id.as_str()).collect();
        let stored: HashSet<&str> = version.fields.iter().map(|f| f.id.as_str()).collect();
        if requested != stored || requested.len() != order.len() {
            return Err(ClientError::rejected(
                "reorder must list every field of the version exactly once",
            ));
        }

        for entry in order {
            version.field_mut(&entry.field_id)?.order = entry.order;
        }
        version.fields.sort_by_key(|f| f.order);
        Ok(())
    }

    async fn update_form(&self, form_id: &str, patch: &FormPatch) -> Result<Form> {
        let mut state = self.state();
        state.record(Operation::UpdateForm, form_id)?;

        let reject = |e: formdraft_schema::SchemaError| ClientError::Rejected {
            status: 422,
            message: e.to_string(),
        };
        patch.theme.validate().map_err(reject)?;
        if let Some(settings) = &patch.settings {
            settings.validate().map_err(reject)?;
        }

        let stored = state.form_mut(form_id)?;
        patch.apply_to(&mut stored.form);
        Ok(stored.form.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_version_numbers_sequentially() {
        let store = InMemoryFormService::new();
        let form_id = store.create_form("Signup");

        store
            .insert_version(&form_id, VersionState::Closed, vec![])
            .unwrap();
        store
            .insert_version(&form_id, VersionState::Active, vec![])
            .unwrap();

        let versions = store.versions(&form_id);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[1].version, 2);
        assert_eq!(versions[1].state(), VersionState::Active);
        assert_eq!(store.form(&form_id).unwrap().version, 2);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let store = InMemoryFormService::new();
        let mut state = store.state();
        state
            .failures
            .insert(Operation::ListVersions, ClientError::Unauthorized);

        assert_eq!(
            state.record(Operation::ListVersions, "f"),
            Err(ClientError::Unauthorized)
        );
        assert_eq!(state.record(Operation::ListVersions, "f"), Ok(()));
        assert_eq!(state.calls.len(), 2);
    }
}
