//! # Optimistic Changes
//!
//! Two-phase local changes: apply now, then confirm once the remote accepts
//! or roll back by replacing local state with a freshly fetched authoritative
//! copy. There is no local undo; the remote is the only source of truth.
//!
//! ```text
//! apply() ──▶ Pending ──confirm()──▶ (done)
//!                │
//!                └──rollback(authoritative)──▶ state replaced
//! ```

use crate::reconciler::FieldReconciler;
use crate::EditorError;
use formdraft_schema::{Field, FieldOrder};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Apply `change` to `state` and return the pending commit for it
pub fn apply<T>(label: &'static str, state: &mut T, change: impl FnOnce(&mut T)) -> Pending {
    change(state);
    debug!(change = label, "Applied optimistic change");
    Pending { label }
}

/// An applied local change awaiting the remote's verdict
#[derive(Debug)]
#[must_use = "an optimistic change must be confirmed or rolled back"]
pub struct Pending {
    label: &'static str,
}

impl Pending {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn confirm(self) {
        debug!(change = self.label, "Optimistic change confirmed");
    }

    /// Replace the optimistic state with what the remote reports
    pub fn rollback<T>(self, state: &mut T, authoritative: T) {
        info!(change = self.label, "Rolling back optimistic change");
        *state = authoritative;
    }

    /// The remote rejected the change and the authoritative state could not
    /// be fetched either; local state stays optimistic until the next refresh.
    pub fn abandon(self) {
        warn!(change = self.label, "Optimistic change left unconfirmed");
    }
}

/// A validated new ordering for every field of a version
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderPlan {
    before: Vec<Field>,
    ordered_ids: Vec<String>,
}

impl ReorderPlan {
    /// `ordered_ids` must name every field of `fields` exactly once
    pub fn new(fields: &[Field], ordered_ids: &[String]) -> Result<Self, EditorError> {
        if ordered_ids.len() != fields.len() {
            return Err(EditorError::InvalidReorder(format!(
                "expected {} field ids, got {}",
                fields.len(),
                ordered_ids.len()
            )));
        }

        let mut seen = HashSet::new();
        for id in ordered_ids {
            if !seen.insert(id.as_str()) {
                return Err(EditorError::InvalidReorder(format!("field {} listed twice", id)));
            }
            if !fields.iter().any(|f| &f.id == id) {
                return Err(EditorError::FieldNotFound(id.clone()));
            }
        }

        Ok(Self {
            before: fields.to_vec(),
            ordered_ids: ordered_ids.to_vec(),
        })
    }

    /// Fields as they were when the plan was made
    pub fn before(&self) -> &[Field] {
        &self.before
    }

    pub fn ordered_ids(&self) -> &[String] {
        &self.ordered_ids
    }

    /// Order assignments to send, positions numbered from zero
    pub fn assignments(&self) -> Vec<FieldOrder> {
        self.ordered_ids
            .iter()
            .enumerate()
            .map(|(order, id)| FieldOrder {
                field_id: id.clone(),
                order: order as u32,
            })
            .collect()
    }

    /// Rearrange `fields` into the planned order and renumber them
    pub fn apply_local(&self, fields: &mut Vec<Field>) {
        let position = |field: &Field| {
            self.ordered_ids
                .iter()
                .position(|id| *id == field.id)
                .unwrap_or(usize::MAX)
        };
        fields.sort_by_key(|f| position(f));
        for (order, field) in fields.iter_mut().enumerate() {
            field.order = order as u32;
        }
    }

    /// The same plan expressed in the ids of another version.
    ///
    /// Every id has to reconcile to a distinct field, otherwise the ordering
    /// cannot be carried over.
    pub fn remap(&self, new_fields: &[Field]) -> Result<ReorderPlan, EditorError> {
        let mut mapped = Vec::with_capacity(self.ordered_ids.len());
        for id in &self.ordered_ids {
            let new_id = FieldReconciler::reconcile(&self.before, id, new_fields)
                .ok_or_else(|| EditorError::StaleReference { field_id: id.clone() })?;
            mapped.push(new_id);
        }

        let distinct: HashSet<&str> = mapped.iter().map(String::as_str).collect();
        if distinct.len() != mapped.len() {
            return Err(EditorError::InvalidReorder(
                "fields of the new draft could not be matched one to one".to_string(),
            ));
        }

        ReorderPlan::new(new_fields, &mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdraft_schema::FieldKind;

    fn field(id: &str, label: &str, order: u32) -> Field {
        Field {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            required: false,
            order,
            type_id: "type-text".to_string(),
            kind: FieldKind::from_key("text"),
        }
    }

    fn ids(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.id.as_str()).collect()
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rollback_replaces_state() {
        let mut fields = vec![field("a", "A", 0), field("b", "B", 1)];
        let authoritative = fields.clone();
        let plan = ReorderPlan::new(&fields, &strings(&["b", "a"])).unwrap();

        let pending = apply("reorder", &mut fields, |f| plan.apply_local(f));
        assert_eq!(ids(&fields), vec!["b", "a"]);

        pending.rollback(&mut fields, authoritative.clone());
        assert_eq!(fields, authoritative);
    }

    #[test]
    fn test_confirm_keeps_state() {
        let mut required = false;
        let pending = apply("toggle", &mut required, |r| *r = !*r);
        assert_eq!(pending.label(), "toggle");
        pending.confirm();
        assert!(required);
    }

    #[test]
    fn test_apply_local_renumbers() {
        let mut fields = vec![field("a", "A", 0), field("b", "B", 1), field("c", "C", 2)];
        let plan = ReorderPlan::new(&fields, &strings(&["c", "a", "b"])).unwrap();

        plan.apply_local(&mut fields);

        assert_eq!(ids(&fields), vec!["c", "a", "b"]);
        assert_eq!(fields.iter().map(|f| f.order).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_assignments() {
        let fields = vec![field("a", "A", 0), field("b", "B", 1)];
        let plan = ReorderPlan::new(&fields, &strings(&["b", "a"])).unwrap();

        assert_eq!(
            plan.assignments(),
            vec![
                FieldOrder { field_id: "b".to_string(), order: 0 },
                FieldOrder { field_id: "a".to_string(), order: 1 },
            ]
        );
    }

    #[test]
    fn test_plan_rejects_partial_and_duplicate_lists() {
        let fields = vec![field("a", "A", 0), field("b", "B", 1)];

        assert!(matches!(
            ReorderPlan::new(&fields, &strings(&["a"])),
            Err(EditorError::InvalidReorder(_))
        ));
        assert!(matches!(
            ReorderPlan::new(&fields, &strings(&["a", "a"])),
            Err(EditorError::InvalidReorder(_))
        ));
        assert!(matches!(
            ReorderPlan::new(&fields, &strings(&["a", "z"])),
            Err(EditorError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_remap_onto_branch() {
        let old = vec![field("a", "A", 0), field("b", "B", 1)];
        let new = vec![field("x", "A", 0), field("y", "B", 1)];
        let plan = ReorderPlan::new(&old, &strings(&["b", "a"])).unwrap();

        let remapped = plan.remap(&new).unwrap();
        assert_eq!(remapped.ordered_ids(), strings(&["y", "x"]).as_slice());
        assert_eq!(remapped.before(), new.as_slice());
    }

    #[test]
    fn test_remap_miss_is_stale() {
        let old = vec![field("a", "A", 0), field("b", "B", 1)];
        let new = vec![field("x", "A", 0)];
        let plan = ReorderPlan::new(&old, &strings(&["b", "a"])).unwrap();

        assert!(matches!(
            plan.remap(&new),
            Err(EditorError::StaleReference { field_id }) if field_id == "b"
        ));
    }
}
