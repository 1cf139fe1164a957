//! # Field Reconciliation
//!
//! Maps a field id from one version onto the matching field of another.
//!
//! A branch copies every field under a fresh id, so a held id is useless in
//! the new draft. Matching is tiered and the first hit wins:
//!
//! 1. **Exact**: same label, order and type key
//! 2. **Order**: same order
//! 3. **Position**: same index in the list
//!
//! No tier matching yields `None`, which callers surface as a stale
//! reference. Ties inside a tier are not broken: the first candidate in
//! list order is taken.

use formdraft_schema::Field;
use tracing::{debug, warn};

/// Which tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Order,
    Position,
}

pub struct FieldReconciler;

impl FieldReconciler {
    /// Id of the field in `new_fields` that corresponds to `old_field_id`
    pub fn reconcile(old_fields: &[Field], old_field_id: &str, new_fields: &[Field]) -> Option<String> {
        Self::reconcile_with_tier(old_fields, old_field_id, new_fields).map(|(id, _)| id)
    }

    pub fn reconcile_with_tier(
        old_fields: &[Field],
        old_field_id: &str,
        new_fields: &[Field],
    ) -> Option<(String, MatchTier)> {
        let Some(index) = old_fields.iter().position(|f| f.id == old_field_id) else {
            warn!(field_id = %old_field_id, "Field missing from the old version, cannot reconcile");
            return None;
        };
        let old = &old_fields[index];

        let found = new_fields
            .iter()
            .find(|f| f.label == old.label && f.order == old.order && f.type_key() == old.type_key())
            .map(|f| (f, MatchTier::Exact))
            .or_else(|| {
                new_fields
                    .iter()
                    .find(|f| f.order == old.order)
                    .map(|f| (f, MatchTier::Order))
            })
            .or_else(|| new_fields.get(index).map(|f| (f, MatchTier::Position)));

        match found {
            Some((field, tier)) => {
                debug!(from = %old_field_id, to = %field.id, ?tier, "Reconciled field");
                Some((field.id.clone(), tier))
            }
            None => {
                warn!(field_id = %old_field_id, "No matching field in the new version");
                None
            }
        }
    }

    /// Reconcile several ids at once; `None` entries are misses
    pub fn reconcile_all<'a>(
        old_fields: &[Field],
        old_field_ids: impl IntoIterator<Item = &'a str>,
        new_fields: &[Field],
    ) -> Vec<Option<String>> {
        old_field_ids
            .into_iter()
            .map(|id| Self::reconcile(old_fields, id, new_fields))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formdraft_schema::FieldKind;

    fn field(id: &str, label: &str, order: u32, key: &str) -> Field {
        Field {
            id: id.to_string(),
            label: label.to_string(),
            description: String::new(),
            required: false,
            order,
            type_id: format!("type-{}", key),
            kind: FieldKind::from_key(key),
        }
    }

    #[test]
    fn test_exact_match() {
        let old = vec![field("a", "Email", 0, "email")];
        let new = vec![field("x", "Email", 0, "email")];

        assert_eq!(
            FieldReconciler::reconcile_with_tier(&old, "a", &new),
            Some(("x".to_string(), MatchTier::Exact))
        );
    }

    #[test]
    fn test_order_match_after_label_change() {
        let old = vec![field("a", "Email", 0, "email")];
        let new = vec![field("x", "Work Email", 0, "email")];

        assert_eq!(
            FieldReconciler::reconcile_with_tier(&old, "a", &new),
            Some(("x".to_string(), MatchTier::Order))
        );
    }

    #[test]
    fn test_empty_new_list() {
        let old = vec![field("a", "Email", 0, "email")];
        assert_eq!(FieldReconciler::reconcile(&old, "a", &[]), None);
    }

    #[test]
    fn test_unknown_old_id() {
        let old = vec![field("a", "Email", 0, "email")];
        let new = vec![field("x", "Email", 0, "email")];
        assert_eq!(FieldReconciler::reconcile(&old, "zzz", &new), None);
    }

    #[test]
    fn test_positional_fallback() {
        let old = vec![field("a", "Name", 0, "text"), field("b", "Email", 1, "email")];
        // Orders renumbered from 10, nothing shares an order
        let new = vec![field("x", "Name", 10, "text"), field("y", "Mail", 11, "email")];

        assert_eq!(
            FieldReconciler::reconcile_with_tier(&old, "b", &new),
            Some(("y".to_string(), MatchTier::Position))
        );
    }

    #[test]
    fn test_positional_fallback_out_of_range() {
        let old = vec![field("a", "Name", 0, "text"), field("b", "Email", 1, "email")];
        let new = vec![field("x", "Name", 10, "text")];
        assert_eq!(FieldReconciler::reconcile(&old, "b", &new), None);
    }

    #[test]
    fn test_exact_beats_order() {
        let old = vec![field("a", "Email", 1, "email")];
        let new = vec![field("x", "Phone", 1, "phone"), field("y", "Email", 1, "email")];
        assert_eq!(FieldReconciler::reconcile(&old, "a", &new), Some("y".to_string()));
    }

    #[test]
    fn test_first_match_wins_on_ties() {
        let old = vec![field("a", "Email", 0, "email")];
        let new = vec![field("x", "Email", 0, "email"), field("y", "Email", 0, "email")];
        assert_eq!(FieldReconciler::reconcile(&old, "a", &new), Some("x".to_string()));
    }

    #[test]
    fn test_type_change_falls_to_order() {
        let old = vec![field("a", "Age", 2, "text")];
        let new = vec![field("x", "Age", 2, "number")];

        assert_eq!(
            FieldReconciler::reconcile_with_tier(&old, "a", &new).map(|(_, t)| t),
            Some(MatchTier::Order)
        );
    }

    #[test]
    fn test_reconcile_all() {
        let old = vec![field("a", "Name", 0, "text"), field("b", "Email", 1, "email")];
        let new = vec![field("x", "Name", 0, "text"), field("y", "Email", 1, "email")];

        assert_eq!(
            FieldReconciler::reconcile_all(&old, ["b", "missing", "a"], &new),
            vec![Some("y".to_string()), None, Some("x".to_string())]
        );
    }
}
