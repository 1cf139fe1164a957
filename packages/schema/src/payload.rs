//! Request payloads for version-scoped field mutations

use crate::field::{NumberRules, TextRules};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Body of the add-field call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewField {
    pub label: String,
    pub field_type_id: String,
    pub required: bool,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// One entry of the reorder call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOrder {
    pub field_id: String,
    pub order: u32,
}

/// Type-specific part of a field update
///
/// Only one family of bounds can be sent at a time, and which family is
/// allowed depends on the target field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RulesPatch {
    Text(TextRules),
    Number(NumberRules),
    /// Replacement option labels, in display order
    Options(Vec<String>),
}

impl RulesPatch {
    pub fn name(&self) -> &'static str {
        match self {
            RulesPatch::Text(_) => "text",
            RulesPatch::Number(_) => "number",
            RulesPatch::Options(_) => "options",
        }
    }
}

/// Partial field update; `None` leaves a property untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub rules: Option<RulesPatch>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rules(mut self, rules: RulesPatch) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.description.is_none()
            && self.required.is_none()
            && self.rules.is_none()
    }
}

// Bounds inside a rules family are always sent together so that `None`
// reaches the service as an explicit `null` and clears the stored bound.
impl Serialize for FieldPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        if let Some(label) = &self.label {
            map.serialize_entry("label", label)?;
        }
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        if let Some(required) = &self.required {
            map.serialize_entry("required", required)?;
        }

        match &self.rules {
            Some(RulesPatch::Text(r)) => {
                map.serialize_entry("minLength", &r.min_length)?;
                map.serialize_entry("maxLength", &r.max_length)?;
                map.serialize_entry("pattern", &r.pattern)?;
            }
            Some(RulesPatch::Number(r)) => {
                map.serialize_entry("minValue", &r.min_value)?;
                map.serialize_entry("maxValue", &r.max_value)?;
            }
            Some(RulesPatch::Options(labels)) => {
                map.serialize_entry("options", labels)?;
            }
            None => {}
        }

        map.end()
    }
}
