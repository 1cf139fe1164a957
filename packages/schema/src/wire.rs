//! Flat JSON shapes spoken by the form service.
//!
//! The service sends every validation bound as an optional top-level property
//! regardless of the field type. [`FieldRecord`] mirrors that shape and is the
//! serde proxy for [`Field`]: bounds that do not fit the type key are dropped
//! on the way in and never emitted on the way out.

use crate::field::{Field, FieldKind, FieldOption, NumberRules, TextRules};
use crate::payload::FieldOrder;
use serde::{Deserialize, Serialize};

/// `type` object nested in a field record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeRef {
    pub key: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub order: u32,
    #[serde(rename = "type")]
    pub field_type: FieldTypeRef,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl From<FieldRecord> for Field {
    fn from(record: FieldRecord) -> Self {
        let text = TextRules {
            min_length: record.min_length,
            max_length: record.max_length,
            pattern: record.pattern,
        };
        let number = NumberRules {
            min_value: record.min_value,
            max_value: record.max_value,
        };

        let kind = match FieldKind::from_key(&record.field_type.key) {
            FieldKind::Text(_) => FieldKind::Text(text),
            FieldKind::Email(_) => FieldKind::Email(text),
            FieldKind::Url(_) => FieldKind::Url(text),
            FieldKind::Phone(_) => FieldKind::Phone(text),
            FieldKind::Number(_) => FieldKind::Number(number),
            FieldKind::Rating(_) => FieldKind::Rating(number),
            FieldKind::Select(_) => FieldKind::Select(record.options),
            FieldKind::MultiSelect(_) => FieldKind::MultiSelect(record.options),
            other => other,
        };

        Field {
            id: record.id,
            label: record.label,
            description: record.description.unwrap_or_default(),
            required: record.required,
            order: record.order,
            type_id: record.field_type.id,
            kind,
        }
    }
}

impl From<Field> for FieldRecord {
    fn from(field: Field) -> Self {
        let field_type = FieldTypeRef {
            key: field.kind.key().to_string(),
            id: field.type_id,
        };

        let mut record = FieldRecord {
            id: field.id,
            label: field.label,
            description: Some(field.description),
            required: field.required,
            order: field.order,
            field_type,
            options: Vec::new(),
            min_length: None,
            max_length: None,
            pattern: None,
            min_value: None,
            max_value: None,
        };

        match field.kind {
            FieldKind::Text(r) | FieldKind::Email(r) | FieldKind::Url(r) | FieldKind::Phone(r) => {
                record.min_length = r.min_length;
                record.max_length = r.max_length;
                record.pattern = r.pattern;
            }
            FieldKind::Number(r) | FieldKind::Rating(r) => {
                record.min_value = r.min_value;
                record.max_value = r.max_value;
            }
            FieldKind::Select(options) | FieldKind::MultiSelect(options) => {
                record.options = options;
            }
            FieldKind::Date | FieldKind::Boolean | FieldKind::Other(_) => {}
        }

        record
    }
}

/// Body of the reorder call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub fields: Vec<FieldOrder>,
}
