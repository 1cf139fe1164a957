//! # Fields
//!
//! One schema element within a form version.
//!
//! Validation bounds live on the [`FieldKind`] variant that can use them, so a
//! `minLength` on a rating field or a `minValue` on an email field cannot be
//! built in the first place. The flat JSON shape the form service speaks is
//! handled by [`crate::wire::FieldRecord`].

use crate::payload::RulesPatch;
use crate::wire::FieldRecord;
use crate::SchemaError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A field inside one form version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FieldRecord", into = "FieldRecord")]
pub struct Field {
    /// Only unique within the owning version
    pub id: String,

    pub label: String,

    pub description: String,

    pub required: bool,

    /// Display position, unique within the owning version
    pub order: u32,

    /// Catalog id of the field type
    pub type_id: String,

    /// Type key plus the type-specific payload
    pub kind: FieldKind,
}

impl Field {
    /// Type key, e.g. `text` or `select`
    pub fn type_key(&self) -> &str {
        self.kind.key()
    }
}

/// Choice for `select` / `multiselect` fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// Bounds for string-valued fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRules {
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
}

impl TextRules {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(SchemaError::InvalidRules(format!(
                    "minLength {} exceeds maxLength {}",
                    min, max
                )));
            }
        }

        if let Some(pattern) = &self.pattern {
            Regex::new(pattern).map_err(|e| {
                SchemaError::InvalidRules(format!("pattern '{}' does not compile: {}", pattern, e))
            })?;
        }

        Ok(())
    }
}

/// Bounds for numeric fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberRules {
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl NumberRules {
    pub fn validate(&self) -> Result<(), SchemaError> {
        let bounds = [self.min_value, self.max_value];
        if bounds.iter().flatten().any(|v| !v.is_finite()) {
            return Err(SchemaError::InvalidRules(
                "numeric bounds must be finite".to_string(),
            ));
        }

        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) if min > max => Err(SchemaError::InvalidRules(format!(
                "minValue {} exceeds maxValue {}",
                min, max
            ))),
            _ => Ok(()),
        }
    }
}

/// Field type with its type-specific payload
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text(TextRules),
    Email(TextRules),
    Url(TextRules),
    Phone(TextRules),
    Number(NumberRules),
    Rating(NumberRules),
    Select(Vec<FieldOption>),
    MultiSelect(Vec<FieldOption>),
    Date,
    Boolean,
    /// Type key this crate does not know about; carried through untouched
    Other(String),
}

impl FieldKind {
    /// Build an empty kind for a type key
    pub fn from_key(key: &str) -> Self {
        match key {
            "text" => FieldKind::Text(TextRules::default()),
            "email" => FieldKind::Email(TextRules::default()),
            "url" => FieldKind::Url(TextRules::default()),
            "phone" => FieldKind::Phone(TextRules::default()),
            "number" => FieldKind::Number(NumberRules::default()),
            "rating" => FieldKind::Rating(NumberRules::default()),
            "select" => FieldKind::Select(Vec::new()),
            "multiselect" => FieldKind::MultiSelect(Vec::new()),
            "date" => FieldKind::Date,
            "boolean" => FieldKind::Boolean,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::Email(_) => "email",
            FieldKind::Url(_) => "url",
            FieldKind::Phone(_) => "phone",
            FieldKind::Number(_) => "number",
            FieldKind::Rating(_) => "rating",
            FieldKind::Select(_) => "select",
            FieldKind::MultiSelect(_) => "multiselect",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::Other(key) => key,
        }
    }

    pub fn text_rules(&self) -> Option<&TextRules> {
        match self {
            FieldKind::Text(r) | FieldKind::Email(r) | FieldKind::Url(r) | FieldKind::Phone(r) => {
                Some(r)
            }
            _ => None,
        }
    }

    pub fn number_rules(&self) -> Option<&NumberRules> {
        match self {
            FieldKind::Number(r) | FieldKind::Rating(r) => Some(r),
            _ => None,
        }
    }

    pub fn options(&self) -> &[FieldOption] {
        match self {
            FieldKind::Select(options) | FieldKind::MultiSelect(options) => options,
            _ => &[],
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, FieldKind::Select(_) | FieldKind::MultiSelect(_))
    }

    /// Check that a rules patch fits this kind and is internally consistent
    pub fn check_rules(&self, rules: &RulesPatch) -> Result<(), SchemaError> {
        let compatible = match rules {
            RulesPatch::Text(_) => self.text_rules().is_some(),
            RulesPatch::Number(_) => self.number_rules().is_some(),
            RulesPatch::Options(_) => self.has_options(),
        };

        if !compatible {
            return Err(SchemaError::IncompatibleRules {
                field_type: self.key().to_string(),
                rules: rules.name(),
            });
        }

        match rules {
            RulesPatch::Text(r) => r.validate(),
            RulesPatch::Number(r) => r.validate(),
            RulesPatch::Options(labels) => {
                if labels.iter().any(|l| l.trim().is_empty()) {
                    Err(SchemaError::InvalidRules("option labels must not be blank".to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Apply a rules patch in place; option ids come from `next_option_id`
    pub fn apply_rules(
        &mut self,
        rules: &RulesPatch,
        mut next_option_id: impl FnMut() -> String,
    ) -> Result<(), SchemaError> {
        self.check_rules(rules)?;

        match (self, rules) {
            (
                FieldKind::Text(r) | FieldKind::Email(r) | FieldKind::Url(r) | FieldKind::Phone(r),
                RulesPatch::Text(new),
            ) => *r = new.clone(),
            (FieldKind::Number(r) | FieldKind::Rating(r), RulesPatch::Number(new)) => {
                *r = new.clone()
            }
            (FieldKind::Select(options) | FieldKind::MultiSelect(options), RulesPatch::Options(labels)) => {
                *options = labels
                    .iter()
                    .map(|label| FieldOption {
                        id: next_option_id(),
                        label: label.clone(),
                        value: label.clone(),
                    })
                    .collect();
            }
            // check_rules already rejected every other pairing
            _ => {}
        }

        Ok(())
    }
}

/// Entry in the form service's field-type catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeInfo {
    pub id: String,
    pub key: String,
    pub value_kind: String,
    pub has_options: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrips_key() {
        for key in [
            "text", "email", "url", "phone", "number", "rating", "select", "multiselect", "date",
            "boolean", "signature",
        ] {
            assert_eq!(FieldKind::from_key(key).key(), key);
        }
    }

    #[test]
    fn test_text_rules_reject_inverted_bounds() {
        let rules = TextRules {
            min_length: Some(10),
            max_length: Some(2),
            pattern: None,
        };
        assert!(matches!(rules.validate(), Err(SchemaError::InvalidRules(_))));
    }

    #[test]
    fn test_text_rules_reject_bad_pattern() {
        let rules = TextRules {
            pattern: Some("([a-z".to_string()),
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_number_rules_on_email_is_incompatible() {
        let kind = FieldKind::from_key("email");
        let err = kind
            .check_rules(&RulesPatch::Number(NumberRules::default()))
            .unwrap_err();

        assert_eq!(
            err,
            SchemaError::IncompatibleRules {
                field_type: "email".to_string(),
                rules: "number",
            }
        );
    }

    #[test]
    fn test_apply_options_assigns_ids() {
        let mut kind = FieldKind::from_key("select");
        let mut n = 0;
        kind.apply_rules(
            &RulesPatch::Options(vec!["Red".to_string(), "Blue".to_string()]),
            || {
                n += 1;
                format!("opt-{}", n)
            },
        )
        .unwrap();

        let options = kind.options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].id, "opt-1");
        assert_eq!(options[1].value, "Blue");
    }

    #[test]
    fn test_options_on_date_is_incompatible() {
        let kind = FieldKind::Date;
        assert!(kind
            .check_rules(&RulesPatch::Options(vec!["x".to_string()]))
            .is_err());
    }
}
