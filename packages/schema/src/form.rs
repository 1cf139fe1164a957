//! Form-level metadata: identity, theme and submission settings.
//!
//! None of this is version-scoped. Changing it never requires a draft.

use crate::SchemaError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: String,
    /// Number of the version currently served to submitters
    #[serde(default)]
    pub version: u32,
    #[serde(flatten)]
    pub theme: Theme,
    #[serde(default)]
    pub settings: Option<FormSettings>,
}

/// Presentation colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub primary_color: String,
    pub background_color: String,
    pub button_color: String,
    pub text_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            background_color: "#ffffff".to_string(),
            button_color: "#2563eb".to_string(),
            text_color: "#0f172a".to_string(),
        }
    }
}

/// Partial theme update; `None` leaves a color untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl ThemePatch {
    pub fn is_empty(&self) -> bool {
        self.colors().all(|(_, c)| c.is_none())
    }

    /// Every color must be `#rgb` or `#rrggbb`
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (name, color) in self.colors() {
            if let Some(color) = color {
                if !is_hex_color(color) {
                    return Err(SchemaError::InvalidTheme(format!(
                        "{} '{}' is not a hex color",
                        name, color
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn apply(&self, theme: &mut Theme) {
        let targets = [
            (&self.primary_color, &mut theme.primary_color),
            (&self.background_color, &mut theme.background_color),
            (&self.button_color, &mut theme.button_color),
            (&self.text_color, &mut theme.text_color),
        ];
        for (patch, target) in targets {
            if let Some(color) = patch {
                *target = color.clone();
            }
        }
    }

    fn colors(&self) -> impl Iterator<Item = (&'static str, Option<&String>)> {
        [
            ("primaryColor", self.primary_color.as_ref()),
            ("backgroundColor", self.background_color.as_ref()),
            ("buttonColor", self.button_color.as_ref()),
            ("textColor", self.text_color.as_ref()),
        ]
        .into_iter()
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Submission limits and scheduling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub max_submissions: Option<u32>,
    #[serde(default = "default_allow_multiple")]
    pub allow_multiple_submissions: bool,
    #[serde(default)]
    pub open_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub success_message: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

fn default_allow_multiple() -> bool {
    true
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            id: None,
            max_submissions: None,
            allow_multiple_submissions: true,
            open_at: None,
            close_at: None,
            success_message: Some("Thank you for your response!".to_string()),
            redirect_url: None,
        }
    }
}

impl FormSettings {
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.max_submissions == Some(0) {
            return Err(SchemaError::InvalidSettings(
                "maxSubmissions must be at least 1".to_string(),
            ));
        }

        if let (Some(open), Some(close)) = (self.open_at, self.close_at) {
            if open > close {
                return Err(SchemaError::InvalidSettings(format!(
                    "openAt {} is after closeAt {}",
                    open, close
                )));
            }
        }

        Ok(())
    }
}

/// Body of `PATCH /forms/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub theme: ThemePatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<FormSettings>,
}

impl FormPatch {
    pub fn details(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: Some(title.into()),
            description,
            ..Default::default()
        }
    }

    pub fn theme(theme: ThemePatch) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    pub fn settings(settings: FormSettings) -> Self {
        Self {
            settings: Some(settings),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, form: &mut Form) {
        if let Some(title) = &self.title {
            form.title = title.clone();
        }
        if let Some(description) = &self.description {
            form.description = Some(description.clone());
        }
        self.theme.apply(&mut form.theme);
        if let Some(settings) = &self.settings {
            let id = form.settings.as_ref().and_then(|s| s.id.clone());
            form.settings = Some(FormSettings {
                id: settings.id.clone().or(id),
                ..settings.clone()
            });
        }
    }
}
