//! # Form Versions
//!
//! One schema snapshot of a form.
//!
//! ## Lifecycle
//!
//! ```text
//!            publish           activate
//!  Draft ──────────────▶ Published ──────────▶ Active
//!  (mutable)             (immutable)            (served)
//!                                                 │ superseded
//!                                                 ▼
//!                                               Closed
//! ```
//!
//! The draft predicate is `publishedAt == null && closedAt == null`; it takes
//! precedence over `isActive` so a version can never be both writable and live.

use crate::field::Field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the version's timestamps and flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    Draft,
    Published,
    Active,
    Closed,
}

impl std::fmt::Display for VersionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VersionState::Draft => "draft",
            VersionState::Published => "published",
            VersionState::Active => "active",
            VersionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Entry of the version list (no field payload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub id: String,
    pub version: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl VersionSummary {
    pub fn is_draft(&self) -> bool {
        self.published_at.is_none() && self.closed_at.is_none()
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn state(&self) -> VersionState {
        if self.is_draft() {
            VersionState::Draft
        } else if self.is_closed() {
            VersionState::Closed
        } else if self.is_active {
            VersionState::Active
        } else {
            VersionState::Published
        }
    }
}

/// A version with its full field list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDetail {
    pub id: String,
    pub version: u32,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Response of the branch-creation call: the new draft and its copied fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchedVersion {
    pub version_id: String,
    pub version: u32,
    #[serde(default)]
    pub fields: Vec<Field>,
}
