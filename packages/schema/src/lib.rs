//! # Formdraft Schema
//!
//! Data model shared by the form-service client and the editing engine.
//!
//! ## Shape
//!
//! ```text
//! Form ──owns──▶ FormVersion* ──owns──▶ Field*
//!  │                 │                    │
//!  ├ Theme           ├ publishedAt        ├ order (unique per version)
//!  └ FormSettings    ├ closedAt           └ FieldKind (tagged by type key)
//!                    └ isActive
//! ```
//!
//! A field id only means something inside the version that owns it. Branching
//! a version deep-copies every field under a new id, which is why the editor
//! has to reconcile ids after a branch.
//!
//! Everything here is plain data: no I/O, no async.

mod error;
mod field;
mod form;
mod payload;
mod version;
pub mod wire;

pub use error::SchemaError;
pub use field::{Field, FieldKind, FieldOption, FieldTypeInfo, NumberRules, TextRules};
pub use form::{Form, FormPatch, FormSettings, Theme, ThemePatch};
pub use payload::{FieldOrder, FieldPatch, NewField, RulesPatch};
pub use version::{BranchedVersion, VersionDetail, VersionState, VersionSummary};
