//! # Formdraft Editor
//!
//! Draft/publish lifecycle engine behind the form editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: snapshot + selection + intents │
//! │  - field ops go through BranchCoordinator   │
//! │  - theme/settings ops go straight to remote │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ BranchCoordinator: ensure a writable draft  │
//! │  - VersionStore    (read-through queries)   │
//! │  - DraftResolver   (which version is which) │
//! │  - FieldReconciler (old field id → new id)  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ FormService (formdraft-client)              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Schemas are never edited in place**: every field mutation lands on the
//!    single draft version, branched from the active one on demand
//! 2. **Field ids are version-local**: a branch copies every field under a new
//!    id, so held ids are reconciled rather than reused
//! 3. **All-or-nothing**: an operation either hands back a consistent
//!    `{version, field}` pair or fails without touching local state
//! 4. **Server authority**: optimistic local changes are replaced by a refetch
//!    when the remote rejects them
//!
//! ## Caller obligation
//!
//! One session issues one mutation at a time and awaits it, including any
//! branch it triggers. Nothing here queues or locks: a branch started by one
//! mutation invalidates the version id an overlapping mutation is about to
//! use. `EditSession` takes `&mut self` on every mutation, which makes
//! overlapping calls on a single session impossible without extra wrapping.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use formdraft_editor::EditSession;
//! use formdraft_schema::FieldPatch;
//!
//! let mut session = EditSession::open(service, "form-1").await?;
//! session.select_field("f1")?;
//!
//! // Branches a draft first if the bound version is published
//! session.update_field("f1", FieldPatch::label("Work email")).await?;
//!
//! session.publish().await?;
//! ```

mod branch;
mod draft_resolver;
mod errors;
mod events;
pub mod optimistic;
mod reconciler;
mod session;
mod version_store;

pub use branch::{BranchCoordinator, WritableVersion, WriteTarget};
pub use draft_resolver::{DraftResolver, Resolution};
pub use errors::EditorError;
pub use events::{EventLog, SessionEvent, SessionListener};
pub use optimistic::{Pending, ReorderPlan};
pub use reconciler::{FieldReconciler, MatchTier};
pub use session::EditSession;
pub use version_store::VersionStore;

pub type Result<T> = std::result::Result<T, EditorError>;
