//! # Draft Resolution
//!
//! Classifies a version list into "the draft" and "the active version".
//!
//! The remote guarantees at most one of each; when that is violated we keep
//! the first occurrence in the given order and log the breach.

use formdraft_schema::{VersionState, VersionSummary};
use tracing::warn;

/// Draft and active version of one form, either possibly absent.
///
/// Never the same version: an unpublished version flagged active is a draft,
/// and a closed version flagged active is neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub draft: Option<VersionSummary>,
    pub active: Option<VersionSummary>,
}

impl Resolution {
    /// Version an editor opens on: the draft if any, otherwise the active one
    pub fn edit_target(&self) -> Option<&VersionSummary> {
        self.draft.as_ref().or(self.active.as_ref())
    }
}

pub struct DraftResolver;

impl DraftResolver {
    pub fn resolve(versions: &[VersionSummary]) -> Resolution {
        let mut drafts = versions.iter().filter(|v| v.is_draft());
        let draft = drafts.next().cloned();
        let extra_drafts = drafts.count();
        if extra_drafts > 0 {
            warn!(
                extra = extra_drafts,
                kept = ?draft.as_ref().map(|v| &v.id),
                "More than one draft version; using the first"
            );
        }

        let mut actives = versions
            .iter()
            .filter(|v| v.state() == VersionState::Active);
        let active = actives.next().cloned();
        let extra_actives = actives.count();
        if extra_actives > 0 {
            warn!(
                extra = extra_actives,
                kept = ?active.as_ref().map(|v| &v.id),
                "More than one active version; using the first"
            );
        }

        Resolution { draft, active }
    }

    /// Version a publish should make live.
    ///
    /// The draft if there is one. Otherwise a version that was published but
    /// never activated (newer than the active one) takes precedence, so an
    /// interrupted publish is finished rather than skipped. Falls back to the
    /// active version.
    pub fn publish_target(versions: &[VersionSummary]) -> Option<VersionSummary> {
        let resolution = Self::resolve(versions);
        if let Some(draft) = resolution.draft {
            return Some(draft);
        }

        let floor = resolution.active.as_ref().map(|v| v.version);
        let stranded = versions
            .iter()
            .filter(|v| v.state() == VersionState::Published)
            .filter(|v| floor.map_or(true, |active| v.version > active))
            .max_by_key(|v| v.version)
            .cloned();
        if let Some(stranded) = &stranded {
            warn!(version_id = %stranded.id, version = stranded.version, "Found a published version that was never activated");
        }

        stranded.or(resolution.active)
    }

    /// Only an existing draft accepts field mutations
    pub fn is_writable(version: Option<&VersionSummary>) -> bool {
        version.map(VersionSummary::is_draft).unwrap_or(false)
    }
}
