//! Session notifications for whatever renders the editor

use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;

/// Something a UI needs to react to besides the returned result
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A new draft was created and the session now edits it
    Branched {
        from: Option<String>,
        to: String,
        version: u32,
    },
    /// The session moved onto a draft that already existed
    Rebound { from: Option<String>, to: String },
    SelectionChanged(Option<String>),
    /// The selected field has no counterpart in the new draft
    SelectionLost { field_id: String },
    SnapshotRefreshed { version_id: Option<String> },
    /// An optimistic change was replaced by the remote's state
    RolledBack { reason: String },
    Published { version_id: String, version: u32 },
}

pub trait SessionListener: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

impl SessionListener for UnboundedSender<SessionEvent> {
    fn on_event(&self, event: &SessionEvent) {
        // A dropped receiver just means nobody is listening anymore
        let _ = self.send(event.clone());
    }
}

/// Listener that keeps every event it sees
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SessionEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionListener for EventLog {
    fn on_event(&self, event: &SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
