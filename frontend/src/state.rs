//! Channel-based IPC between async operations and the UI thread.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Messages sent from async operations to the main UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    /// Version fetch finished; `None` if no version is available
    VersionLoaded(Option<String>),
}

/// What the UI knows about the backend version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionState {
    /// Request in flight
    Loading,
    /// Backend reported a version
    Loaded(String),
    /// Request failed or the response had no version
    Unavailable,
}

impl VersionState {
    /// Text shown in the status bar.
    pub fn label(&self) -> String {
        match self {
            VersionState::Loading => "Loading…".to_string(),
            VersionState::Loaded(version) => format!("Version {}", version),
            VersionState::Unavailable => "Version unavailable".to_string(),
        }
    }
}

impl From<Option<String>> for VersionState {
    fn from(version: Option<String>) -> Self {
        match version {
            Some(version) => VersionState::Loaded(version),
            None => VersionState::Unavailable,
        }
    }
}

/// Application state with channel-based communication.
pub struct AppStateChannels {
    /// Sender for app messages (cloned for each async operation)
    pub tx: Sender<AppMessage>,
    /// Receiver for app messages (owned by main UI thread)
    pub rx: Receiver<AppMessage>,
}

impl AppStateChannels {
    /// Create new application state channels.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender for use in async operations.
    pub fn sender(&self) -> Sender<AppMessage> {
        self.tx.clone()
    }
}

impl Default for AppStateChannels {
    fn default() -> Self {
        Self::new()
    }
}
