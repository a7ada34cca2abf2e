//! The host page as seen by the extraction engine: current location, current
//! document snapshot, and a fan-out of DOM mutation notifications.

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use tokio::sync::broadcast;

const MUTATION_CHANNEL_CAPACITY: usize = 64;

/// Events the page shim forwards from the browser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Loaded { url: String, html: String },
    /// `url` is set when the location moved without a history call the shim
    /// could intercept; only the polling fallback notices such changes.
    DomMutated {
        html: String,
        #[serde(default)]
        url: Option<String>,
    },
    PushState { url: String },
    ReplaceState { url: String },
    Popstate { url: String },
    Hashchange { url: String },
    Unload,
}

/// An immutable copy of the page taken at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

/// One childList/subtree mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationBatch {
    pub revision: u64,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    html: String,
    revision: u64,
}

#[derive(Clone)]
pub struct HostPage {
    state: Arc<RwLock<PageState>>,
    mutations: broadcast::Sender<MutationBatch>,
}

impl HostPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        let (mutations, _) = broadcast::channel(MUTATION_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(PageState {
                url: url.into(),
                html: html.into(),
                revision: 0,
            })),
            mutations,
        }
    }

    pub fn href(&self) -> String {
        self.read(|s| s.url.clone())
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.read(|s| PageSnapshot {
            url: s.url.clone(),
            html: s.html.clone(),
        })
    }

    /// Swaps in a freshly loaded document. Observers are not notified: a new
    /// document means a new session.
    pub fn replace_document(&self, url: impl Into<String>, html: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.url = url.into();
        state.html = html.into();
        state.revision += 1;
    }

    /// Records a mutation batch and notifies every subscriber.
    pub fn apply_mutation(&self, html: impl Into<String>) {
        let revision = {
            let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
            state.html = html.into();
            state.revision += 1;
            state.revision
        };
        // No observers attached is a normal state.
        let _ = self.mutations.send(MutationBatch { revision });
    }

    /// Updates the location without touching the document (history API style).
    pub fn set_url(&self, url: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.url = url.into();
    }

    pub fn subscribe_mutations(&self) -> broadcast::Receiver<MutationBatch> {
        self.mutations.subscribe()
    }

    fn read<T>(&self, f: impl FnOnce(&PageState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }
}
