use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::protocol::PushEvent;
use crate::extraction::record::ExtractedJobRecord;

const PUSH_CHANNEL_CAPACITY: usize = 128;

/// Fire-and-forget sink for Push events.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: PushEvent);
}

/// Fans Push events out to every listening context and keeps the latest
/// record for readers that arrive late (the background store).
#[derive(Clone)]
pub struct Broadcaster {
    events: broadcast::Sender<PushEvent>,
    latest: Arc<watch::Sender<Option<ExtractedJobRecord>>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(PUSH_CHANNEL_CAPACITY);
        let (latest, _) = watch::channel(None);
        Self {
            events,
            latest: Arc::new(latest),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.events.subscribe()
    }

    pub fn latest(&self) -> Option<ExtractedJobRecord> {
        self.latest.borrow().clone()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for Broadcaster {
    fn publish(&self, event: PushEvent) {
        match &event {
            PushEvent::JobExtracted(record) => {
                self.latest.send_replace(Some(record.clone()));
            }
            PushEvent::JobCleared => {
                self.latest.send_replace(None);
            }
            PushEvent::PanelStateChanged { .. } => {}
        }
        let name = event.name();
        if self.events.send(event).is_err() {
            debug!(event = name, "no push listeners");
        }
    }
}
