//! Consolidates every way the host can change location into one stream.
//!
//! History calls and native navigation events arrive through
//! [`NavigationAdapter::observe_navigation`]; a polling task catches changes
//! that bypass both. Subscribers see a single `NavigationSignal` stream and
//! dedup by URL themselves.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::host::HostPage;

const SIGNAL_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    PushState,
    ReplaceState,
    PopState,
    HashChange,
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSignal {
    pub source: SignalSource,
    pub url: String,
}

#[derive(Clone)]
pub struct NavigationAdapter {
    page: HostPage,
    signals: broadcast::Sender<NavigationSignal>,
    poller: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl NavigationAdapter {
    pub fn new(page: HostPage) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        Self {
            page,
            signals,
            poller: Arc::new(Mutex::new(None)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationSignal> {
        self.signals.subscribe()
    }

    /// Single interception point for history calls and navigation events:
    /// moves the page location, then notifies subscribers.
    pub fn observe_navigation(&self, source: SignalSource, url: impl Into<String>) {
        let url = url.into();
        self.page.set_url(url.clone());
        self.emit(NavigationSignal { source, url });
    }

    /// Starts the fallback URL poller. A second call while running is a no-op.
    pub fn start_polling(&self, every: Duration) {
        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let page = self.page.clone();
        let signals = self.signals.clone();
        let mut last_seen = page.href();
        info!(interval_ms = every.as_millis() as u64, "url poller started");

        *poller = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let href = page.href();
                if href != last_seen {
                    debug!(url = %href, "poller observed url change");
                    last_seen = href.clone();
                    let _ = signals.send(NavigationSignal {
                        source: SignalSource::Poll,
                        url: href,
                    });
                }
            }
        }));
    }

    pub fn stop_polling(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("url poller stopped");
        }
    }

    fn emit(&self, signal: NavigationSignal) {
        debug!(source = ?signal.source, url = %signal.url, "navigation signal");
        // Nobody listening between sessions is fine.
        let _ = self.signals.send(signal);
    }
}
