//! Extraction session: the content-script context as one tokio task.
//!
//! The actor is the only writer of the live record. It `select!`s over the
//! stop signal, Pull requests, host mutations, navigation signals and the
//! shared extraction deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extraction::ExtractionCoordinator;
use crate::host::{HostPage, MutationBatch};
use crate::messenger::{PullClient, PullEnvelope, PullRequest, PullResponse, Publisher};
use crate::navigation::{NavigationAdapter, NavigationSignal};
use crate::watch::{MutationWatcher, NavigationDecision, NavigationWatcher};

const MAILBOX_CAPACITY: usize = 32;

struct RunningSession {
    id: Uuid,
    client: PullClient,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct ExtractionSession {
    page: HostPage,
    navigation: NavigationAdapter,
    publisher: Arc<dyn Publisher>,
    debounce: Duration,
    running: Mutex<Option<RunningSession>>,
}

impl ExtractionSession {
    pub fn new(
        page: HostPage,
        navigation: NavigationAdapter,
        publisher: Arc<dyn Publisher>,
        debounce: Duration,
    ) -> Self {
        Self {
            page,
            navigation,
            publisher,
            debounce,
            running: Mutex::new(None),
        }
    }

    /// Attaches to the page: observation, plus one immediate extraction when
    /// the page is a job page.
    /// Calling it on a running session returns the existing client.
    pub async fn start(&self) -> PullClient {
        let mut running = self.running.lock().await;
        if let Some(session) = running.as_ref() {
            if !session.task.is_finished() {
                return session.client.clone();
            }
        }

        // Subscribe before the immediate extraction so nothing in between is missed.
        let mutations = self.page.subscribe_mutations();
        let signals = self.navigation.subscribe();
        let (mailbox_tx, mailbox_rx) = mpsc::channel(MAILBOX_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let mut actor = SessionActor {
            page: self.page.clone(),
            coordinator: ExtractionCoordinator::new(self.publisher.clone()),
            mutations: MutationWatcher::new(self.debounce),
            navigation: NavigationWatcher::new(self.page.href()),
        };
        actor.begin();

        let id = Uuid::new_v4();
        info!(session = %id, url = %self.page.href(), "extraction session started");

        let task = tokio::spawn(actor.run(mailbox_rx, mutations, signals, shutdown_rx));
        let client = PullClient::new(mailbox_tx);
        *running = Some(RunningSession {
            id,
            client: client.clone(),
            shutdown: shutdown_tx,
            task,
        });
        client
    }

    /// Detaches observers, cancels timers and clears the record. Returns
    /// false when there was nothing to stop.
    pub async fn stop(&self) -> bool {
        let Some(session) = self.running.lock().await.take() else {
            return false;
        };
        let _ = session.shutdown.send(());
        if let Err(e) = session.task.await {
            warn!(session = %session.id, "extraction session ended abnormally: {e}");
        }
        info!(session = %session.id, "extraction session stopped");
        true
    }

    pub async fn pull_client(&self) -> Option<PullClient> {
        self.running
            .lock()
            .await
            .as_ref()
            .filter(|session| !session.task.is_finished())
            .map(|session| session.client.clone())
    }

    pub async fn is_running(&self) -> bool {
        self.pull_client().await.is_some()
    }
}

struct SessionActor {
    page: HostPage,
    coordinator: ExtractionCoordinator,
    mutations: MutationWatcher,
    navigation: NavigationWatcher,
}

impl SessionActor {
    fn begin(&mut self) {
        if self.mutations.start() && self.navigation.is_armed() {
            self.extract();
        }
    }

    async fn run(
        mut self,
        mut mailbox: mpsc::Receiver<PullEnvelope>,
        mut mutation_rx: broadcast::Receiver<MutationBatch>,
        mut signal_rx: broadcast::Receiver<NavigationSignal>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        loop {
            let deadline = self.mutations.deadline();
            tokio::select! {
                _ = &mut shutdown => break,
                envelope = mailbox.recv() => match envelope {
                    Some(envelope) => self.handle_pull(envelope),
                    None => break,
                },
                batch = mutation_rx.recv() => match batch {
                    Ok(batch) => {
                        debug!(revision = batch.revision, "mutation batch");
                        self.on_mutations();
                    }
                    Err(RecvError::Lagged(_)) => self.on_mutations(),
                    Err(RecvError::Closed) => break,
                },
                signal = signal_rx.recv() => match signal {
                    Ok(signal) => self.on_url_change(&signal.url),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "navigation signals lagged, re-reading location");
                        let href = self.page.href();
                        self.on_url_change(&href);
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.mutations.cancel_pending();
                    self.extract();
                }
            }
        }
        self.finish();
    }

    fn extract(&mut self) {
        let snapshot = self.page.snapshot();
        self.coordinator.attempt_extraction(&snapshot);
    }

    /// Mutations only count while the current URL is a job page.
    fn on_mutations(&mut self) {
        if self.navigation.is_armed() {
            self.mutations.arm(Instant::now());
        }
    }

    fn on_url_change(&mut self, url: &str) {
        match self.navigation.on_url_change(url) {
            NavigationDecision::Unchanged => {}
            NavigationDecision::LeftJobPage => {
                info!(url, "left job page, extraction paused");
                self.mutations.cancel_pending();
                self.coordinator.clear();
            }
            NavigationDecision::EnteredJobPage => {
                info!(url, "navigated to job page");
                self.coordinator.clear();
                self.mutations.arm(Instant::now());
            }
        }
    }

    fn handle_pull(&mut self, envelope: PullEnvelope) {
        if envelope.request == PullRequest::ExtractNow {
            self.extract();
        }
        let record = self.coordinator.record_or_placeholder(&self.page.href());
        if envelope.reply.send(PullResponse::ok(record)).is_err() {
            debug!("pull requester went away before the reply");
        }
    }

    fn finish(&mut self) {
        self.mutations.stop();
        if self.coordinator.current().is_some() {
            self.coordinator.clear();
        }
    }
}
