//! Wires the host page to the session, launcher and navigation adapter, and
//! routes shim events to them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::host::{HostEvent, HostPage};
use crate::messenger::{MessengerError, PullRequest, PullResponse, Publisher};
use crate::navigation::{NavigationAdapter, SignalSource};
use crate::panel::{spawn_launcher, PanelShell};
use crate::session::ExtractionSession;

#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub extraction_debounce: Duration,
    pub url_poll_interval: Duration,
    pub launcher_debounce: Duration,
}

impl From<&Config> for Timings {
    fn from(config: &Config) -> Self {
        Self {
            extraction_debounce: config.extraction_debounce,
            url_poll_interval: config.url_poll_interval,
            launcher_debounce: config.launcher_debounce,
        }
    }
}

pub struct PageContext {
    page: HostPage,
    adapter: NavigationAdapter,
    session: ExtractionSession,
    shell: PanelShell,
    launcher: Mutex<Option<JoinHandle<()>>>,
    timings: Timings,
}

impl PageContext {
    pub fn new(publisher: Arc<dyn Publisher>, timings: Timings) -> Self {
        let page = HostPage::new("", "");
        let adapter = NavigationAdapter::new(page.clone());
        let session = ExtractionSession::new(
            page.clone(),
            adapter.clone(),
            publisher.clone(),
            timings.extraction_debounce,
        );
        Self {
            page,
            adapter,
            session,
            shell: PanelShell::new(publisher),
            launcher: Mutex::new(None),
            timings,
        }
    }

    pub fn shell(&self) -> &PanelShell {
        &self.shell
    }

    pub async fn handle(&self, event: HostEvent) {
        match event {
            HostEvent::Loaded { url, html } => {
                self.teardown().await;
                info!(url = %url, "page loaded");
                self.page.replace_document(url.clone(), html);
                self.shell.sync_launcher(&url);
                self.adapter.start_polling(self.timings.url_poll_interval);
                self.start_launcher();
                self.session.start().await;
            }
            HostEvent::DomMutated { html, url } => {
                if let Some(url) = url {
                    self.page.set_url(url);
                }
                self.page.apply_mutation(html);
            }
            HostEvent::PushState { url } => {
                self.adapter.observe_navigation(SignalSource::PushState, url)
            }
            HostEvent::ReplaceState { url } => {
                self.adapter.observe_navigation(SignalSource::ReplaceState, url)
            }
            HostEvent::Popstate { url } => {
                self.adapter.observe_navigation(SignalSource::PopState, url)
            }
            HostEvent::Hashchange { url } => {
                self.adapter.observe_navigation(SignalSource::HashChange, url)
            }
            HostEvent::Unload => {
                info!(url = %self.page.href(), "page unloading");
                self.teardown().await;
            }
        }
    }

    /// Answers a Pull request through the running session's mailbox.
    pub async fn pull(&self, request: PullRequest) -> Result<PullResponse, MessengerError> {
        let client = self
            .session
            .pull_client()
            .await
            .ok_or(MessengerError::Unavailable)?;
        client.request(request).await
    }

    pub async fn is_attached(&self) -> bool {
        self.session.is_running().await
    }

    /// Stops every observer, timer and poller. Safe to call repeatedly.
    pub async fn teardown(&self) {
        self.session.stop().await;
        self.adapter.stop_polling();
        let launcher = self
            .launcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = launcher {
            handle.abort();
            debug!("launcher task stopped");
        }
        self.shell.remove_launcher();
    }

    fn start_launcher(&self) {
        let handle = spawn_launcher(
            self.shell.clone(),
            &self.adapter,
            self.page.clone(),
            self.timings.launcher_debounce,
        );
        *self.launcher.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::coordinator::tests::{job_page_html, RecordingPublisher, JOB_URL};
    use crate::messenger::PushEvent;

    fn timings() -> Timings {
        Timings {
            extraction_debounce: Duration::from_millis(500),
            url_poll_interval: Duration::from_millis(1000),
            launcher_debounce: Duration::from_millis(300),
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pull_before_load_is_unavailable() {
        let context = PageContext::new(Arc::new(RecordingPublisher::default()), timings());
        let err = context.pull(PullRequest::GetJobDetails).await.unwrap_err();
        assert!(matches!(err, MessengerError::Unavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_navigate_unload_lifecycle() {
        let publisher = Arc::new(RecordingPublisher::default());
        let context = PageContext::new(publisher.clone(), timings());

        context
            .handle(HostEvent::Loaded {
                url: JOB_URL.into(),
                html: job_page_html(),
            })
            .await;
        settle().await;
        assert!(context.is_attached().await);
        assert!(context.shell().view().launcher_visible);

        let response = context.pull(PullRequest::GetJobDetails).await.unwrap();
        assert_eq!(response.data.company, "Acme Corp");

        context
            .handle(HostEvent::PushState {
                url: "https://www.linkedin.com/feed/".into(),
            })
            .await;
        settle().await;
        tokio::time::advance(Duration::from_millis(300)).await;
        settle().await;
        assert!(!context.shell().view().launcher_visible);

        context.handle(HostEvent::Unload).await;
        assert!(!context.is_attached().await);
        assert!(matches!(
            context.pull(PullRequest::GetJobDetails).await,
            Err(MessengerError::Unavailable)
        ));

        let events = publisher.taken();
        assert!(matches!(events.first(), Some(PushEvent::JobExtracted(_))));
        assert!(events.contains(&PushEvent::JobCleared));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_url_change_is_caught_by_poller() {
        let publisher = Arc::new(RecordingPublisher::default());
        let context = PageContext::new(publisher.clone(), timings());
        context
            .handle(HostEvent::Loaded {
                url: JOB_URL.into(),
                html: job_page_html(),
            })
            .await;
        settle().await;
        publisher.taken();

        context
            .handle(HostEvent::DomMutated {
                html: job_page_html(),
                url: Some("https://www.linkedin.com/feed/".into()),
            })
            .await;
        settle().await;
        assert!(publisher.taken().is_empty());

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(publisher.taken(), vec![PushEvent::JobCleared]);

        context.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_restarts_session() {
        let publisher = Arc::new(RecordingPublisher::default());
        let context = PageContext::new(publisher.clone(), timings());
        let loaded = HostEvent::Loaded {
            url: JOB_URL.into(),
            html: job_page_html(),
        };

        context.handle(loaded.clone()).await;
        context.handle(loaded).await;
        settle().await;

        // First session cleared on teardown, second extracted afresh.
        let events = publisher.taken();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], PushEvent::JobCleared);
        assert!(context.is_attached().await);

        context.teardown().await;
        context.teardown().await;
    }
}
