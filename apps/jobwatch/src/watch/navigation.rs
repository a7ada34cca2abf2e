use crate::navigation::is_job_page;

/// Last URL the Navigation Watcher acted on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub last_processed_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Same URL as last processed; nothing to do.
    Unchanged,
    /// Moved to a non-job page: clear, cancel pending work, ignore mutations.
    LeftJobPage,
    /// Moved to a job page: clear, then debounce a fresh extraction.
    EnteredJobPage,
}

/// Decides what a URL-change signal means for extraction.
#[derive(Debug, Clone)]
pub struct NavigationWatcher {
    state: NavigationState,
    armed: bool,
}

impl NavigationWatcher {
    /// Armed only when the initial URL is a job page.
    pub fn new(initial_url: impl Into<String>) -> Self {
        let last_processed_url = initial_url.into();
        let armed = is_job_page(&last_processed_url);
        Self {
            state: NavigationState { last_processed_url },
            armed,
        }
    }

    pub fn on_url_change(&mut self, url: &str) -> NavigationDecision {
        if url == self.state.last_processed_url {
            return NavigationDecision::Unchanged;
        }
        self.state.last_processed_url = url.to_string();
        self.armed = is_job_page(url);
        if self.armed {
            NavigationDecision::EnteredJobPage
        } else {
            NavigationDecision::LeftJobPage
        }
    }

    /// Whether mutations and timers should lead to extraction.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[cfg(test)]
    pub fn state(&self) -> &NavigationState {
        &self.state
    }
}
