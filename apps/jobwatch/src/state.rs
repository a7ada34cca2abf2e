use std::sync::Arc;

use crate::config::Config;
use crate::messenger::Broadcaster;
use crate::page_context::{PageContext, Timings};
use crate::scoring::ScoringBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single content-script context this service plays.
    pub page: Arc<PageContext>,
    /// Push fan-out; also remembers the latest record for late readers.
    pub broadcaster: Broadcaster,
    /// Pluggable scoring backend. Default: HttpScoringBackend.
    pub scoring: Arc<dyn ScoringBackend>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, scoring: Arc<dyn ScoringBackend>) -> Self {
        let broadcaster = Broadcaster::new();
        let page = PageContext::new(Arc::new(broadcaster.clone()), Timings::from(&config));
        Self {
            page: Arc::new(page),
            broadcaster,
            scoring,
            config,
        }
    }
}
