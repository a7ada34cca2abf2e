use std::sync::Arc;

use scraper::Html;
use tracing::{debug, info};

use super::fields::{extract_company_name, extract_job_title};
use super::locator::locate;
use super::record::ExtractedJobRecord;
use super::sanitizer::sanitize;
use crate::host::PageSnapshot;
use crate::messenger::{Publisher, PushEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// A new record was stored and `job-extracted` was broadcast.
    Published,
    /// The candidate matched the stored record; nothing was broadcast.
    Unchanged,
}

/// Runs the full pipeline over one snapshot. Never fails: missing pieces
/// degrade to an empty description or a sentinel.
///
/// The parsed `Html` lives and dies inside this call, so no caller can hold
/// it across an await point.
pub fn extract_record(snapshot: &PageSnapshot) -> ExtractedJobRecord {
    let document = Html::parse_document(&snapshot.html);
    let job_description = sanitize(locate(&document));
    let job_title = extract_job_title(&document);
    let company = extract_company_name(&document);
    ExtractedJobRecord::new(job_title, company, job_description, snapshot.url.clone())
}

/// Owns the single live record and decides when a new one is worth publishing.
pub struct ExtractionCoordinator {
    current: Option<ExtractedJobRecord>,
    publisher: Arc<dyn Publisher>,
}

impl ExtractionCoordinator {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self {
            current: None,
            publisher,
        }
    }

    pub fn attempt_extraction(&mut self, snapshot: &PageSnapshot) -> ExtractionOutcome {
        let candidate = extract_record(snapshot);

        if let Some(current) = &self.current {
            if current.same_content(&candidate) {
                debug!(url = %candidate.url, "extraction unchanged");
                return ExtractionOutcome::Unchanged;
            }
        }

        info!(
            title = %candidate.job_title,
            company = %candidate.company,
            description_chars = candidate.description_chars(),
            "job extracted"
        );
        self.current = Some(candidate.clone());
        self.publisher.publish(PushEvent::JobExtracted(candidate));
        ExtractionOutcome::Published
    }

    /// Drops the stored record and broadcasts `job-cleared`.
    pub fn clear(&mut self) {
        self.current = None;
        self.publisher.publish(PushEvent::JobCleared);
    }

    pub fn current(&self) -> Option<&ExtractedJobRecord> {
        self.current.as_ref()
    }

    pub fn record_or_placeholder(&self, url: &str) -> ExtractedJobRecord {
        self.current
            .clone()
            .unwrap_or_else(|| ExtractedJobRecord::placeholder(url))
    }
}
