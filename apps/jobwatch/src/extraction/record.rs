use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stands in for a job title no strategy could find.
pub const JOB_TITLE_NOT_FOUND: &str = "Job Title Not Found";
/// Stands in for a company name no strategy could find.
pub const COMPANY_NOT_FOUND: &str = "Company Not Found";
/// Below this many description characters a record is insufficient for scoring.
pub const MIN_DESCRIPTION_CHARS: usize = 100;
/// Consumers treat records older than this as stale.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Longest title or company the scoring backend accepts.
const SUBMISSION_FIELD_MAX_CHARS: usize = 100;

/// The single unit of work product: one scraped job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedJobRecord {
    pub job_title: String,
    pub company: String,
    /// Sanitized plain text; empty when no container was found.
    pub job_description: String,
    pub url: String,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedJobRecord {
    pub fn new(
        job_title: impl Into<String>,
        company: impl Into<String>,
        job_description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            company: company.into(),
            job_description: job_description.into(),
            url: url.into(),
            extracted_at: Utc::now(),
        }
    }

    /// Record returned when nothing has been extracted yet.
    pub fn placeholder(url: &str) -> Self {
        Self::new(JOB_TITLE_NOT_FOUND, COMPANY_NOT_FOUND, "", url)
    }

    /// Compares the content fields only; `url` and `extracted_at` are ignored.
    pub fn same_content(&self, other: &Self) -> bool {
        self.job_title == other.job_title
            && self.company == other.company
            && self.job_description == other.job_description
    }

    pub fn description_chars(&self) -> usize {
        self.job_description.chars().count()
    }

    /// Whether the description is long enough to submit for scoring.
    pub fn is_sufficient(&self) -> bool {
        self.description_chars() >= MIN_DESCRIPTION_CHARS
    }

    /// Whether the record is older than `window` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        (now - self.extracted_at)
            .to_std()
            .map(|age| age > window)
            .unwrap_or(false)
    }

    /// Builds the job JSON the scoring backend expects.
    ///
    /// Sentinel title/company values are sent as absent rather than as text.
    pub fn to_submission(&self) -> JobSubmission {
        JobSubmission {
            job_title: submission_field(&self.job_title, JOB_TITLE_NOT_FOUND),
            company: submission_field(&self.company, COMPANY_NOT_FOUND),
            description: self.job_description.clone(),
            url: self.url.clone(),
        }
    }
}

/// Job payload sent alongside the résumé to the scoring backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub description: String,
    pub url: String,
}

fn submission_field(value: &str, sentinel: &str) -> Option<String> {
    if value == sentinel || value.is_empty() {
        return None;
    }
    Some(value.chars().take(SUBMISSION_FIELD_MAX_CHARS).collect())
}
