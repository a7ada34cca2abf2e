//! The extraction pipeline: locate the description container, sanitize it,
//! pull title and company, and decide whether the result is new.

pub mod coordinator;
pub mod fields;
pub mod locator;
pub mod record;
pub mod sanitizer;

pub use coordinator::ExtractionCoordinator;
pub use record::{ExtractedJobRecord, JobSubmission};
