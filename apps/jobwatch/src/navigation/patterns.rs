use std::sync::LazyLock;

use regex::RegexSet;

/// Pages whose content is a single job posting.
static JOB_PAGES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"linkedin\.com/jobs/view/",
        r"linkedin\.com/jobs/collections/",
        r"linkedin\.com/company/.*/jobs/",
    ])
    .expect("job page patterns")
});

/// Pages where the launcher button is offered; a superset of job pages.
static LAUNCHER_PAGES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"linkedin\.com/jobs/view/",
        r"linkedin\.com/jobs/collections/",
        r"linkedin\.com/company/.*/jobs/",
        r"linkedin\.com/jobs/",
    ])
    .expect("launcher page patterns")
});

pub fn is_job_page(url: &str) -> bool {
    JOB_PAGES.is_match(url)
}

pub fn is_launcher_page(url: &str) -> bool {
    LAUNCHER_PAGES.is_match(url)
}
