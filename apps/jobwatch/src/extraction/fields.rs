//! Title and company heuristics. Each extractor falls back to a sentinel.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::record::{COMPANY_NOT_FOUND, JOB_TITLE_NOT_FOUND};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").expect("h1 selector"));
static H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").expect("h2 selector"));
static COMPANY_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href*="/company/"]"#).expect("company link selector")
});
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

/// Section headings that share `h2` with the title on job pages.
static NON_TITLE_H2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)about|company|people|similar").expect("non-title pattern"));

const FALLBACK_ANCHOR_LIMIT: usize = 20;
const SITE_CHROME_LINKS: &[&str] = &["LinkedIn", "Sign in", "Join now"];

pub fn extract_job_title(document: &Html) -> String {
    let title_length = |text: &str| (6..150).contains(&text.chars().count());

    let from_h1 = document
        .select(&H1)
        .map(element_text)
        .find(|text| title_length(text.as_str()));
    let from_h2 = || {
        document
            .select(&H2)
            .map(element_text)
            .find(|text| title_length(text.as_str()) && !NON_TITLE_H2.is_match(text))
    };

    from_h1
        .or_else(from_h2)
        .unwrap_or_else(|| JOB_TITLE_NOT_FOUND.to_string())
}

pub fn extract_company_name(document: &Html) -> String {
    let from_company_link = document
        .select(&COMPANY_LINKS)
        .map(element_text)
        .find(|text| (2..100).contains(&text.chars().count()));
    let from_any_anchor = || {
        document
            .select(&ANCHORS)
            .take(FALLBACK_ANCHOR_LIMIT)
            .map(element_text)
            .find(|text| {
                (3..100).contains(&text.chars().count())
                    && !SITE_CHROME_LINKS.iter().any(|chrome| text.contains(*chrome))
            })
    };

    from_company_link
        .or_else(from_any_anchor)
        .unwrap_or_else(|| COMPANY_NOT_FOUND.to_string())
}

/// Text content with inner whitespace runs collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
