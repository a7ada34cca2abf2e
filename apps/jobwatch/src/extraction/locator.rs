//! Finds the container most likely holding the job description.
//!
//! Heading text is matched against an ordered list of phrases; the container is
//! then discovered by DOM proximity. A miss returns `None`, never an error.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::sanitizer::visible_text;

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"h1, h2, h3, [role="heading"]"#).expect("heading selector")
});

static EXPANDABLE_TEXT_BOX: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-testid="expandable-text-box"]"#).expect("expandable text selector")
});

/// Ordered by priority: an earlier pattern wins even if its header comes later in the document.
static HEADER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["about the job", "job description", "description", "job details"]
        .iter()
        .map(|phrase| Regex::new(&format!("(?i){phrase}")).expect("header pattern"))
        .collect()
});

pub const MIN_CONTENT_CHARS: usize = 200;
const MAX_ANCESTOR_DEPTH: usize = 5;
const CONTENT_KEYWORDS: &[&str] = &[
    "responsibilities",
    "requirements",
    "qualifications",
    "experience",
    "skills",
    "what you",
];

/// How a container was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    NextSibling,
    ParentNextSibling,
    AncestorScan,
    ExpandableTextBox,
}

#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub element: ElementRef<'a>,
    pub strategy: Strategy,
}

pub fn locate(document: &Html) -> Option<ElementRef<'_>> {
    locate_with_strategy(document).map(|located| located.element)
}

pub fn locate_with_strategy(document: &Html) -> Option<Located<'_>> {
    let headers: Vec<(ElementRef<'_>, String)> = document
        .select(&HEADINGS)
        .map(|header| (header, header.text().collect::<String>().trim().to_string()))
        .collect();

    for pattern in HEADER_PATTERNS.iter() {
        for (header, text) in headers.iter().filter(|(_, text)| pattern.is_match(text)) {
            debug!(header = %text, "found job description header");
            if let Some(located) = find_content_container(*header) {
                debug!(strategy = ?located.strategy, "found description container");
                return Some(located);
            }
        }
    }

    if let Some(element) = document.select(&EXPANDABLE_TEXT_BOX).next() {
        debug!("found job description via expandable text box");
        return Some(Located {
            element,
            strategy: Strategy::ExpandableTextBox,
        });
    }

    debug!("no job description section found");
    None
}

/// Substantial content: enough visible text and at least one job-content keyword.
pub fn has_substantial_content(element: &ElementRef<'_>) -> bool {
    is_substantial_text(&visible_text(*element))
}

pub fn is_substantial_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_CONTENT_CHARS {
        return false;
    }
    let lower = trimmed.to_lowercase();
    CONTENT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn find_content_container(header: ElementRef<'_>) -> Option<Located<'_>> {
    if let Some(element) = next_element_sibling(header).filter(has_substantial_content) {
        return Some(Located {
            element,
            strategy: Strategy::NextSibling,
        });
    }

    let parent = parent_element(header);
    if let Some(element) = parent
        .and_then(next_element_sibling)
        .filter(has_substantial_content)
    {
        return Some(Located {
            element,
            strategy: Strategy::ParentNextSibling,
        });
    }

    let mut current = parent;
    let mut depth = 0;
    while let Some(ancestor) = current {
        if depth >= MAX_ANCESTOR_DEPTH || ancestor.value().name() == "body" {
            break;
        }
        let candidate = ancestor
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.id() != header.id())
            .find(has_substantial_content);
        if let Some(element) = candidate {
            return Some(Located {
                element,
                strategy: Strategy::AncestorScan,
            });
        }
        current = parent_element(ancestor);
        depth += 1;
    }

    None
}

fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_text(len: usize) -> String {
        let prefix = "Responsibilities: ";
        format!("{prefix}{}", "x".repeat(len - prefix.len()))
    }

    fn located_text(html: &str) -> Option<(String, Strategy)> {
        let document = Html::parse_document(html);
        locate_with_strategy(&document)
            .map(|l| (visible_text(l.element).trim().to_string(), l.strategy))
    }

    #[test]
    fn test_threshold_rejects_199_chars() {
        let text = job_text(199);
        assert_eq!(text.chars().count(), 199);
        assert!(!is_substantial_text(&text));
    }

    #[test]
    fn test_threshold_accepts_200_chars_with_keyword() {
        let text = job_text(200);
        assert!(is_substantial_text(&text));
    }

    #[test]
    fn test_threshold_rejects_long_text_without_keyword() {
        let text = "lorem ipsum ".repeat(42);
        assert!(text.trim().chars().count() >= 500);
        assert!(!is_substantial_text(&text));
    }

    #[test]
    fn test_threshold_applies_to_elements() {
        let html = format!(
            "<div id=\"short\">{}</div><div id=\"long\">{}</div>",
            job_text(199),
            job_text(200)
        );
        let document = Html::parse_document(&html);
        let short = document.select(&Selector::parse("#short").unwrap()).next().unwrap();
        let long = document.select(&Selector::parse("#long").unwrap()).next().unwrap();
        assert!(!has_substantial_content(&short));
        assert!(has_substantial_content(&long));
    }

    #[test]
    fn test_next_sibling_strategy() {
        let html = format!("<h2>About the job</h2><div>{}</div>", job_text(300));
        let (text, strategy) = located_text(&html).unwrap();
        assert_eq!(strategy, Strategy::NextSibling);
        assert_eq!(text, job_text(300));
    }

    #[test]
    fn test_parent_next_sibling_strategy() {
        let html = format!(
            "<div><h2>About the job</h2><span>short</span></div><section>{}</section>",
            job_text(250)
        );
        let (_, strategy) = located_text(&html).unwrap();
        assert_eq!(strategy, Strategy::ParentNextSibling);
    }

    #[test]
    fn test_ancestor_scan_strategy() {
        let html = format!(
            "<main><div><div><h2>About the job</h2></div></div><aside>tiny</aside><article>{}</article></main>",
            job_text(250)
        );
        let (text, strategy) = located_text(&html).unwrap();
        assert_eq!(strategy, Strategy::AncestorScan);
        assert_eq!(text, job_text(250));
    }

    #[test]
    fn test_header_priority_beats_document_order() {
        let generic = format!("Skills and experience. {}", "g".repeat(250));
        let specific = format!("Responsibilities. {}", "s".repeat(250));
        let html = format!(
            "<section><h3>Description</h3><div>{generic}</div></section>\
             <section><h2>About the job</h2><div>{specific}</div></section>"
        );
        let (text, _) = located_text(&html).unwrap();
        assert_eq!(text, specific);
    }

    #[test]
    fn test_role_heading_is_considered() {
        let html = format!(
            "<span role=\"heading\">Job details</span><div>{}</div>",
            job_text(220)
        );
        let (_, strategy) = located_text(&html).unwrap();
        assert_eq!(strategy, Strategy::NextSibling);
    }

    #[test]
    fn test_expandable_text_box_fallback() {
        let html = "<h2>Meet the team</h2><div data-testid=\"expandable-text-box\">Short blurb</div>";
        let (text, strategy) = located_text(html).unwrap();
        assert_eq!(strategy, Strategy::ExpandableTextBox);
        assert_eq!(text, "Short blurb");
    }

    #[test]
    fn test_nothing_found_is_none() {
        let html = "<h1>Feed</h1><p>Nothing to see</p>";
        assert!(located_text(html).is_none());
    }
}
