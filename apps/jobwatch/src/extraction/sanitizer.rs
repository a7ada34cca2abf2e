//! Turns a description container into clean plain text.
//!
//! The parsed document is never touched: text is rendered from a read-only
//! walk that skips chrome subtrees instead of removing them from a clone.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node, Selector};

/// Interactive controls, graphics, premium upsells and structural chrome.
static REMOVAL_LIST: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"button, svg, img, a[href*="premium"], [class*="upsell"], [class*="premium"], nav, aside, footer"#,
    )
    .expect("removal list selector")
});

/// Each pattern runs from its trigger phrase up to the next blank line (group 1) or end of text.
static BOILERPLATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"about the company",
        r"follow us on:",
        r"equal opportunity employer",
        r"our commitment to diversity",
        r"for more information,? visit",
        r"try premium for",
        r"get ai-powered advice",
    ]
    .iter()
    .map(|trigger| {
        Regex::new(&format!(r"(?is){trigger}.*?(\n\n|\z)")).expect("boilerplate pattern")
    })
    .collect()
});

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t ]+").expect("horizontal whitespace"));
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("excess newlines"));

const NON_RENDERED: &[&str] = &["head", "script", "style", "template", "noscript"];

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "dd", "details", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "ol", "pre", "section", "summary", "table", "tr", "ul",
];

/// Sanitizes a located container; `None` yields an empty string.
pub fn sanitize(container: Option<ElementRef<'_>>) -> String {
    match container {
        Some(element) => clean_text(&render_text(element, true)),
        None => String::new(),
    }
}

/// Rendered text of an element as a reader would see it, chrome included.
pub fn visible_text(element: ElementRef<'_>) -> String {
    render_text(element, false)
}

/// Strips boilerplate blocks, then normalizes whitespace.
pub fn clean_text(text: &str) -> String {
    normalize_whitespace(&strip_boilerplate(text))
}

/// Removes the first occurrence of each boilerplate block, keeping the blank line that ends it.
pub fn strip_boilerplate(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in BOILERPLATE.iter() {
        let range = pattern.captures(&cleaned).and_then(|caps| {
            let whole = caps.get(0)?;
            let boundary = caps.get(1)?;
            Some(whole.start()..boundary.start())
        });
        if let Some(range) = range {
            cleaned.replace_range(range, "");
        }
    }
    cleaned
}

pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = HORIZONTAL_WS.replace_all(text, " ");
    EXCESS_NEWLINES
        .replace_all(&collapsed, "\n\n")
        .trim()
        .to_string()
}

fn render_text(element: ElementRef<'_>, strip_chrome: bool) -> String {
    let mut renderer = TextRenderer::new(strip_chrome);
    renderer.walk_children(element);
    renderer.out
}

/// Layout-aware text rendering: block elements break lines, inline text flows.
struct TextRenderer {
    strip_chrome: bool,
    out: String,
    pending_breaks: usize,
    pending_space: bool,
}

impl TextRenderer {
    fn new(strip_chrome: bool) -> Self {
        Self {
            strip_chrome,
            out: String::new(),
            pending_breaks: 0,
            pending_space: false,
        }
    }

    fn walk_children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk_element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_element(&mut self, element: ElementRef<'_>) {
        if self.skips(element) {
            return;
        }
        let name = element.value().name();
        if name == "br" {
            self.line_break(1);
            return;
        }
        let breaks = block_breaks(name);
        self.line_break(breaks);
        self.walk_children(element);
        self.line_break(breaks);
    }

    fn skips(&self, element: ElementRef<'_>) -> bool {
        let el = element.value();
        if NON_RENDERED.contains(&el.name()) || is_hidden(el) {
            return true;
        }
        self.strip_chrome && REMOVAL_LIST.matches(&element)
    }

    fn push_text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.flush_separator();
            self.out.push_str(word);
            self.pending_space = words.peek().is_some() || text.ends_with(char::is_whitespace);
        }
    }

    fn flush_separator(&mut self) {
        if !self.out.is_empty() {
            if self.pending_breaks > 0 {
                self.out.extend(std::iter::repeat('\n').take(self.pending_breaks));
            } else if self.pending_space {
                self.out.push(' ');
            }
        }
        self.pending_breaks = 0;
        self.pending_space = false;
    }

    fn line_break(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }
}

fn block_breaks(name: &str) -> usize {
    if name == "p" {
        2
    } else if BLOCK_ELEMENTS.contains(&name) {
        1
    } else {
        0
    }
}

fn is_hidden(element: &scraper::node::Element) -> bool {
    if element.attr("hidden").is_some() || element.attr("aria-hidden") == Some("true") {
        return true;
    }
    element
        .attr("style")
        .map(|style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .any(|(prop, value)| {
                    prop.trim().eq_ignore_ascii_case("display")
                        && value.trim().eq_ignore_ascii_case("none")
                })
        })
        .unwrap_or(false)
}
