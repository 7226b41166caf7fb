//! Page title extraction.
//!
//! Two variants over the same idea: the batch build pulls a title out of
//! markdown source (first `# ` heading), while the dev server pulls it back
//! out of already-rendered HTML (first `<h1>` pair).

use regex::Regex;
use std::sync::LazyLock;

/// Title shown when rendered HTML carries no `<h1>` at all
const UNTITLED: &str = "Untitled Post";

/// First single-line `# <text>` heading, anywhere in the document
static MD_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+)$").expect("valid heading pattern"));

/// Text between the first `<h1 ...>` open/close pair
static HTML_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<h1[^>]*>(.*?)</h1>").expect("valid h1 pattern"));

/// Extract the first first-level heading from markdown source.
///
/// Matching is single-line and case-sensitive; later headings are ignored
/// and `##` does not match. Returns an empty string when the document has
/// no first-level heading.
pub fn from_markdown(body: &str) -> String {
    MD_H1
        .captures(body)
        .map(|caps| caps[1].trim().to_owned())
        .unwrap_or_default()
}

/// Extract a title from rendered HTML via its first `<h1>` element.
///
/// Falls back to `"Untitled Post"` when no `<h1>` exists.
pub fn from_html(html: &str) -> String {
    HTML_H1
        .captures(html)
        .map(|caps| caps[1].trim().to_owned())
        .unwrap_or_else(|| UNTITLED.to_owned())
}
