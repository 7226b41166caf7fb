//! Blog index building.
//!
//! Derives one [`PostSummary`] per blog post, orders them most-recent-first,
//! and renders them as an HTML listing. The full listing feeds the blog
//! page, a truncated one feeds the home page's latest-posts preview. The
//! dev server reuses the sorting and rendering halves when it reconstructs
//! the listing at request time.

use crate::{
    content::Document,
    utils::{date, title},
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::{fs, path::Path};

/// Markdown source extension
const MARKDOWN_EXTENSION: &str = "md";

/// Derived view of a blog post used for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    /// Post title, from the document's first `# ` heading
    pub title: String,

    /// Site-relative link, `/blog/<slug>.html`
    pub url: String,

    /// Publish date; the epoch sentinel when frontmatter supplies none
    pub date: NaiveDate,
}

impl PostSummary {
    /// Summarize a parsed blog document.
    pub fn from_document(doc: &Document) -> PostSummary {
        PostSummary {
            title: title::from_markdown(&doc.body),
            url: format!("/blog/{}.html", doc.slug),
            date: date::parse_date_or_sentinel(doc.date()),
        }
    }
}

/// Enumerate and summarize the blog posts under `blog_dir`.
///
/// File names are sorted before parsing so discovery order, and therefore
/// the order of posts with equal dates, is deterministic across runs. A
/// missing directory is zero posts, not an error. The result is already
/// sorted by date descending.
pub fn collect_posts(blog_dir: &Path) -> Result<Vec<PostSummary>> {
    let mut summaries = Vec::new();
    for path in list_markdown_files(blog_dir)? {
        let doc = Document::from_path(&path)?;
        summaries.push(PostSummary::from_document(&doc));
    }
    sort_descending(&mut summaries);
    Ok(summaries)
}

/// Markdown file paths directly under `dir`, name-sorted.
///
/// Shared with the site builder, which walks pages the same way.
pub fn list_markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Stable sort by date, most recent first.
///
/// The epoch sentinel sorts last; posts with equal dates keep their
/// discovery order (no secondary key is defined).
pub fn sort_descending(summaries: &mut [PostSummary]) {
    summaries.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Render the full blog listing, one linked item per post with a trailing
/// formatted date span.
pub fn render_full_listing(summaries: &[PostSummary]) -> String {
    render_listing(summaries, None, true)
}

/// Render the latest-`limit` preview listing, links only.
pub fn render_latest(summaries: &[PostSummary], limit: usize) -> String {
    render_listing(summaries, Some(limit), false)
}

fn render_listing(summaries: &[PostSummary], limit: Option<usize>, with_dates: bool) -> String {
    let limit = limit.unwrap_or(summaries.len());
    let items: String = summaries
        .iter()
        .take(limit)
        .map(|post| {
            let link = format!(r#"<a href="{}">{}</a>"#, post.url, post.title);
            if with_dates {
                format!(
                    "<li>{link} <span class=\"post-date\">{}</span></li>\n",
                    date::format_long(post.date)
                )
            } else {
                format!("<li>{link}</li>\n")
            }
        })
        .collect();
    format!("<ul class=\"blog-list\">\n{items}</ul>")
}

// ============================================================================
// Tests
// ============================================================================
