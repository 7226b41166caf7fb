//! Content file model and frontmatter parsing.
//!
//! A content file is markdown with an optional leading frontmatter block:
//!
//! ```md
//! ---
//! date: 2024-03-01
//! ---
//! # Hello
//!
//! Body text
//! ```
//!
//! Frontmatter is parsed leniently: each line inside the `---` fences is
//! split on its first `:`, both sides trimmed, and lines that yield an
//! empty key or value are dropped without error. All values stay strings;
//! the only key the pipeline consumes is `date`.

use anyhow::{Context, Result};
use std::{collections::BTreeMap, fs, path::Path};

/// Key-value metadata from a frontmatter block.
///
/// A `BTreeMap` keeps iteration key-sorted, so re-synthesizing a block from
/// a parsed one is deterministic.
pub type Frontmatter = BTreeMap<String, String>;

/// Frontmatter fence marker line
const FENCE: &str = "---";

/// A single content file, read once from disk.
#[derive(Debug, Clone)]
pub struct Document {
    /// File stem, used for output paths and URLs
    pub slug: String,

    /// Parsed frontmatter (empty when the file has no block)
    pub frontmatter: Frontmatter,

    /// Markdown body with the frontmatter block removed
    pub body: String,
}

impl Document {
    /// Read and parse a content file.
    ///
    /// An unreadable file or a path without a UTF-8 stem is an error; the
    /// caller decides whether that aborts the build.
    pub fn from_path(path: &Path) -> Result<Document> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file {}", path.display()))?;
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid file name {}", path.display()))?
            .to_owned();

        let (frontmatter, body) = split_frontmatter(&raw);
        Ok(Document {
            slug,
            frontmatter,
            body: body.to_owned(),
        })
    }

    /// The `date` frontmatter value, if any.
    pub fn date(&self) -> Option<&str> {
        self.frontmatter.get("date").map(String::as_str)
    }
}

// ============================================================================
// Frontmatter Parsing
// ============================================================================

/// Split raw document text into frontmatter and body.
///
/// When the text does not start with a `---` fence line followed by a second
/// `---` fence line, the frontmatter is empty and the body is the input,
/// byte for byte. Otherwise the body is everything after the closing fence
/// line, with the fence's own newline stripped.
pub fn split_frontmatter(raw: &str) -> (Frontmatter, &str) {
    let Some(block_start) = strip_fence_line(raw) else {
        return (Frontmatter::new(), raw);
    };

    // Scan for the closing fence line, accumulating byte offsets so the
    // body can be returned as a slice of the input.
    let mut offset = block_start;
    for line in raw[block_start..].split_inclusive('\n') {
        let line_end = offset + line.len();
        if line.trim() == FENCE {
            let block = &raw[block_start..offset];
            return (parse_pairs(block), &raw[line_end..]);
        }
        offset = line_end;
    }

    // Opening fence without a closing one: not a frontmatter block.
    (Frontmatter::new(), raw)
}

/// If `raw` starts with a fence line (allowing trailing whitespace), return
/// the byte offset just past it.
fn strip_fence_line(raw: &str) -> Option<usize> {
    let line = raw.split_inclusive('\n').next()?;
    (line.trim() == FENCE).then_some(line.len())
}

/// Parse `key: value` lines, silently dropping malformed ones.
fn parse_pairs(block: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        frontmatter.insert(key.to_owned(), value.to_owned());
    }
    frontmatter
}

// ============================================================================
// Filename Titles
// ============================================================================

/// Derive a page title from a kebab-case slug.
///
/// `"my-first-post"` becomes `"My First Post"`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character of a word.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
