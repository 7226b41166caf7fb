//! Page rendering: markdown conversion plus template substitution.
//!
//! Templating here is literal token replacement, nothing more. The base
//! template carries `{{title}}`, `{{content}}`, and `{{websiteName}}`
//! tokens; the first two are substituted once, the site name everywhere it
//! occurs. The template string itself is never mutated, each render works
//! on its own copy.

use crate::utils::date;
use chrono::NaiveDate;
use pulldown_cmark::{Parser, html};

/// Title placeholder in the base template
const TITLE_TOKEN: &str = "{{title}}";
/// Content placeholder in the base template
const CONTENT_TOKEN: &str = "{{content}}";
/// Site name placeholder, may occur several times
const SITE_NAME_TOKEN: &str = "{{websiteName}}";

/// Convert markdown text to HTML.
///
/// This is the whole markdown collaboration surface: a pure function from
/// markdown text to HTML text.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, Parser::new(markdown));
    out
}

/// Render a full HTML page from a markdown body.
///
/// The optional date is formatted long-form (`March 1, 2024`) and emitted
/// as a dated-entry marker ahead of the body, inside the shared content
/// container.
pub fn render_page(
    template: &str,
    site_name: &str,
    title: &str,
    markdown_body: &str,
    published: Option<NaiveDate>,
) -> String {
    let body_html = markdown_to_html(markdown_body);

    let date_block = published
        .map(|d| format!(r#"<p class="post-date">{}</p>"#, date::format_long(d)))
        .unwrap_or_default();
    let content = format!(r#"<div class="markdown-content">{date_block}{body_html}</div>"#);

    // Content is substituted last so tokens inside page bodies never get
    // re-expanded.
    template
        .replacen(TITLE_TOKEN, title, 1)
        .replace(SITE_NAME_TOKEN, site_name)
        .replacen(CONTENT_TOKEN, &content, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "<title>{{title}} - {{websiteName}}</title>\
                            <header>{{websiteName}}</header>\
                            <main>{{content}}</main>";

    #[test]
    fn test_markdown_to_html_heading_and_paragraph() {
        let html = markdown_to_html("# Hello\n\nBody text");
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<p>Body text</p>"));
    }

    #[test]
    fn test_render_page_substitutes_all_tokens() {
        let page = render_page(TEMPLATE, "My Site", "Hello", "Body", None);

        assert!(page.contains("<title>Hello - My Site</title>"));
        assert!(!page.contains("{{title}}"));
        assert!(!page.contains("{{content}}"));
        assert!(!page.contains("{{websiteName}}"));
    }

    #[test]
    fn test_render_page_site_name_substituted_everywhere() {
        let page = render_page(TEMPLATE, "My Site", "Hello", "Body", None);
        assert_eq!(page.matches("My Site").count(), 2);
    }

    #[test]
    fn test_render_page_wraps_content_container() {
        let page = render_page(TEMPLATE, "My Site", "Hello", "Body text", None);
        assert!(page.contains(r#"<div class="markdown-content"><p>Body text</p>"#));
    }

    #[test]
    fn test_render_page_with_date_block() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let page = render_page(TEMPLATE, "My Site", "Hello", "# Hello\nBody text", date);

        assert!(page.contains(r#"<p class="post-date">March 1, 2024</p>"#));
    }

    #[test]
    fn test_render_page_without_date_has_no_block() {
        let page = render_page(TEMPLATE, "My Site", "Hello", "Body", None);
        assert!(!page.contains("post-date"));
    }

    #[test]
    fn test_render_page_template_untouched() {
        let template = TEMPLATE.to_owned();
        let _ = render_page(&template, "My Site", "Hello", "Body", None);
        assert_eq!(template, TEMPLATE);
    }
}
