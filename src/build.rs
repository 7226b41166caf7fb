//! Site building orchestration.
//!
//! One linear pass: collect the blog index, render every page and post
//! through the shared base template, then copy static assets. The blog
//! listing is computed before page rendering so it can be spliced into
//! `index.md` and `blog.md`; that read-then-render ordering is the only
//! cross-file dependency in the build.

use crate::{
    blog::{self, PostSummary},
    config::SiteConfig,
    content::{self, Document},
    log, render,
    utils::{date, title},
};
use anyhow::{Context, Result, ensure};
use std::{fs, path::Path};
use walkdir::WalkDir;

/// Number of posts in the home page's latest-posts preview
const LATEST_POSTS_COUNT: usize = 3;

/// Placeholder in `index.md` for the latest-posts preview
const LATEST_POSTS_TOKEN: &str = "{{latest_posts}}";
/// Placeholder in `blog.md` for the full blog listing
const BLOG_LIST_TOKEN: &str = "{{blog_list}}";

/// Build the entire site into the output directory.
///
/// A missing template file or content directory aborts the build; a missing
/// blog subdirectory just means zero posts.
pub fn build_site(config: &SiteConfig) -> Result<()> {
    let content_dir = &config.build.content;
    let output_dir = &config.build.output;

    ensure!(
        content_dir.is_dir(),
        "Content directory not found: {}",
        content_dir.display()
    );
    let template_path = config.template_path();
    let template = fs::read_to_string(&template_path)
        .with_context(|| format!("Failed to read template {}", template_path.display()))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    // Blog index first, so page bodies can embed it.
    let posts = blog::collect_posts(&config.blog_dir())?;

    let page_count = build_pages(config, &template, &posts)?;
    let post_count = build_blog_posts(config, &template)?;
    copy_assets(&config.build.assets, &output_dir.join("css"))?;

    log!("build"; "done, {page_count} pages and {post_count} posts");
    Ok(())
}

/// Render every markdown page directly under the content root.
///
/// Page titles come from the file stem (`my-first-post` -> `My First Post`);
/// `index.md` and `blog.md` get the blog listing spliced into their bodies
/// before rendering.
fn build_pages(config: &SiteConfig, template: &str, posts: &[PostSummary]) -> Result<usize> {
    let output_dir = &config.build.output;

    let mut count = 0;
    for path in blog::list_markdown_files(&config.build.content)? {
        let doc = Document::from_path(&path)?;

        let body = match doc.slug.as_str() {
            "index" => doc
                .body
                .replacen(LATEST_POSTS_TOKEN, &blog::render_latest(posts, LATEST_POSTS_COUNT), 1),
            "blog" => doc
                .body
                .replacen(BLOG_LIST_TOKEN, &blog::render_full_listing(posts), 1),
            _ => doc.body.clone(),
        };

        let page_title = content::title_from_slug(&doc.slug);
        let published = doc.date().and_then(date::parse_date);
        let html = render::render_page(template, &config.site.name, &page_title, &body, published);

        write_output(&output_dir.join(format!("{}.html", doc.slug)), &html)?;
        count += 1;
    }

    Ok(count)
}

/// Render every blog post under `content/blog/`.
///
/// Posts take their title from their first `# ` heading rather than the
/// file name, and their date from frontmatter.
fn build_blog_posts(config: &SiteConfig, template: &str) -> Result<usize> {
    let blog_dir = config.blog_dir();
    let output_dir = config.build.output.join("blog");

    let mut count = 0;
    for path in blog::list_markdown_files(&blog_dir)? {
        let doc = Document::from_path(&path)?;

        let post_title = title::from_markdown(&doc.body);
        let published = doc.date().and_then(date::parse_date);
        let html =
            render::render_page(template, &config.site.name, &post_title, &doc.body, published);

        write_output(&output_dir.join(format!("{}.html", doc.slug)), &html)?;
        count += 1;
    }

    Ok(count)
}

/// Copy the static assets directory verbatim into the output tree.
fn copy_assets(assets_dir: &Path, target_dir: &Path) -> Result<()> {
    if !assets_dir.is_dir() {
        log!("warn"; "assets directory not found: {}", assets_dir.display());
        return Ok(());
    }

    for entry in WalkDir::new(assets_dir) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(assets_dir)
            .expect("walked path is under assets_dir");
        let target = target_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }

    Ok(())
}

/// Write a rendered page, creating parent directories as needed.
fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::path::PathBuf;

    const TEMPLATE: &str = "<title>{{title}} - {{websiteName}}</title>\
                            <main>{{content}}</main>";

    /// Lay out a small site under a unique temp directory.
    fn scaffold_site(tag: &str) -> (SiteConfig, PathBuf) {
        let root = std::env::temp_dir().join(format!("mdsite-test-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);

        let content = root.join("content");
        fs::create_dir_all(content.join("blog")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::create_dir_all(root.join("css")).unwrap();

        fs::write(root.join("templates/base.html"), TEMPLATE).unwrap();
        fs::write(root.join("css/style.css"), "body {}").unwrap();
        fs::write(
            content.join("index.md"),
            "# Welcome\n\n{{latest_posts}}\n",
        )
        .unwrap();
        fs::write(content.join("blog.md"), "# Blog\n\n{{blog_list}}\n").unwrap();
        fs::write(content.join("about-me.md"), "Some text.\n").unwrap();
        fs::write(
            content.join("blog/first-post.md"),
            "---\ndate: 2024-01-01\n---\n# January Post\n\nOld news.\n",
        )
        .unwrap();
        fs::write(
            content.join("blog/second-post.md"),
            "---\ndate: 2024-06-15\n---\n# June Post\n\nFresh news.\n",
        )
        .unwrap();

        let mut config = SiteConfig::default();
        config.build.content = content;
        config.build.templates = root.join("templates");
        config.build.output = root.join("dist");
        config.build.assets = root.join("css");
        (config, root)
    }

    #[test]
    fn test_build_site_outputs() {
        let (config, root) = scaffold_site("outputs");
        build_site(&config).unwrap();

        let output = &config.build.output;
        assert!(output.join("index.html").is_file());
        assert!(output.join("blog.html").is_file());
        assert!(output.join("about-me.html").is_file());
        assert!(output.join("blog/first-post.html").is_file());
        assert!(output.join("blog/second-post.html").is_file());
        assert!(output.join("css/style.css").is_file());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_blog_listing_sorted_descending() {
        let (config, root) = scaffold_site("listing");
        build_site(&config).unwrap();

        let blog_page = fs::read_to_string(config.build.output.join("blog.html")).unwrap();
        let june = blog_page.find("June Post").unwrap();
        let january = blog_page.find("January Post").unwrap();
        assert!(june < january, "most recent post should be listed first");
        assert!(blog_page.contains("June 15, 2024"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_page_title_from_file_stem() {
        let (config, root) = scaffold_site("page-title");
        build_site(&config).unwrap();

        let about = fs::read_to_string(config.build.output.join("about-me.html")).unwrap();
        assert!(about.contains("<title>About Me - My Site</title>"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_post_title_and_date() {
        let (config, root) = scaffold_site("post-title");
        build_site(&config).unwrap();

        let post =
            fs::read_to_string(config.build.output.join("blog/second-post.html")).unwrap();
        assert!(post.contains("<title>June Post - My Site</title>"));
        assert!(post.contains(r#"<p class="post-date">June 15, 2024</p>"#));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_missing_blog_dir_is_zero_posts() {
        let (config, root) = scaffold_site("no-blog");
        fs::remove_dir_all(config.blog_dir()).unwrap();
        build_site(&config).unwrap();

        let index = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert!(!index.contains("{{latest_posts}}"));
        assert!(!config.build.output.join("blog").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_missing_template_is_fatal() {
        let (mut config, root) = scaffold_site("no-template");
        config.build.templates = root.join("missing-templates");
        let err = build_site(&config).unwrap_err();

        assert!(err.to_string().contains("missing-templates"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_missing_content_dir_is_fatal() {
        let (mut config, root) = scaffold_site("no-content");
        config.build.content = root.join("missing-content");

        assert!(build_site(&config).is_err());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_build_index_latest_posts_injected() {
        let (config, root) = scaffold_site("latest");
        build_site(&config).unwrap();

        let index = fs::read_to_string(config.build.output.join("index.html")).unwrap();
        assert!(index.contains(r#"<a href="/blog/second-post.html">June Post</a>"#));
        // Preview listing carries no date spans
        assert!(!index.contains("June 15, 2024"));

        let _ = fs::remove_dir_all(&root);
    }
}
