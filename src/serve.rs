//! Development server.
//!
//! A lightweight HTTP server over the build output, built on `tiny_http`:
//!
//! - Static file serving from the output directory, with `.html` appended
//!   to extension-less paths and the empty path mapped to the home page
//! - Live reconstruction of the blog listing on `GET /blog`, re-derived
//!   from the markdown sources on every request
//! - Graceful shutdown on Ctrl+C
//!
//! Requests are handled one at a time on the main thread; every request
//! performs its own fresh file-system reads, so there is no cache to go
//! stale while content is edited and rebuilt.

use crate::{
    blog::{self, PostSummary},
    config::SiteConfig,
    content, log,
    utils::{date, title},
};
use anyhow::{Context, Result};
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Skeleton for the dynamically reconstructed blog listing page
const BLOG_INDEX_SKELETON: &str = "<!DOCTYPE html>\n\
    <html>\n<head><title>Blog - {name}</title></head>\n\
    <body>\n<h1>Blog</h1>\n{listing}\n</body>\n</html>\n";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server.
///
/// Binds to the configured interface and port (retrying on port conflict),
/// installs a Ctrl+C handler, then blocks in the request loop until the
/// handler unblocks it.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config.serve.interface.parse()?;
    let base_port = config.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config) {
            log!("serve"; "request error: {e:#}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < max_retries => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    max_retries,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// `/blog` is intercepted and rebuilt from source; everything else resolves
/// to a file in the output directory (404 when missing, 500 when a resolved
/// file cannot be read).
fn handle_request(request: Request, config: &SiteConfig) -> Result<()> {
    // Decode URL-encoded characters (e.g., %20 -> space)
    let url_path = urlencoding::decode(request.url())
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    // Strip query string before resolving the path
    let path_without_query = url_path.split('?').next().unwrap_or(&url_path);
    let request_path = path_without_query.trim_matches('/');

    if request_path == "blog" {
        return match blog_index_page(config) {
            Ok(page) => serve_html(request, page),
            Err(e) => {
                log!("error"; "blog listing failed: {e:#}");
                serve_error(request, 500, "500 Internal Server Error")
            }
        };
    }

    let local_path = config.build.output.join(resolve_output_path(request_path));
    if !local_path.is_file() {
        return serve_error(request, 404, "404 Not Found");
    }

    match fs::read(&local_path) {
        Ok(content) => serve_file(request, content, &local_path),
        Err(e) => {
            log!("error"; "{}: {e}", local_path.display());
            serve_error(request, 500, "500 Internal Server Error")
        }
    }
}

/// Map a trimmed request path to an output-relative file path.
///
/// The empty path is the home page; a path without an extension gets
/// `.html` appended.
fn resolve_output_path(request_path: &str) -> PathBuf {
    if request_path.is_empty() {
        return PathBuf::from("index.html");
    }

    let path = Path::new(request_path);
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => PathBuf::from(format!("{request_path}.html")),
    }
}

// ============================================================================
// Live Blog Index
// ============================================================================

/// Reconstruct the blog listing page from built output and markdown source.
///
/// Titles come from each built HTML file's first `<h1>`; dates are re-read
/// from the corresponding markdown source's frontmatter, never from the
/// rendered output. A built post whose markdown source has gone missing is
/// skipped with a warning instead of failing the whole listing.
fn blog_index_page(config: &SiteConfig) -> Result<String> {
    let built_dir = config.build.output.join("blog");
    let source_dir = config.blog_dir();

    let mut summaries = Vec::new();
    for path in list_built_posts(&built_dir)? {
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let source_path = source_dir.join(format!("{slug}.md"));
        if !source_path.is_file() {
            log!("warn"; "skipping {slug}: no markdown source at {}", source_path.display());
            continue;
        }

        let html = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read built post {}", path.display()))?;
        let raw = fs::read_to_string(&source_path)
            .with_context(|| format!("Failed to read source {}", source_path.display()))?;
        let (frontmatter, _) = content::split_frontmatter(&raw);

        summaries.push(PostSummary {
            title: title::from_html(&html),
            url: format!("/blog/{slug}.html"),
            date: date::parse_date_or_sentinel(frontmatter.get("date").map(String::as_str)),
        });
    }

    blog::sort_descending(&mut summaries);
    Ok(BLOG_INDEX_SKELETON
        .replacen("{name}", &config.site.name, 1)
        .replacen("{listing}", &blog::render_full_listing(&summaries), 1))
}

/// Built post HTML files, name-sorted for deterministic discovery order.
fn list_built_posts(built_dir: &Path) -> Result<Vec<PathBuf>> {
    if !built_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(built_dir)
        .with_context(|| format!("Failed to read directory {}", built_dir.display()))?;
    let mut paths: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    paths.sort();
    Ok(paths)
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Serve file content with a content type guessed from the extension.
fn serve_file(request: Request, content: Vec<u8>, path: &Path) -> Result<()> {
    let content_type = guess_content_type(path);
    let response = Response::from_data(content)
        .with_header(Header::from_bytes("Content-Type", content_type).expect("valid header"));
    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content).with_header(
        Header::from_bytes("Content-Type", "text/html; charset=utf-8").expect("valid header"),
    );
    request.respond(response)?;
    Ok(())
}

/// Serve a plain-text error response.
fn serve_error(request: Request, status: u16, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(Header::from_bytes("Content-Type", "text/plain").expect("valid header"));
    request.respond(response)?;
    Ok(())
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // resolve_output_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_empty_path_is_home_page() {
        assert_eq!(resolve_output_path(""), PathBuf::from("index.html"));
    }

    #[test]
    fn test_resolve_appends_html_when_extension_absent() {
        assert_eq!(resolve_output_path("about-me"), PathBuf::from("about-me.html"));
        assert_eq!(
            resolve_output_path("blog/first-post"),
            PathBuf::from("blog/first-post.html")
        );
    }

    #[test]
    fn test_resolve_keeps_existing_extension() {
        assert_eq!(
            resolve_output_path("css/style.css"),
            PathBuf::from("css/style.css")
        );
        assert_eq!(
            resolve_output_path("blog/first-post.html"),
            PathBuf::from("blog/first-post.html")
        );
    }

    // ------------------------------------------------------------------------
    // content type tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_guess_content_type() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("css/style.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("mystery.bin")),
            "application/octet-stream"
        );
    }

    // ------------------------------------------------------------------------
    // blog_index_page tests
    // ------------------------------------------------------------------------

    use crate::config::SiteConfig;

    const TEMPLATE: &str = "<title>{{title}} - {{websiteName}}</title>\
                            <main>{{content}}</main>";

    fn scaffold_built_site(tag: &str) -> (SiteConfig, PathBuf) {
        let root = std::env::temp_dir().join(format!("mdsite-serve-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);

        let content = root.join("content");
        fs::create_dir_all(content.join("blog")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("templates/base.html"), TEMPLATE).unwrap();
        fs::write(
            content.join("blog/first-post.md"),
            "---\ndate: 2024-01-01\n---\n# January Post\n",
        )
        .unwrap();
        fs::write(
            content.join("blog/second-post.md"),
            "---\ndate: 2024-06-15\n---\n# June Post\n",
        )
        .unwrap();

        let mut config = SiteConfig::default();
        config.build.content = content;
        config.build.templates = root.join("templates");
        config.build.output = root.join("dist");
        config.build.assets = root.join("css");
        crate::build::build_site(&config).unwrap();
        (config, root)
    }

    #[test]
    fn test_blog_index_matches_batch_ordering() {
        let (config, root) = scaffold_built_site("ordering");

        let live = blog_index_page(&config).unwrap();
        let june = live.find("June Post").unwrap();
        let january = live.find("January Post").unwrap();
        assert!(june < january, "live listing should be most-recent-first");

        // Same link set and order as the batch-built listing
        assert!(live.contains(r#"<a href="/blog/second-post.html">June Post</a>"#));
        assert!(live.contains(r#"<a href="/blog/first-post.html">January Post</a>"#));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_blog_index_skips_stale_output() {
        let (config, root) = scaffold_built_site("stale");

        // Orphan the built HTML by deleting its markdown source
        fs::remove_file(config.blog_dir().join("first-post.md")).unwrap();
        let live = blog_index_page(&config).unwrap();

        assert!(live.contains("June Post"));
        assert!(!live.contains("January Post"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_blog_index_empty_when_nothing_built() {
        let (config, root) = scaffold_built_site("empty");

        fs::remove_dir_all(config.build.output.join("blog")).unwrap();
        let live = blog_index_page(&config).unwrap();

        assert!(live.contains("<ul class=\"blog-list\">"));
        assert!(!live.contains("<li>"));

        let _ = fs::remove_dir_all(&root);
    }
}
