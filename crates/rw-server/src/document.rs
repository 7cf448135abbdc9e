//! HTML documents served for delegated and not-found requests.
//!
//! The page body and title HTML come from the renderer and are inserted
//! as-is; every other interpolated value is escaped.

use std::fmt::Write;

use md5::{Digest, Md5};
use rw_pages::RenderState;

/// Escape text for HTML element content and double-quoted attributes.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the full HTML document for a populated render state.
pub(crate) fn render_document(state: &RenderState) -> String {
    let page = state.page();
    let mut html = String::with_capacity(state.rendered_page().map_or(0, str::len) + 1024);

    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(
        html,
        "<html lang=\"{}\">",
        escape_html(state.current_language())
    );
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(state.title()));
    for variant in page.language_variants.iter().flatten() {
        let _ = writeln!(
            html,
            "<link rel=\"alternate\" hreflang=\"{}\" href=\"{}\">",
            escape_html(&variant.code),
            escape_html(&variant.href)
        );
    }
    html.push_str("</head>\n<body>\n");

    if let Some(items) = state.mini_toc_items().filter(|items| !items.is_empty()) {
        html.push_str("<nav class=\"mini-toc\">\n<ul>\n");
        for item in items {
            let _ = writeln!(
                html,
                "<li class=\"level-{}\"><a href=\"{}\">{}</a></li>",
                item.level,
                escape_html(&item.href),
                escape_html(&item.title)
            );
        }
        html.push_str("</ul>\n</nav>\n");
    }

    html.push_str("<article>\n");
    let _ = writeln!(html, "<h1>{}</h1>", page.title);
    html.push_str(state.rendered_page().unwrap_or_default());
    html.push_str("</article>\n</body>\n</html>\n");
    html
}

/// Render the 404 page.
pub(crate) fn render_not_found(language: &str) -> String {
    let language = escape_html(language);
    format!(
        "<!DOCTYPE html>\n<html lang=\"{language}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Page not found</title>\n</head>\n<body>\n<h1>Page not found</h1>\n\
         <p><a href=\"/{language}\">Return to the home page</a></p>\n</body>\n</html>\n"
    )
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
pub(crate) fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
