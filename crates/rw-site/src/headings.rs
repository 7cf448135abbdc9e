//! Heading extraction from rendered HTML for mini tables of contents.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rw_pages::{BoxError, MiniTocExtractor, MiniTocItem};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<h([1-6])((?:\s[^>]*)?)>(.*?)</h[1-6]>").expect("invalid heading regex")
});

static ID_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bid="([^"]*)""#).expect("invalid id attribute regex"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid tag regex"));

/// Shallowest heading level included in a mini table of contents.
const MIN_LEVEL: u8 = 2;

/// [`MiniTocExtractor`] over HTML produced by [`crate::render_markdown`].
///
/// Only headings carrying an `id` are linkable, so headings without one are
/// skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingExtractor;

impl HeadingExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Synchronous extraction used by the trait implementation.
    #[must_use]
    pub fn headings(html: &str, max_heading_level: u8, base_id: &str) -> Vec<MiniTocItem> {
        HEADING
            .captures_iter(html)
            .filter_map(|caps| {
                let level: u8 = caps[1].parse().ok()?;
                if !(MIN_LEVEL..=max_heading_level).contains(&level) {
                    return None;
                }
                let id = ID_ATTR.captures(&caps[2])?.get(1)?.as_str();
                Some(MiniTocItem {
                    level,
                    title: plain_text(&caps[3]),
                    href: format!("#{base_id}{id}"),
                })
            })
            .collect()
    }
}

#[async_trait]
impl MiniTocExtractor for HeadingExtractor {
    async fn extract(
        &self,
        html: &str,
        max_heading_level: u8,
        base_id: &str,
    ) -> Result<Vec<MiniTocItem>, BoxError> {
        Ok(Self::headings(html, max_heading_level, base_id))
    }
}

/// Strip tags and decode the entities the HTML writer emits.
fn plain_text(html: &str) -> String {
    TAG.replace_all(html, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}
