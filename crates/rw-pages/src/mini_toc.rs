//! Mini table of contents stage.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::model::{MiniTocItem, Page};

/// Extracts in-page headings from rendered HTML.
#[async_trait]
pub trait MiniTocExtractor: Send + Sync {
    /// Collect headings up to `max_heading_level`, prefixing anchors with `base_id`.
    async fn extract(
        &self,
        html: &str,
        max_heading_level: u8,
        base_id: &str,
    ) -> Result<Vec<MiniTocItem>, BoxError>;
}

/// Build the mini table of contents if the page asks for one.
///
/// Returns `Ok(None)` without calling the extractor when the page's
/// `show_mini_toc` flag is off.
///
/// # Errors
///
/// Propagates extractor failures unchanged.
pub async fn build_if_needed(
    extractor: &dyn MiniTocExtractor,
    page: &Page,
    rendered_html: &str,
) -> Result<Option<Vec<MiniTocItem>>, BoxError> {
    if !page.show_mini_toc {
        return Ok(None);
    }

    let items = extractor
        .extract(rendered_html, page.mini_toc_max_heading_level, "")
        .await?;
    Ok(Some(items))
}
