//! Render state folded from stage updates.
//!
//! Each pipeline stage produces a [`StageUpdate`]; the orchestrator folds it
//! into the [`RenderState`] by value. A state always carries a page, so code
//! past the existence check never deals with a missing one.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{
    LanguageVariant, MiniTocItem, Page, PrerenderedReference, RenderContext, SiteData,
};

/// Incremental result of one pipeline stage.
#[derive(Clone, Debug, PartialEq)]
pub enum StageUpdate {
    /// Cross-language links for the page.
    LanguageVariants(Vec<LanguageVariant>),
    /// Augmented page HTML.
    RenderedPage(String),
    /// Mini table of contents, absent when the page opts out.
    MiniTocItems(Option<Vec<MiniTocItem>>),
    /// Final `<title>` string.
    FullTitle(String),
}

/// The fully or partially populated context of a request with a page.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    page: Page,
    current_language: String,
    current_version: String,
    site: Arc<SiteData>,
    graphql: Option<Arc<PrerenderedReference>>,
    rendered_page: Option<String>,
    mini_toc_items: Option<Vec<MiniTocItem>>,
}

impl RenderState {
    /// Start a state from a resolved context and its page.
    #[must_use]
    pub fn new(context: RenderContext, page: Page) -> Self {
        Self {
            page,
            current_language: context.current_language,
            current_version: context.current_version,
            site: context.site,
            graphql: context.graphql,
            rendered_page: None,
            mini_toc_items: None,
        }
    }

    /// Fold a stage update into the state.
    #[must_use]
    pub fn apply(mut self, update: StageUpdate) -> Self {
        match update {
            StageUpdate::LanguageVariants(variants) => {
                self.page.language_variants = Some(variants);
            }
            StageUpdate::RenderedPage(html) => self.rendered_page = Some(html),
            StageUpdate::MiniTocItems(items) => self.mini_toc_items = items,
            StageUpdate::FullTitle(title) => self.page.full_title = Some(title),
        }
        self
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    #[must_use]
    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    #[must_use]
    pub fn site(&self) -> &SiteData {
        &self.site
    }

    /// Prerendered reference fragments for the current version.
    #[must_use]
    pub fn graphql(&self) -> Option<&PrerenderedReference> {
        self.graphql.as_deref()
    }

    /// Augmented HTML, once the render stage ran.
    #[must_use]
    pub fn rendered_page(&self) -> Option<&str> {
        self.rendered_page.as_deref()
    }

    #[must_use]
    pub fn mini_toc_items(&self) -> Option<&[MiniTocItem]> {
        self.mini_toc_items.as_deref()
    }

    /// Full title, or the plain title if composition has not run.
    #[must_use]
    pub fn title(&self) -> &str {
        self.page
            .full_title
            .as_deref()
            .unwrap_or(&self.page.title_plain_text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::model::Language;

    pub(crate) fn sample_page() -> Page {
        Page {
            relative_path: "get-started".to_owned(),
            title: "Get <code>started</code>".to_owned(),
            title_plain_text: "Get started".to_owned(),
            full_title: None,
            effective_date: None,
            show_mini_toc: false,
            mini_toc_max_heading_level: 2,
            markdown: "## Install\n\nRun it.".to_owned(),
            language_variants: None,
        }
    }

    pub(crate) fn sample_site() -> Arc<SiteData> {
        Arc::new(SiteData {
            header_suffix: "GitHub Docs".to_owned(),
            languages: vec![Language {
                code: "en".to_owned(),
                name: "English".to_owned(),
                native_name: None,
            }],
            versions: crate::model::VersionCatalog::new(),
        })
    }

    fn sample_state() -> RenderState {
        let context = RenderContext::new(None, "en", "free-pro-team@latest", sample_site());
        RenderState::new(context, sample_page())
    }

    #[test]
    fn test_new_state_is_unpopulated() {
        let state = sample_state();
        assert_eq!(state.rendered_page(), None);
        assert_eq!(state.mini_toc_items(), None);
        assert_eq!(state.title(), "Get started");
        assert_eq!(state.current_version(), "free-pro-team@latest");
    }

    #[test]
    fn test_apply_folds_updates() {
        let state = sample_state()
            .apply(StageUpdate::RenderedPage("<p>hi</p>".to_owned()))
            .apply(StageUpdate::MiniTocItems(Some(vec![MiniTocItem {
                level: 2,
                title: "Install".to_owned(),
                href: "#install".to_owned(),
            }])))
            .apply(StageUpdate::FullTitle("Get started - GitHub Docs".to_owned()));

        assert_eq!(state.rendered_page(), Some("<p>hi</p>"));
        assert_eq!(state.mini_toc_items().map(<[_]>::len), Some(1));
        assert_eq!(state.title(), "Get started - GitHub Docs");
    }

    #[test]
    fn test_serializes_top_level_keys_in_camel_case() {
        let json = serde_json::to_value(sample_state()).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("page"));
        assert!(object.contains_key("currentVersion"));
        assert!(object.contains_key("renderedPage"));
        assert_eq!(json["page"]["titlePlainText"], "Get started");
    }
}
