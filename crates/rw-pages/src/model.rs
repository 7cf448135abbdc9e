//! Request and document data model.
//!
//! The types here are what the HTTP layer and the content loader hand to the
//! pipeline. Site-wide data ([`SiteData`], [`PrerenderedReference`]) is
//! immutable after startup and shared behind `Arc`; everything else is owned
//! by a single request.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::Method;
use serde::Serialize;

/// Query parameter that enables debug introspection outside production.
pub const DEBUG_QUERY_PARAM: &str = "json";

/// The parts of an incoming request the pipeline reads.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Raw URL path (e.g., "/en/get-started").
    pub path: String,
    /// Resolved page path when it differs from the raw URL (e.g., after a redirect).
    pub page_path: Option<String>,
    /// Decoded query parameters. Bare keys (`?json`) map to an empty string.
    pub query: HashMap<String, String>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` and `path` with no query.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            page_path: None,
            query: HashMap::new(),
        }
    }

    /// Override the logical page path.
    #[must_use]
    pub fn with_page_path(mut self, page_path: impl Into<String>) -> Self {
        self.page_path = Some(page_path.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Path used for rendering decisions: the resolved page path if set,
    /// the raw URL path otherwise.
    #[must_use]
    pub fn logical_path(&self) -> &str {
        self.page_path.as_deref().unwrap_or(&self.path)
    }

    /// Value of the debug query parameter, if present.
    #[must_use]
    pub fn debug_query(&self) -> Option<&str> {
        self.query.get(DEBUG_QUERY_PARAM).map(String::as_str)
    }
}

/// A published language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    /// Two-letter code, also the first URL segment.
    pub code: String,
    /// English name.
    pub name: String,
    /// Name in the language itself.
    pub native_name: Option<String>,
}

/// Link to the same document in another language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageVariant {
    pub name: String,
    pub native_name: Option<String>,
    pub code: String,
    pub href: String,
}

/// A document ready to be rendered.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Path relative to the language/version prefix (e.g., "graphql/reference/objects").
    pub relative_path: String,
    /// Title with inline markup rendered to HTML.
    pub title: String,
    /// Title with all markup stripped.
    pub title_plain_text: String,
    /// Final `<title>` string, set by the pipeline.
    pub full_title: Option<String>,
    /// When the document last changed substantively.
    pub effective_date: Option<DateTime<Utc>>,
    /// Whether to build a mini table of contents.
    pub show_mini_toc: bool,
    /// Deepest heading level included in the mini table of contents.
    pub mini_toc_max_heading_level: u8,
    /// Markdown body (without front matter).
    pub markdown: String,
    /// Cross-language links, computed per request.
    pub language_variants: Option<Vec<LanguageVariant>>,
}

/// Display data for one product version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionCatalogEntry {
    pub version_title: String,
}

/// All known product versions keyed by version id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionCatalog(BTreeMap<String, VersionCatalogEntry>);

impl VersionCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a version.
    pub fn insert(&mut self, id: impl Into<String>, entry: VersionCatalogEntry) {
        self.0.insert(id.into(), entry);
    }

    /// Look up a version by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VersionCatalogEntry> {
        self.0.get(id)
    }

    /// Whether the catalog knows `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Iterate version ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, VersionCatalogEntry)> for VersionCatalog {
    fn from_iter<I: IntoIterator<Item = (K, VersionCatalogEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Process-wide site data, read-only after startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    /// Localized `<title>` suffix (e.g., "GitHub Docs").
    pub header_suffix: String,
    /// Published languages.
    pub languages: Vec<Language>,
    /// Version catalog.
    pub versions: VersionCatalog,
}

/// Prerendered GraphQL reference fragments for one version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerenderedReference {
    pub objects: String,
    pub input_objects: String,
    pub mutations: String,
}

/// One entry of a mini table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MiniTocItem {
    /// Heading level (2-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// In-page link (e.g., "#installing").
    pub href: String,
}

/// Everything resolved for a request before the pipeline runs.
#[derive(Clone, Debug)]
pub struct RenderContext {
    /// The resolved document, if any.
    pub page: Option<Page>,
    /// Language code of the request.
    pub current_language: String,
    /// Version id of the request.
    pub current_version: String,
    /// Site-wide data.
    pub site: Arc<SiteData>,
    /// Prerendered reference fragments for the current version.
    pub graphql: Option<Arc<PrerenderedReference>>,
    /// Redirect target that could not be resolved to a page.
    pub redirect_not_found: Option<String>,
}

impl RenderContext {
    /// Create a context for `page` in the given language and version.
    #[must_use]
    pub fn new(
        page: Option<Page>,
        current_language: impl Into<String>,
        current_version: impl Into<String>,
        site: Arc<SiteData>,
    ) -> Self {
        Self {
            page,
            current_language: current_language.into(),
            current_version: current_version.into(),
            site,
            graphql: None,
            redirect_not_found: None,
        }
    }

    /// Attach the prerendered reference fragments for the current version.
    #[must_use]
    pub fn with_graphql(mut self, graphql: Option<Arc<PrerenderedReference>>) -> Self {
        self.graphql = graphql;
        self
    }

    /// Record a redirect target that resolved to no page.
    #[must_use]
    pub fn with_redirect_not_found(mut self, target: impl Into<String>) -> Self {
        self.redirect_not_found = Some(target.into());
        self
    }
}
