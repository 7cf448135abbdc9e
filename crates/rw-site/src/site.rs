//! Loaded site content and request-path resolution.
//!
//! [`Site::load`] reads every content and data file once at startup. The
//! result is immutable: request handling only calls [`Site::resolve`], which
//! clones the matched page into a fresh [`RenderContext`].
//!
//! URL layout:
//!
//! ```text
//! /<lang>[/<version>]/<page path>
//! /en                                    homepage, default version
//! /en/get-started/quickstart             default version
//! /en/enterprise-server@3.5/get-started  explicit version
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rw_pages::{Language, Page, PrerenderedReference, RenderContext, SiteData};

use crate::data;
use crate::error::SiteError;
use crate::front_matter;
use crate::renderer::render_inline;
use crate::scanner;

/// Content locations and site-wide settings.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Directory holding `**/*.md` content files.
    pub content_dir: PathBuf,
    /// Directory holding `versions.yaml`, `redirects.yaml` and `graphql/`.
    pub data_dir: PathBuf,
    /// Language used when the URL names none.
    pub default_language: String,
    /// Version used when the URL names none.
    pub default_version: String,
    /// `<title>` suffix.
    pub header_suffix: String,
    /// Published languages.
    pub languages: Vec<Language>,
}

/// A loaded page plus the versions it is published for.
#[derive(Debug)]
struct PageEntry {
    page: Page,
    /// `None` means every version.
    versions: Option<Vec<String>>,
}

impl PageEntry {
    fn available_in(&self, version: &str) -> bool {
        self.versions
            .as_ref()
            .is_none_or(|versions| versions.iter().any(|v| v == version))
    }
}

/// Outcome of resolving a request path.
#[derive(Clone, Debug)]
pub struct Resolution {
    /// Context handed to the render pipeline.
    pub context: RenderContext,
    /// URL path of the page actually served, when it differs from the request
    /// (set after following a redirect).
    pub page_path: Option<String>,
}

/// Immutable site content.
#[derive(Debug)]
pub struct Site {
    pages: HashMap<String, PageEntry>,
    redirects: HashMap<String, String>,
    graphql: HashMap<String, Arc<PrerenderedReference>>,
    data: Arc<SiteData>,
    default_language: String,
    default_version: String,
}

impl Site {
    /// Load all content and data files.
    ///
    /// # Errors
    ///
    /// Returns `SiteError` if a file cannot be read, front matter is invalid,
    /// an `effectiveDate` does not parse, or a page lists an unknown version.
    pub fn load(config: SiteConfig) -> Result<Self, SiteError> {
        let versions = data::load_versions(&config.data_dir)?;
        let redirects = data::load_redirects(&config.data_dir)?;
        let graphql = data::load_graphql(&config.data_dir, &versions)?;

        let mut pages = HashMap::new();
        for content in scanner::scan(&config.content_dir) {
            let source = fs::read_to_string(&content.file_path)
                .map_err(|e| SiteError::io(&content.file_path, e))?;
            let (front_matter, markdown) = front_matter::parse(&source, &content.file_path)?;

            let effective_date = front_matter
                .effective_date
                .as_deref()
                .map(|value| front_matter::parse_effective_date(value, &content.file_path))
                .transpose()?;

            if let Some(unknown) = front_matter
                .versions
                .iter()
                .flatten()
                .find(|v| !versions.contains(v))
            {
                return Err(SiteError::UnknownVersion {
                    path: content.file_path,
                    version: unknown.clone(),
                });
            }

            let (title, title_plain_text) = render_inline(&front_matter.title);
            let page = Page {
                relative_path: content.page_path.clone(),
                title,
                title_plain_text,
                full_title: None,
                effective_date,
                show_mini_toc: front_matter.show_mini_toc,
                mini_toc_max_heading_level: front_matter.mini_toc_max_heading_level,
                markdown,
                language_variants: None,
            };
            pages.insert(
                content.page_path,
                PageEntry {
                    page,
                    versions: front_matter.versions,
                },
            );
        }

        tracing::info!(
            pages = pages.len(),
            versions = versions.len(),
            redirects = redirects.len(),
            graphql_versions = graphql.len(),
            content_dir = %config.content_dir.display(),
            "Site loaded"
        );

        Ok(Self {
            pages,
            redirects,
            graphql,
            data: Arc::new(SiteData {
                header_suffix: config.header_suffix,
                languages: config.languages,
                versions,
            }),
            default_language: config.default_language,
            default_version: config.default_version,
        })
    }

    /// Site-wide data shared with every request.
    #[must_use]
    pub fn data(&self) -> Arc<SiteData> {
        Arc::clone(&self.data)
    }

    /// Language used for `/`.
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Resolve a URL path to a render context.
    ///
    /// Unknown languages, unknown pages and pages not published for the
    /// requested version resolve to a context without a page. A redirect
    /// whose target is missing also records the target in
    /// `redirect_not_found`.
    #[must_use]
    pub fn resolve(&self, url_path: &str) -> Resolution {
        let mut segments = url_path.split('/').filter(|s| !s.is_empty()).peekable();

        let language = match segments.next() {
            Some(code) if self.is_language(code) => code.to_owned(),
            _ => return self.absent(&self.default_language, &self.default_version),
        };

        let explicit_version = segments
            .next_if(|segment| self.data.versions.contains(segment))
            .map(str::to_owned);
        let version = explicit_version
            .clone()
            .unwrap_or_else(|| self.default_version.clone());

        let relative: Vec<&str> = segments.collect();
        let relative = relative.join("/");

        if let Some(page) = self.page_for(&relative, &version) {
            return self.found(page, &language, &version, None);
        }

        let Some(target) = self.redirects.get(&relative) else {
            return self.absent(&language, &version);
        };

        match self.page_for(target, &version) {
            Some(page) => {
                let page_path = page_url(&language, explicit_version.as_deref(), target);
                self.found(page, &language, &version, Some(page_path))
            }
            None => {
                tracing::debug!(from = %relative, to = %target, "Redirect target not found");
                let target_url = page_url(&language, explicit_version.as_deref(), target);
                let mut resolution = self.absent(&language, &version);
                resolution.context = resolution.context.with_redirect_not_found(target_url);
                resolution
            }
        }
    }

    fn is_language(&self, code: &str) -> bool {
        self.data.languages.iter().any(|l| l.code == code)
    }

    fn page_for(&self, relative: &str, version: &str) -> Option<&Page> {
        self.pages
            .get(relative)
            .filter(|entry| entry.available_in(version))
            .map(|entry| &entry.page)
    }

    fn found(
        &self,
        page: &Page,
        language: &str,
        version: &str,
        page_path: Option<String>,
    ) -> Resolution {
        let context = RenderContext::new(Some(page.clone()), language, version, self.data())
            .with_graphql(self.graphql.get(version).cloned());
        Resolution { context, page_path }
    }

    fn absent(&self, language: &str, version: &str) -> Resolution {
        Resolution {
            context: RenderContext::new(None, language, version, self.data()),
            page_path: None,
        }
    }
}

/// Build the URL path of a page, keeping an explicit version segment.
fn page_url(language: &str, version: Option<&str>, relative: &str) -> String {
    let mut url = format!("/{language}");
    for segment in version.into_iter().chain(Some(relative)) {
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}
