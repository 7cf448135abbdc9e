//! `<title>` composition.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::VersionCatalog;

/// A language homepage: `/en`, `/ja/`.
static HOMEPAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[a-z]{2}/?$").expect("invalid homepage regex"));

/// Check whether `path` is a language homepage.
#[must_use]
pub fn is_homepage(path: &str) -> bool {
    HOMEPAGE_PATH.is_match(path)
}

/// Derives the full page title from page, version and site metadata.
///
/// Pure: the result depends only on the arguments and the configured
/// default version and brand word.
#[derive(Clone, Debug)]
pub struct TitleComposer {
    default_version: String,
    brand: String,
}

impl TitleComposer {
    /// Create a composer.
    ///
    /// # Arguments
    ///
    /// * `default_version` - Flagship version id (e.g., "free-pro-team@latest")
    /// * `brand` - Product brand word (e.g., "GitHub")
    #[must_use]
    pub fn new(default_version: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            default_version: default_version.into(),
            brand: brand.into(),
        }
    }

    /// Compose the full title.
    ///
    /// Homepages keep the plain title. Default or unknown versions get
    /// `" - {site_header_suffix}"`. Other versions get
    /// `" - {version title} Docs"`, with the brand word prefixed to the version
    /// title when it does not already contain it.
    #[must_use]
    pub fn compose(
        &self,
        title_plain: &str,
        path: &str,
        current_version: &str,
        catalog: &VersionCatalog,
        site_header_suffix: &str,
    ) -> String {
        if is_homepage(path) {
            return title_plain.to_owned();
        }

        let entry = if current_version == self.default_version {
            None
        } else {
            catalog.get(current_version)
        };

        match entry {
            None => format!("{title_plain} - {site_header_suffix}"),
            Some(entry) if entry.version_title.contains(&self.brand) => {
                format!("{title_plain} - {} Docs", entry.version_title)
            }
            Some(entry) => format!(
                "{title_plain} - {} {} Docs",
                self.brand, entry.version_title
            ),
        }
    }
}
