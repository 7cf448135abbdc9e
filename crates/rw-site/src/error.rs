//! Content loading errors.

use std::path::PathBuf;

/// Error returned when site content cannot be loaded.
///
/// Loading fails loudly so that bad front matter (for example an invalid
/// `effectiveDate`) never reaches request handling.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// I/O error reading a content or data file.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Front matter is missing or malformed.
    #[error("Invalid front matter in {}: {message}", path.display())]
    FrontMatter { path: PathBuf, message: String },

    /// `effectiveDate` is not a date.
    #[error("Invalid effectiveDate \"{value}\" in {}", path.display())]
    InvalidEffectiveDate { path: PathBuf, value: String },

    /// Front matter lists a version missing from the catalog.
    #[error("Unknown version \"{version}\" in {}", path.display())]
    UnknownVersion { path: PathBuf, version: String },

    /// A data file (`versions.yaml`, `redirects.yaml`) is malformed.
    #[error("Invalid data file {}: {message}", path.display())]
    Data { path: PathBuf, message: String },
}

impl SiteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
