//! Pipeline error types.

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error that aborts a request with a generic failure response.
///
/// Missing pages and dropped connections are not errors; they are
/// ordinary pipeline outcomes.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The page renderer failed.
    #[error("Failed to render {path}: {source}")]
    Render {
        /// Logical path of the request.
        path: String,
        #[source]
        source: BoxError,
    },

    /// The mini table of contents extractor failed.
    #[error("Failed to build mini table of contents for {path}: {source}")]
    MiniToc {
        /// Logical path of the request.
        path: String,
        #[source]
        source: BoxError,
    },

    /// The render state could not be converted to JSON for introspection.
    #[error("Failed to serialize render context: {0}")]
    Serialize(#[from] serde_json::Error),
}
