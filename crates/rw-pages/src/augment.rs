//! Page rendering with prerendered reference augmentation.
//!
//! The base HTML comes from a [`PageRenderer`]. Three GraphQL reference
//! pages are too large to render per request, so their bodies are
//! prerendered per version and appended here.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::{BoxError, PipelineError};
use crate::model::PrerenderedReference;
use crate::state::RenderState;

/// Turns a page and its context into HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render the page carried by `state`.
    async fn render(&self, state: &RenderState) -> Result<String, BoxError>;
}

/// Which prerendered fragment a rule appends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceFragment {
    Objects,
    InputObjects,
    Mutations,
}

impl ReferenceFragment {
    fn select(self, reference: &PrerenderedReference) -> &str {
        match self {
            Self::Objects => &reference.objects,
            Self::InputObjects => &reference.input_objects,
            Self::Mutations => &reference.mutations,
        }
    }
}

/// Appends a fragment to pages whose path ends with `suffix`.
#[derive(Clone, Debug)]
pub struct AugmentRule {
    pub suffix: &'static str,
    pub fragment: ReferenceFragment,
}

/// Renders pages and appends prerendered fragments for known paths.
#[derive(Clone, Debug)]
pub struct ContentAugmenter {
    rules: Vec<AugmentRule>,
}

impl Default for ContentAugmenter {
    fn default() -> Self {
        Self {
            rules: vec![
                AugmentRule {
                    suffix: "graphql/reference/objects",
                    fragment: ReferenceFragment::Objects,
                },
                AugmentRule {
                    suffix: "graphql/reference/input-objects",
                    fragment: ReferenceFragment::InputObjects,
                },
                AugmentRule {
                    suffix: "graphql/reference/mutations",
                    fragment: ReferenceFragment::Mutations,
                },
            ],
        }
    }
}

impl ContentAugmenter {
    /// Create an augmenter with custom rules. The first matching rule wins.
    #[must_use]
    pub fn with_rules(rules: Vec<AugmentRule>) -> Self {
        Self { rules }
    }

    /// Render the page and apply at most one augmentation.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Render` if the renderer fails.
    pub async fn render(
        &self,
        renderer: &dyn PageRenderer,
        state: &RenderState,
        path: &str,
    ) -> Result<String, PipelineError> {
        let started = Instant::now();
        let base = renderer
            .render(state)
            .await
            .map_err(|source| PipelineError::Render {
                path: path.to_owned(),
                source,
            })?;
        tracing::debug!(
            path = %path,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Rendered page"
        );

        Ok(self.augment(path, base, state.graphql()))
    }

    /// Append the fragment selected by the first rule matching `path`.
    #[must_use]
    pub fn augment(
        &self,
        path: &str,
        mut html: String,
        reference: Option<&PrerenderedReference>,
    ) -> String {
        let Some(rule) = self.rules.iter().find(|r| path.ends_with(r.suffix)) else {
            return html;
        };

        match reference {
            Some(reference) => html.push_str(rule.fragment.select(reference)),
            None => {
                tracing::warn!(path = %path, "No prerendered reference for current version");
            }
        }
        html
    }
}
