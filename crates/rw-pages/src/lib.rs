//! Per-request page rendering pipeline for RW.
//!
//! Given a resolved document and its site context, [`RenderOrchestrator`]
//! decides what happens to a page request: cache headers, rendering with
//! prerendered augmentation, mini table of contents, title composition,
//! debug introspection, and the single terminal action.
//!
//! The renderer and the heading extractor are collaborators behind the
//! [`PageRenderer`] and [`MiniTocExtractor`] traits; `rw-site` provides the
//! markdown-based implementations.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use http::{HeaderMap, Method};
//! use rw_pages::{DisconnectFlag, OrchestratorConfig, RenderOrchestrator, RequestDescriptor};
//!
//! let orchestrator = RenderOrchestrator::new(renderer, extractor, OrchestratorConfig::default());
//! let request = RequestDescriptor::new(Method::GET, "/en/get-started");
//! let mut headers = HeaderMap::new();
//! let action = orchestrator
//!     .handle(&request, context, &mut headers, &DisconnectFlag::new())
//!     .await?;
//! ```

mod augment;
mod cache_policy;
mod connection;
mod debug;
mod error;
mod language;
mod mini_toc;
mod model;
mod orchestrator;
mod state;
mod title;

pub use augment::{AugmentRule, ContentAugmenter, PageRenderer, ReferenceFragment};
pub use cache_policy::{CachePolicies, CachePolicy};
pub use connection::{ConnectionMonitor, DisconnectFlag, DisconnectGuard};
pub use debug::{DebugIntrospector, introspect, lookup};
pub use error::{BoxError, PipelineError};
pub use language::{language_variants, path_without_language};
pub use mini_toc::{MiniTocExtractor, build_if_needed};
pub use model::{
    DEBUG_QUERY_PARAM, Language, LanguageVariant, MiniTocItem, Page, PrerenderedReference,
    RenderContext, RequestDescriptor, SiteData, VersionCatalog, VersionCatalogEntry,
};
pub use orchestrator::{OrchestratorConfig, RenderOrchestrator, TerminalAction, http_date};
pub use state::{RenderState, StageUpdate};
pub use title::{TitleComposer, is_homepage};

// Re-export the execution mode so callers need not depend on rw-config.
pub use rw_config::ExecutionMode;
