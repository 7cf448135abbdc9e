//! Read-only render context introspection for non-production servers.
//!
//! `?json` lists the top-level context keys; `?json=page.title` returns the
//! value at a dotted path (`null` when the path does not resolve). Never
//! active in production.

use rw_config::ExecutionMode;
use serde_json::{Value, json};

use crate::error::PipelineError;
use crate::model::RequestDescriptor;
use crate::state::RenderState;

/// Separator between path segments in a deep reference.
const PATH_SEPARATOR: char = '.';

/// Shown with the key listing for a bare `?json`.
const ADVISORY_MESSAGE: &str = "The full context object is too big to display! \
     Try one of the individual keys below, e.g. ?json=page.title. \
     You can also access nested props like ?json=site.versions";

/// Resolve a dotted path inside a JSON tree.
///
/// Object members are addressed by key, array elements by index.
/// Returns `None` as soon as a segment does not resolve.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split(PATH_SEPARATOR)
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Guarded diagnostic view of the render state.
#[derive(Clone, Copy, Debug)]
pub struct DebugIntrospector {
    mode: ExecutionMode,
}

impl DebugIntrospector {
    /// Create an introspector for the process execution mode.
    #[must_use]
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    /// Whether the request asks for introspection and the mode allows it.
    #[must_use]
    pub fn is_requested(&self, request: &RequestDescriptor) -> bool {
        !self.mode.is_production() && request.debug_query().is_some()
    }

    /// Produce the JSON payload for an introspection request.
    ///
    /// Returns `Ok(None)` when introspection is not requested or not allowed.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Serialize` if the state cannot be converted to JSON.
    pub fn respond(
        &self,
        request: &RequestDescriptor,
        state: &RenderState,
    ) -> Result<Option<Value>, PipelineError> {
        if !self.is_requested(request) {
            return Ok(None);
        }
        let query = request.debug_query().unwrap_or_default();
        let tree = serde_json::to_value(state)?;
        Ok(Some(introspect(&tree, query)))
    }
}

/// Answer an introspection query against a serialized context.
///
/// A query containing the path separator is a deep reference; anything else
/// (including an empty value) gets the shallow key listing.
#[must_use]
pub fn introspect(tree: &Value, query: &str) -> Value {
    if query.contains(PATH_SEPARATOR) {
        return lookup(tree, query).cloned().unwrap_or(Value::Null);
    }

    let keys: Vec<&str> = tree
        .as_object()
        .map(|map| map.keys().map(String::as_str).collect())
        .unwrap_or_default();
    json!({
        "message": ADVISORY_MESSAGE,
        "keys": keys,
    })
}
