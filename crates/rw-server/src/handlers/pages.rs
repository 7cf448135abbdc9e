//! Page requests.
//!
//! Every non-root path goes through the page pipeline. The pipeline runs on
//! a spawned task; this handler holds a [`DisconnectGuard`] so that a client
//! disconnect (hyper dropping the handler future) is visible to the task at
//! its next checkpoint.
//!
//! [`DisconnectGuard`]: rw_pages::DisconnectGuard

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use rw_pages::{
    DisconnectFlag, RenderContext, RenderOrchestrator, RenderState, RequestDescriptor,
    TerminalAction,
};
use rw_site::Resolution;

use crate::document::{compute_etag, render_document, render_not_found};
use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET / by redirecting to the default language homepage.
pub(crate) async fn redirect_root(State(state): State<Arc<AppState>>) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("/{}", state.site.default_language()))],
    )
        .into_response()
}

/// Handle any other path.
pub(crate) async fn serve_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    request_headers: HeaderMap,
) -> Result<Response, ServerError> {
    let Resolution { context, page_path } = state.site.resolve(uri.path());
    let language = context.current_language.clone();

    let mut request = RequestDescriptor::new(method, uri.path());
    request.query = query;
    if let Some(page_path) = page_path {
        request = request.with_page_path(page_path);
    }

    let flag = DisconnectFlag::new();
    let guard = flag.guard();
    let outcome = run_pipeline(Arc::clone(&state.orchestrator), request, context, flag).await;
    guard.disarm();

    // The flag only flips when this future is dropped, and then this line
    // never runs. Kept for monitors that report a disconnect on their own.
    let Some((action, headers)) = outcome? else {
        tracing::debug!(path = %uri.path(), "Request aborted, discarding response");
        return Ok(().into_response());
    };

    let response = match action {
        TerminalAction::RespondNotFound => (
            StatusCode::NOT_FOUND,
            headers,
            Html(render_not_found(&language)),
        )
            .into_response(),
        TerminalAction::RespondEmpty => (StatusCode::OK, headers).into_response(),
        TerminalAction::RespondJson(payload) => (headers, Json(payload)).into_response(),
        TerminalAction::Delegate(render_state) => {
            deliver_document(&state.version, &render_state, &request_headers, headers)
        }
    };
    Ok(response)
}

/// Run the page pipeline on its own task.
///
/// The task outlives a dropped request future and observes the disconnect
/// through `flag` at its next checkpoint. `None` means it stopped there.
async fn run_pipeline(
    orchestrator: Arc<RenderOrchestrator>,
    request: RequestDescriptor,
    context: RenderContext,
    flag: DisconnectFlag,
) -> Result<Option<(TerminalAction, HeaderMap)>, ServerError> {
    let outcome = tokio::spawn(async move {
        let mut headers = HeaderMap::new();
        orchestrator
            .handle(&request, context, &mut headers, &flag)
            .await
            .map(|action| action.map(|action| (action, headers)))
    })
    .await??;
    Ok(outcome)
}

/// Render the HTML document for a delegated request, honoring `If-None-Match`.
fn deliver_document(
    version: &str,
    render_state: &RenderState,
    request_headers: &HeaderMap,
    headers: HeaderMap,
) -> Response {
    let body = render_document(render_state);
    let etag = compute_etag(version, &body);

    if let Some(if_none_match) = request_headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return (StatusCode::NOT_MODIFIED, headers, [(header::ETAG, etag)]).into_response();
    }

    (headers, [(header::ETAG, etag)], Html(body)).into_response()
}
