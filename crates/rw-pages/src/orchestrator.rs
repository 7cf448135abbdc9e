//! The per-request page pipeline.
//!
//! [`RenderOrchestrator::handle`] sequences the stages and decides the single
//! terminal action of a request:
//!
//! ```text
//! page absent? ──► no-cache ──► RespondNotFound
//! HEAD?        ──► no-cache ──► RespondEmpty
//! html policy, Last-Modified, language variants
//! connection dropped? ──► stop
//! render + augment, mini-toc
//! connection dropped? ──► stop
//! title
//! ?json outside production? ──► RespondJson
//! otherwise ──► Delegate
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::header::{HeaderMap, HeaderValue, LAST_MODIFIED};
use http::Method;
use rw_config::ExecutionMode;
use serde_json::Value;

use crate::augment::{ContentAugmenter, PageRenderer};
use crate::cache_policy::CachePolicies;
use crate::connection::ConnectionMonitor;
use crate::debug::DebugIntrospector;
use crate::error::PipelineError;
use crate::language::language_variants;
use crate::mini_toc::{self, MiniTocExtractor};
use crate::model::{RenderContext, RequestDescriptor};
use crate::state::{RenderState, StageUpdate};
use crate::title::TitleComposer;

/// How a request ends.
#[derive(Debug)]
pub enum TerminalAction {
    /// No page: hand off to the not-found renderer (404).
    RespondNotFound,
    /// HEAD request: 200 with an empty body.
    RespondEmpty,
    /// Debug introspection payload (200).
    RespondJson(Value),
    /// Hand the populated state to the fallback handler.
    Delegate(Box<RenderState>),
}

/// Startup configuration for [`RenderOrchestrator`].
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Process execution mode.
    pub mode: ExecutionMode,
    /// Cache-Control policies.
    pub policies: CachePolicies,
    /// Flagship version id.
    pub default_version: String,
    /// Product brand word.
    pub brand: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            policies: CachePolicies::default(),
            default_version: "free-pro-team@latest".to_owned(),
            brand: "GitHub".to_owned(),
        }
    }
}

/// Format a timestamp as an HTTP date (RFC 7231 IMF-fixdate).
#[must_use]
pub fn http_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Whether a redirect to a missing page is logged. Only production reports it.
fn reports_redirect_miss(mode: ExecutionMode) -> bool {
    mode.is_production()
}

/// Orders the page pipeline stages for one request at a time.
///
/// Holds only read-only collaborators and configuration; one instance serves
/// all concurrent requests.
pub struct RenderOrchestrator {
    renderer: Arc<dyn PageRenderer>,
    mini_toc: Arc<dyn MiniTocExtractor>,
    augmenter: ContentAugmenter,
    titles: TitleComposer,
    debug: DebugIntrospector,
    policies: CachePolicies,
    mode: ExecutionMode,
}

impl RenderOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        mini_toc: Arc<dyn MiniTocExtractor>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            renderer,
            mini_toc,
            augmenter: ContentAugmenter::default(),
            titles: TitleComposer::new(config.default_version, config.brand),
            debug: DebugIntrospector::new(config.mode),
            policies: config.policies,
            mode: config.mode,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// `headers` is the response header map; it is only written before the
    /// returned action is produced. Returns `Ok(None)` when the client
    /// disconnected at a checkpoint, in which case nothing must be sent.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if rendering or mini-toc extraction fails.
    #[tracing::instrument(skip_all, fields(path = %request.logical_path()))]
    pub async fn handle(
        &self,
        request: &RequestDescriptor,
        mut context: RenderContext,
        headers: &mut HeaderMap,
        connection: &dyn ConnectionMonitor,
    ) -> Result<Option<TerminalAction>, PipelineError> {
        let path = request.logical_path();

        let Some(page) = context.page.take() else {
            self.policies.no_cache.apply(headers);
            if reports_redirect_miss(self.mode)
                && let Some(target) = &context.redirect_not_found
            {
                tracing::error!(
                    target_path = %target,
                    "Tried to redirect to {target}, but that page was not found"
                );
            }
            return Ok(Some(TerminalAction::RespondNotFound));
        };

        if request.method == Method::HEAD {
            self.policies.no_cache.apply(headers);
            return Ok(Some(TerminalAction::RespondEmpty));
        }

        self.policies.html.apply(headers);

        if let Some(date) = &page.effective_date
            && let Ok(value) = HeaderValue::from_str(&http_date(date))
        {
            headers.insert(LAST_MODIFIED, value);
        }

        let variants = language_variants(path, &context.site.languages);
        let mut state =
            RenderState::new(context, page).apply(StageUpdate::LanguageVariants(variants));

        if connection.is_dropped() {
            tracing::debug!(checkpoint = "before_render", "Client disconnected");
            return Ok(None);
        }

        let html = self
            .augmenter
            .render(self.renderer.as_ref(), &state, path)
            .await?;
        state = state.apply(StageUpdate::RenderedPage(html));

        let items = mini_toc::build_if_needed(
            self.mini_toc.as_ref(),
            state.page(),
            state.rendered_page().unwrap_or_default(),
        )
        .await
        .map_err(|source| PipelineError::MiniToc {
            path: path.to_owned(),
            source,
        })?;
        state = state.apply(StageUpdate::MiniTocItems(items));

        if connection.is_dropped() {
            tracing::debug!(checkpoint = "after_render", "Client disconnected");
            return Ok(None);
        }

        let full_title = self.titles.compose(
            &state.page().title_plain_text,
            path,
            state.current_version(),
            &state.site().versions,
            &state.site().header_suffix,
        );
        state = state.apply(StageUpdate::FullTitle(full_title));

        if let Some(payload) = self.debug.respond(request, &state)? {
            return Ok(Some(TerminalAction::RespondJson(payload)));
        }

        Ok(Some(TerminalAction::Delegate(Box::new(state))))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use http::header::CACHE_CONTROL;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::connection::DisconnectFlag;
    use crate::error::BoxError;
    use crate::model::{MiniTocItem, Page, PrerenderedReference, VersionCatalogEntry};
    use crate::state::tests::{sample_page, sample_site};

    static_assertions::assert_impl_all!(RenderOrchestrator: Send, Sync);
    static_assertions::assert_impl_all!(RenderState: Send, Sync);

    /// Renders the markdown verbatim and counts calls. Optionally flips a
    /// disconnect flag while rendering.
    #[derive(Default)]
    struct FakeRenderer {
        calls: AtomicUsize,
        drop_during_render: Option<DisconnectFlag>,
    }

    #[async_trait]
    impl PageRenderer for FakeRenderer {
        async fn render(&self, state: &RenderState) -> Result<String, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(flag) = &self.drop_during_render {
                flag.mark_dropped();
            }
            Ok(format!("<main>{}</main>", state.page().markdown))
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl PageRenderer for FailingRenderer {
        async fn render(&self, _state: &RenderState) -> Result<String, BoxError> {
            Err("template exploded".into())
        }
    }

    #[derive(Default)]
    struct FakeMiniToc {
        calls: Mutex<Vec<u8>>,
        fail: bool,
    }

    #[async_trait]
    impl MiniTocExtractor for FakeMiniToc {
        async fn extract(
            &self,
            _html: &str,
            max_heading_level: u8,
            _base_id: &str,
        ) -> Result<Vec<MiniTocItem>, BoxError> {
            self.calls.lock().unwrap().push(max_heading_level);
            if self.fail {
                return Err("bad markup".into());
            }
            Ok(vec![MiniTocItem {
                level: 2,
                title: "Install".to_owned(),
                href: "#install".to_owned(),
            }])
        }
    }

    struct Harness {
        renderer: Arc<FakeRenderer>,
        mini_toc: Arc<FakeMiniToc>,
        orchestrator: RenderOrchestrator,
    }

    fn harness_with(mode: ExecutionMode, renderer: FakeRenderer) -> Harness {
        let renderer = Arc::new(renderer);
        let mini_toc = Arc::new(FakeMiniToc::default());
        let orchestrator = RenderOrchestrator::new(
            Arc::clone(&renderer) as Arc<dyn PageRenderer>,
            Arc::clone(&mini_toc) as Arc<dyn MiniTocExtractor>,
            OrchestratorConfig {
                mode,
                policies: CachePolicies::new(60),
                ..OrchestratorConfig::default()
            },
        );
        Harness {
            renderer,
            mini_toc,
            orchestrator,
        }
    }

    fn harness(mode: ExecutionMode) -> Harness {
        harness_with(mode, FakeRenderer::default())
    }

    fn context(page: Option<Page>) -> RenderContext {
        RenderContext::new(page, "en", "free-pro-team@latest", sample_site())
    }

    fn get(path: &str) -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, path)
    }

    fn expect_delegate(action: Option<TerminalAction>) -> RenderState {
        match action {
            Some(TerminalAction::Delegate(state)) => *state,
            other => panic!("expected Delegate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found_with_no_cache() {
        let h = harness(ExecutionMode::Test);
        for request in [
            get("/en/missing"),
            RequestDescriptor::new(Method::HEAD, "/en/missing"),
            get("/en/missing").with_query("json", "page.title"),
        ] {
            let mut headers = HeaderMap::new();
            let action = h
                .orchestrator
                .handle(&request, context(None), &mut headers, &DisconnectFlag::new())
                .await
                .unwrap();

            assert!(matches!(action, Some(TerminalAction::RespondNotFound)));
            assert_eq!(headers[CACHE_CONTROL], "private, no-store");
            assert!(headers.get(LAST_MODIFIED).is_none());
        }
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_page_with_redirect_hint_still_not_found() {
        for mode in [
            ExecutionMode::Production,
            ExecutionMode::Development,
            ExecutionMode::Test,
        ] {
            let h = harness(mode);
            let mut headers = HeaderMap::new();
            let action = h
                .orchestrator
                .handle(
                    &get("/en/old"),
                    context(None).with_redirect_not_found("/en/new"),
                    &mut headers,
                    &DisconnectFlag::new(),
                )
                .await
                .unwrap();

            assert!(matches!(action, Some(TerminalAction::RespondNotFound)));
            assert_eq!(headers[CACHE_CONTROL], "private, no-store");
        }
    }

    #[test]
    fn test_redirect_miss_reported_only_in_production() {
        assert!(reports_redirect_miss(ExecutionMode::Production));
        assert!(!reports_redirect_miss(ExecutionMode::Development));
        assert!(!reports_redirect_miss(ExecutionMode::Test));
    }

    #[tokio::test]
    async fn test_head_request_is_empty_without_rendering() {
        let h = harness(ExecutionMode::Test);
        let page = Page {
            show_mini_toc: true,
            effective_date: Some(Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()),
            ..sample_page()
        };
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &RequestDescriptor::new(Method::HEAD, "/en/get-started"),
                context(Some(page)),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        assert!(matches!(action, Some(TerminalAction::RespondEmpty)));
        assert_eq!(headers[CACHE_CONTROL], "private, no-store");
        assert_eq!(headers.len(), 1);
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
        assert!(h.mini_toc.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_runs_full_pipeline() {
        let h = harness(ExecutionMode::Test);
        let page = Page {
            show_mini_toc: true,
            mini_toc_max_heading_level: 3,
            effective_date: Some(Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 0).unwrap()),
            ..sample_page()
        };
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &get("/en/get-started"),
                context(Some(page)),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();
        let state = expect_delegate(action);

        assert_eq!(headers[CACHE_CONTROL], "public, max-age=60");
        assert_eq!(headers[LAST_MODIFIED], "Tue, 01 Jun 2021 12:30:00 GMT");
        assert_eq!(
            state.rendered_page(),
            Some("<main>## Install\n\nRun it.</main>")
        );
        assert_eq!(state.mini_toc_items().map(<[_]>::len), Some(1));
        assert_eq!(*h.mini_toc.calls.lock().unwrap(), vec![3]);
        assert_eq!(state.title(), "Get started - GitHub Docs");
        let variants = state.page().language_variants.as_ref().unwrap();
        assert_eq!(variants[0].href, "/en/get-started");
    }

    #[tokio::test]
    async fn test_mini_toc_skipped_when_flag_off() {
        let h = harness(ExecutionMode::Test);
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &get("/en/get-started"),
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();
        let state = expect_delegate(action);

        assert_eq!(state.mini_toc_items(), None);
        assert!(h.mini_toc.calls.lock().unwrap().is_empty());
        assert!(headers.get(LAST_MODIFIED).is_none());
    }

    #[tokio::test]
    async fn test_page_path_drives_title_and_variants() {
        let h = harness(ExecutionMode::Test);
        let request = get("/en/old-location").with_page_path("/en");
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &request,
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();
        let state = expect_delegate(action);

        assert_eq!(state.title(), "Get started");
        assert_eq!(state.page().language_variants.as_ref().unwrap()[0].href, "/en");
    }

    #[tokio::test]
    async fn test_versioned_title() {
        let h = harness(ExecutionMode::Test);
        let mut site = (*sample_site()).clone();
        site.versions.insert(
            "enterprise-server@3.5",
            VersionCatalogEntry {
                version_title: "Enterprise Server 3.5".to_owned(),
            },
        );
        let context = RenderContext::new(
            Some(sample_page()),
            "en",
            "enterprise-server@3.5",
            Arc::new(site),
        );
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &get("/en/enterprise-server@3.5/get-started"),
                context,
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            expect_delegate(action).title(),
            "Get started - GitHub Enterprise Server 3.5 Docs"
        );
    }

    #[tokio::test]
    async fn test_graphql_reference_is_augmented() {
        let h = harness(ExecutionMode::Test);
        let context = context(Some(sample_page())).with_graphql(Some(Arc::new(
            PrerenderedReference {
                objects: "<section>objects</section>".to_owned(),
                ..PrerenderedReference::default()
            },
        )));
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &get("/en/graphql/reference/objects"),
                context,
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        let state = expect_delegate(action);
        assert!(
            state
                .rendered_page()
                .unwrap()
                .ends_with("</main><section>objects</section>")
        );
    }

    #[tokio::test]
    async fn test_dropped_before_render_stops_pipeline() {
        let h = harness(ExecutionMode::Test);
        let connection = DisconnectFlag::new();
        connection.mark_dropped();
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &get("/en/get-started"),
                context(Some(sample_page())),
                &mut headers,
                &connection,
            )
            .await
            .unwrap();

        assert!(action.is_none());
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropped_after_render_skips_title() {
        let connection = DisconnectFlag::new();
        let h = harness_with(
            ExecutionMode::Development,
            FakeRenderer {
                drop_during_render: Some(connection.clone()),
                ..FakeRenderer::default()
            },
        );
        let page = Page {
            show_mini_toc: true,
            ..sample_page()
        };
        let request = get("/en/get-started").with_query("json", "");
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(&request, context(Some(page)), &mut headers, &connection)
            .await
            .unwrap();

        assert!(action.is_none());
        assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.mini_toc.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_render_failure_propagates() {
        let orchestrator = RenderOrchestrator::new(
            Arc::new(FailingRenderer),
            Arc::new(FakeMiniToc::default()),
            OrchestratorConfig::default(),
        );
        let mut headers = HeaderMap::new();

        let err = orchestrator
            .handle(
                &get("/en/get-started"),
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Render { .. }));
        assert!(err.to_string().contains("/en/get-started"));
    }

    #[tokio::test]
    async fn test_mini_toc_failure_propagates() {
        let orchestrator = RenderOrchestrator::new(
            Arc::new(FakeRenderer::default()),
            Arc::new(FakeMiniToc {
                fail: true,
                ..FakeMiniToc::default()
            }),
            OrchestratorConfig::default(),
        );
        let page = Page {
            show_mini_toc: true,
            ..sample_page()
        };
        let mut headers = HeaderMap::new();

        let err = orchestrator
            .handle(
                &get("/en/get-started"),
                context(Some(page)),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MiniToc { .. }));
    }

    #[tokio::test]
    async fn test_debug_deep_reference() {
        let h = harness(ExecutionMode::Development);
        let request = get("/en/get-started").with_query("json", "page.fullTitle");
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &request,
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        match action {
            Some(TerminalAction::RespondJson(payload)) => {
                assert_eq!(payload, json!("Get started - GitHub Docs"));
            }
            other => panic!("expected RespondJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_debug_unknown_path_is_null() {
        let h = harness(ExecutionMode::Test);
        let request = get("/en/get-started").with_query("json", "nonexistent.path");
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &request,
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        assert!(matches!(action, Some(TerminalAction::RespondJson(Value::Null))));
    }

    #[tokio::test]
    async fn test_debug_shallow_listing() {
        let h = harness(ExecutionMode::Development);
        let request = get("/en/get-started").with_query("json", "");
        let mut headers = HeaderMap::new();

        let action = h
            .orchestrator
            .handle(
                &request,
                context(Some(sample_page())),
                &mut headers,
                &DisconnectFlag::new(),
            )
            .await
            .unwrap();

        let Some(TerminalAction::RespondJson(payload)) = action else {
            panic!("expected RespondJson");
        };
        let keys: Vec<&str> = payload["keys"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(keys.contains(&"page"));
        assert!(keys.contains(&"renderedPage"));
        assert!(payload.get("page").is_none());
    }

    #[tokio::test]
    async fn test_debug_unreachable_in_production() {
        let h = harness(ExecutionMode::Production);
        for query in ["", "page.title"] {
            let request = get("/en/get-started").with_query("json", query);
            let mut headers = HeaderMap::new();

            let action = h
                .orchestrator
                .handle(
                    &request,
                    context(Some(sample_page())),
                    &mut headers,
                    &DisconnectFlag::new(),
                )
                .await
                .unwrap();

            expect_delegate(action);
        }
    }

    #[test]
    fn test_http_date_format() {
        let date = Utc.with_ymd_and_hms(2022, 1, 9, 8, 5, 3).unwrap();
        assert_eq!(http_date(&date), "Sun, 09 Jan 2022 08:05:03 GMT");
    }
}
