//! HTTP server for RW documentation pages.
//!
//! Serves every path through the `rw-pages` pipeline:
//!
//! ```text
//! Browser ──HTTP──► axum router (rw-server)
//!                        │
//!                        ├─► Site::resolve ──► RenderContext
//!                        │
//!                        ├─► spawned RenderOrchestrator::handle
//!                        │       (polls a DisconnectFlag held by the handler)
//!                        │
//!                        └─► TerminalAction ──► 404 / empty / JSON / HTML document
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use rw_server::{run_server, server_config_from_rw_config};
//!
//! let config = rw_config::Config::load(None, None)?;
//! run_server(server_config_from_rw_config(&config, "1.0.0".to_owned())).await?;
//! ```

mod app;
mod document;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use rw_pages::{CachePolicies, Language, OrchestratorConfig, RenderOrchestrator};
use rw_site::{HeadingExtractor, MarkdownPageRenderer, Site, SiteConfig};

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Content and site settings.
    pub site: SiteConfig,
    /// Pipeline settings (mode, cache policies, title composition).
    pub orchestrator: OrchestratorConfig,
    /// Application version (part of the `ETag`).
    pub version: String,
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if content fails to load or the listener cannot bind.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let site = Site::load(config.site)?;
    let state = Arc::new(AppState::new(site, config.orchestrator, config.version));

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from RW config.
#[must_use]
pub fn server_config_from_rw_config(config: &rw_config::Config, version: String) -> ServerConfig {
    let languages = config
        .site
        .languages
        .iter()
        .map(|l| Language {
            code: l.code.clone(),
            name: l.name.clone(),
            native_name: l.native_name.clone(),
        })
        .collect();

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        site: SiteConfig {
            content_dir: config.docs_resolved.content_dir(),
            data_dir: config.docs_resolved.data_dir(),
            default_language: config.site.default_language.clone(),
            default_version: config.site.default_version.clone(),
            header_suffix: config.site.header_suffix.clone(),
            languages,
        },
        orchestrator: OrchestratorConfig {
            mode: config.mode,
            policies: CachePolicies::new(config.cache.html_max_age),
            default_version: config.site.default_version.clone(),
            brand: config.site.brand.clone(),
        },
        version,
    }
}

/// Build the pipeline with the markdown renderer and heading extractor.
fn default_orchestrator(config: OrchestratorConfig) -> RenderOrchestrator {
    RenderOrchestrator::new(
        Arc::new(MarkdownPageRenderer::new()),
        Arc::new(HeadingExtractor::new()),
        config,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rw_pages::ExecutionMode;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_server_config_from_rw_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("rw.toml");
        std::fs::write(
            &config_path,
            "[server]\nmode = \"production\"\n\n[cache]\nhtml_max_age = 3600\n",
        )
        .unwrap();
        let config = rw_config::Config::load(Some(config_path.as_path()), None).unwrap();

        let server_config = server_config_from_rw_config(&config, "1.2.3".to_owned());

        assert_eq!(server_config.host, config.server.host);
        assert_eq!(server_config.port, config.server.port);
        assert_eq!(server_config.version, "1.2.3");
        assert_eq!(server_config.site.content_dir, config.docs_resolved.content_dir());
        assert_eq!(server_config.site.languages.len(), config.site.languages.len());
        assert_eq!(server_config.orchestrator.mode, ExecutionMode::Production);
        assert_eq!(
            server_config.orchestrator.policies.html.directive(),
            "public, max-age=3600, stale-while-revalidate=3600, stale-if-error=86400"
        );
    }
}
