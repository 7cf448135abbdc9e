//! `rw serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use rw_config::{CliSettings, Config, ExecutionMode};
use rw_server::{run_server, server_config_from_rw_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding `content/` and `data/` (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Execution mode: production, development or test (overrides config).
    #[arg(long)]
    mode: Option<ExecutionMode>,

    /// Enable verbose output (page load and render timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
            mode: self.mode,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.field(
            "Server",
            &format!("http://{}:{}", config.server.host, config.server.port),
        );
        output.field(
            "Source directory",
            &config.docs_resolved.source_dir.display().to_string(),
        );
        output.field("Mode", &config.mode.to_string());
        output.field(
            "Languages",
            &config
                .site
                .languages
                .iter()
                .map(|l| l.code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );

        if !config.docs_resolved.content_dir().is_dir() {
            output.warning(&format!(
                "Content directory not found: {} (every page will be 404)",
                config.docs_resolved.content_dir().display()
            ));
        }
        if !config.mode.is_production() {
            output.info("Debug introspection enabled: append ?json to any page URL");
        }

        let server_config = server_config_from_rw_config(&config, version.to_owned());
        output.success("Starting server (Ctrl-C to stop)");
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
