//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `server.mode`
//! - `site.brand`
//! - `site.header_suffix`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override execution mode.
    pub mode: Option<ExecutionMode>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Execution mode of the running process.
///
/// Resolved once at startup. Gates diagnostics that must never be reachable
/// in production.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Public deployment.
    Production,
    /// Local authoring server.
    #[default]
    Development,
    /// Automated test runs.
    Test,
}

impl ExecutionMode {
    /// Whether this is the production mode.
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl FromStr for ExecutionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::Validation(format!(
                "server.mode must be one of production, development, test (got \"{other}\")"
            ))),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
        };
        f.write_str(name)
    }
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Documentation configuration (paths are relative strings from TOML).
    #[serde(default)]
    docs: DocsConfigRaw,
    /// Site-wide presentation settings.
    pub site: SiteConfig,
    /// Cache-Control policy settings.
    pub cache: CacheConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved execution mode (set after loading).
    #[serde(skip)]
    pub mode: ExecutionMode,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    #[allow(clippy::derivable_impls)]
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Execution mode as written in the file (see [`Config::mode`] for the parsed value).
    pub mode: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            mode: "development".to_owned(),
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory holding `content/` and `data/`.
    pub source_dir: PathBuf,
}

impl DocsConfig {
    /// Markdown content directory (`<source>/content`).
    #[must_use]
    pub fn content_dir(&self) -> PathBuf {
        self.source_dir.join("content")
    }

    /// Site data directory (`<source>/data`).
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.source_dir.join("data")
    }
}

/// A language the site is published in.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Two-letter code used as the first URL segment.
    pub code: String,
    /// English name.
    pub name: String,
    /// Name in the language itself.
    #[serde(default)]
    pub native_name: Option<String>,
}

/// Site-wide presentation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Language used when the URL carries none.
    pub default_language: String,
    /// Flagship version id; pages under it get the plain site suffix.
    pub default_version: String,
    /// Product brand word prefixed to version titles lacking it.
    pub brand: String,
    /// Localized `<title>` suffix for default-version pages.
    pub header_suffix: String,
    /// Published languages.
    pub languages: Vec<LanguageConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_owned(),
            default_version: "free-pro-team@latest".to_owned(),
            brand: "GitHub".to_owned(),
            header_suffix: "GitHub Docs".to_owned(),
            languages: vec![LanguageConfig {
                code: "en".to_owned(),
                name: "English".to_owned(),
                native_name: None,
            }],
        }
    }
}

/// Cache-Control policy settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL in seconds for rendered HTML pages. Zero disables caching.
    pub html_max_age: u64,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.mode`").
        field: String,
        /// Error message (e.g., "${`RW_MODE`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a language code to be two lowercase ASCII letters.
fn require_language_code(code: &str, field: &str) -> Result<(), ConfigError> {
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(ConfigError::Validation(format!(
            "{field} must be two lowercase letters (got \"{code}\")"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(mode) = settings.mode {
            self.mode = mode;
            self.server.mode = mode.to_string();
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            site: SiteConfig::default(),
            cache: CacheConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
            },
            mode: ExecutionMode::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_site()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        let site = &self.site;
        require_non_empty(&site.default_version, "site.default_version")?;
        require_non_empty(&site.brand, "site.brand")?;
        require_non_empty(&site.header_suffix, "site.header_suffix")?;

        if site.languages.is_empty() {
            return Err(ConfigError::Validation(
                "site.languages must list at least one language".to_owned(),
            ));
        }
        for language in &site.languages {
            require_language_code(&language.code, "site.languages.code")?;
            require_non_empty(&language.name, "site.languages.name")?;
        }

        require_language_code(&site.default_language, "site.default_language")?;
        if !site
            .languages
            .iter()
            .any(|l| l.code == site.default_language)
        {
            return Err(ConfigError::Validation(format!(
                "site.default_language \"{}\" is not listed in site.languages",
                site.default_language
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.server.mode = expand::expand_env(&self.server.mode, "server.mode")?;
        self.site.brand = expand::expand_env(&self.site.brand, "site.brand")?;
        self.site.header_suffix =
            expand::expand_env(&self.site.header_suffix, "site.header_suffix")?;
        Ok(())
    }

    /// Resolve relative paths and parse the execution mode.
    fn resolve(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
        };
        self.mode = self.server.mode.parse()?;
        Ok(())
    }
}
