use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
    #[serde(default)]
    pub quiz: QuizSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub endpoint: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_ttl_secs: default_idle_ttl_secs(),
        }
    }
}

fn default_max_sessions() -> u64 { 10_000 }
fn default_idle_ttl_secs() -> u64 { 1_800 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizSettings {
    /// TOML quiz definition; the built-in quiz is used when unset
    pub definition_path: Option<String>,
    /// Overrides the gender step named by the quiz definition
    pub gender_step: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

const DEFAULT_CATALOG_ENDPOINT: &str = "https://quiz.loveplay.in.ua/api";

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with QUIZ_)
    /// 5. `CATALOG_URL`, if set
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = with_defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., QUIZ__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("QUIZ")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = with_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("QUIZ")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("catalog.endpoint", DEFAULT_CATALOG_ENDPOINT)
}

/// Let the plain `CATALOG_URL` variable point the service at another catalog
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("CATALOG_URL") {
        Ok(endpoint) if !endpoint.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("catalog.endpoint", endpoint)?
            .build(),
        _ => Ok(settings),
    }
}
