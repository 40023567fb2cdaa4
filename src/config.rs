use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::FLIGHT_OPTIONS_KIND;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub database: Option<DatabaseSettings>,
    pub appwrite: Option<AppwriteSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which content store backs the lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Appwrite,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    /// JSON snapshot used by the memory backend
    #[serde(default = "default_fixture_path")]
    pub fixture_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            fixture_path: default_fixture_path(),
        }
    }
}

fn default_backend() -> StoreBackend { StoreBackend::Memory }
fn default_fixture_path() -> String { "fixtures/flight_options.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub bucket_id: String,
    #[serde(default)]
    pub collections: CollectionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    #[serde(default = "default_flight_options_collection")]
    pub flight_options: String,
    #[serde(default = "default_airports_collection")]
    pub airports: String,
    #[serde(default = "default_benefits_collection")]
    pub benefits: String,
    #[serde(default = "default_currencies_collection")]
    pub currencies: String,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            flight_options: default_flight_options_collection(),
            airports: default_airports_collection(),
            benefits: default_benefits_collection(),
            currencies: default_currencies_collection(),
        }
    }
}

fn default_flight_options_collection() -> String { FLIGHT_OPTIONS_KIND.to_string() }
fn default_airports_collection() -> String { "airports".to_string() }
fn default_benefits_collection() -> String { "benefits".to_string() }
fn default_currencies_collection() -> String { "currencies".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Server-side response cache; the Cache-Control header is sent regardless
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u32,
    pub l1_cache_size: Option<u64>,
    pub redis_url: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_age_secs: default_max_age_secs(),
            l1_cache_size: None,
            redis_url: None,
        }
    }
}

fn default_max_age_secs() -> u32 { 900 }

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

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with FLIGHT_OPTIONS__)
    /// 5. DATABASE_URL, when set
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., FLIGHT_OPTIONS__SERVER__PORT -> server.port
            .add_source(environment());

        let builder = match std::env::var("DATABASE_URL") {
            Ok(url) => builder.set_override("database.url", url)?,
            Err(_) => builder,
        };

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("FLIGHT_OPTIONS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
