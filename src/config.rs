use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::badges::default_catalog;
use crate::models::Badge;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub rest: Option<RestSettings>,
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub badges: BadgeSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Which data provider backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Postgres,
    Rest,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
        }
    }
}

fn default_provider_kind() -> ProviderKind { ProviderKind::Postgres }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_profiles_table")]
    pub profiles_table: String,
    #[serde(default = "default_swipes_table")]
    pub swipes_table: String,
    #[serde(default = "default_matches_table")]
    pub matches_table: String,
}

fn default_profiles_table() -> String { "profiles".to_string() }
fn default_swipes_table() -> String { "swipes".to_string() }
fn default_matches_table() -> String { "matches".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: default_cache_ttl(),
            l1_cache_size: default_l1_cache_size(),
        }
    }
}

fn default_cache_ttl() -> u64 { 300 }
fn default_l1_cache_size() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize { crate::core::feed::DEFAULT_PAGE_SIZE }

#[derive(Debug, Clone, Deserialize)]
pub struct BadgeSettings {
    /// Overrides the built-in catalog when set
    pub catalog: Option<Vec<Badge>>,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

impl Default for BadgeSettings {
    fn default() -> Self {
        Self {
            catalog: None,
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl BadgeSettings {
    pub fn catalog(&self) -> Vec<Badge> {
        self.catalog.clone().unwrap_or_else(default_catalog)
    }
}

fn default_session_ttl() -> u64 { 3600 }
fn default_max_sessions() -> u64 { 100_000 }

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
    /// 4. Environment variables (prefixed with CAMPUS__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAMPUS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAMPUS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_well_known_env(settings)?.try_deserialize()
    }
}

/// Apply the conventional variable names hosted backends hand out
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(url) = env::var("SUPABASE_URL") {
        builder = builder.set_override("rest.url", url)?;
    }
    if let Ok(key) = env::var("SUPABASE_ANON_KEY") {
        builder = builder.set_override("rest.api_key", key)?;
    }
    if let Ok(secret) = env::var("SUPABASE_JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_minimal_settings_fill_defaults() {
        let settings: Settings = Config::builder()
            .set_override("server.host", "127.0.0.1")
            .unwrap()
            .set_override("server.port", 8080)
            .unwrap()
            .set_override("auth.jwt_secret", "secret")
            .unwrap()
            .set_override("provider.kind", "memory")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.provider.kind, ProviderKind::Memory);
        assert_eq!(settings.feed.page_size, 20);
        assert!(settings.cache.redis_url.is_none());
        assert_eq!(settings.badges.catalog().len(), 7);
        assert!(settings.database.is_none());
    }
}
