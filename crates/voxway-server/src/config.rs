//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use voxway_types::GatewayPolicy;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Provider wiring.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Quota limits per tier.
    #[serde(default)]
    pub quota: QuotaConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "voxway_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Provider wiring: which concrete providers get registered and which is
/// the default per role. API keys come from the environment, never the
/// config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Default provider name per role; `None` keeps the first registered.
    #[serde(default)]
    pub stt_default: Option<String>,
    #[serde(default)]
    pub ai_default: Option<String>,
    #[serde(default)]
    pub tts_default: Option<String>,

    /// Base URL for the OpenAI-compatible HTTP providers.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Chat model for the AI role.
    #[serde(default = "default_ai_model")]
    pub ai_model: String,

    /// Local whisper.cpp wiring; both must be set to register the provider.
    #[serde(default)]
    pub whisper_cpp_binary: Option<String>,
    #[serde(default)]
    pub whisper_cpp_model: Option<String>,

    /// Local piper wiring; both must be set to register the provider.
    #[serde(default)]
    pub piper_binary: Option<String>,
    #[serde(default)]
    pub piper_model: Option<String>,
}

/// Per-tier daily limits.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    #[serde(default = "default_free_limit")]
    pub free_daily_limit: u32,
    #[serde(default = "default_professional_limit")]
    pub professional_daily_limit: u32,
    #[serde(default = "default_enterprise_limit")]
    pub enterprise_daily_limit: u32,
}

impl QuotaConfig {
    /// Converts into the policy the ledger enforces.
    pub fn to_policy(&self) -> GatewayPolicy {
        GatewayPolicy {
            free_daily_limit: self.free_daily_limit,
            professional_daily_limit: self.professional_daily_limit,
            enterprise_daily_limit: self.enterprise_daily_limit,
            ..GatewayPolicy::default()
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    4400
}

fn default_db_path() -> String {
    "voxway.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_free_limit() -> u32 {
    20
}

fn default_professional_limit() -> u32 {
    200
}

fn default_enterprise_limit() -> u32 {
    2000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            stt_default: None,
            ai_default: None,
            tts_default: None,
            openai_base_url: default_openai_base_url(),
            ai_model: default_ai_model(),
            whisper_cpp_binary: None,
            whisper_cpp_model: None,
            piper_binary: None,
            piper_model: None,
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_daily_limit: default_free_limit(),
            professional_daily_limit: default_professional_limit(),
            enterprise_daily_limit: default_enterprise_limit(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `VOXWAY_HOST` overrides `server.host`
/// - `VOXWAY_PORT` overrides `server.port`
/// - `VOXWAY_DB_PATH` overrides `database.path`
/// - `VOXWAY_LOG_LEVEL` overrides `logging.level`
/// - `VOXWAY_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `VOXWAY_OPENAI_BASE_URL` overrides `providers.openai_base_url`
///
/// The API key for HTTP providers is read separately from
/// `VOXWAY_OPENAI_API_KEY` at registry build time and is never part of
/// this structure.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Ok(host) = std::env::var("VOXWAY_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("VOXWAY_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("VOXWAY_DB_PATH") {
        config.database.path = db_path;
    }
    if let Ok(level) = std::env::var("VOXWAY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("VOXWAY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(base_url) = std::env::var("VOXWAY_OPENAI_BASE_URL") {
        config.providers.openai_base_url = base_url;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.server.port, 4400);
        assert_eq!(config.database.path, "voxway.db");
        assert_eq!(config.quota.free_daily_limit, 20);
        assert_eq!(
            config.providers.openai_base_url,
            "https://api.openai.com/v1"
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9999

            [quota]
            free_daily_limit = 5
            "#,
        )
        .expect("parse");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.quota.free_daily_limit, 5);
        assert_eq!(config.quota.professional_daily_limit, 200);
    }

    #[test]
    fn quota_config_converts_to_policy() {
        let config = QuotaConfig {
            free_daily_limit: 1,
            professional_daily_limit: 2,
            enterprise_daily_limit: 3,
        };
        let policy = config.to_policy();
        assert_eq!(policy.free_daily_limit, 1);
        assert_eq!(policy.professional_daily_limit, 2);
        assert_eq!(policy.enterprise_daily_limit, 3);
        assert_eq!(policy.max_audio_bytes, voxway_types::MAX_AUDIO_BYTES);
    }
}
