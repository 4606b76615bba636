//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub cdek: CdekConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub token_cache: TokenCacheConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Upstream provider credentials and location
#[derive(Clone, Deserialize, Serialize)]
pub struct CdekConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call deadline; no deadline when unset
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

// Keeps the secret out of logs and panic messages.
impl std::fmt::Debug for CdekConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdekConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl CdekConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn default_base_url() -> String {
    "https://api.cdek.ru/v2".to_string()
}

/// Gateway behavior switches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Copy `x-` headers from the upstream response onto the client response
    #[serde(default)]
    pub forward_upstream_headers: bool,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            forward_upstream_headers: false,
            cors_enabled: true,
        }
    }
}

/// Access token reuse. Off unless explicitly enabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenCacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_max_ttl")]
    pub max_ttl_secs: u64,
    #[serde(default = "default_refresh_margin")]
    pub refresh_margin_secs: u64,
}

fn default_max_ttl() -> u64 {
    3600
}

fn default_refresh_margin() -> u64 {
    30
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_ttl_secs: default_max_ttl(),
            refresh_margin_secs: default_refresh_margin(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    50
}

fn default_burst() -> u32 {
    100
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_str().ok_or_else(|| {
            AppError::Config(config::ConfigError::Message(
                "Configuration path is not valid UTF-8".to_string(),
            ))
        })?;

        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("cdek.base_url", default_base_url())?
            .set_default("rate_limit.enabled", true)?
            .set_default("rate_limit.requests_per_second", i64::from(default_rps()))?
            .set_default("rate_limit.burst_size", i64::from(default_burst()))?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(File::with_name(path).required(false))
            // Override with environment variables (prefixed with CDEK_GATEWAY_)
            .add_source(
                Environment::with_prefix("CDEK_GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(config_error("Server port cannot be 0"));
        }

        if self.cdek.client_id.trim().is_empty() {
            return Err(config_error("cdek.client_id must be set"));
        }
        if self.cdek.client_secret.trim().is_empty() {
            return Err(config_error("cdek.client_secret must be set"));
        }
        if !self.cdek.base_url.starts_with("http://") && !self.cdek.base_url.starts_with("https://") {
            return Err(config_error(format!(
                "cdek.base_url '{}' must be an http(s) URL",
                self.cdek.base_url
            )));
        }

        if self.rate_limit.enabled && self.rate_limit.requests_per_second == 0 {
            return Err(config_error("rate_limit.requests_per_second cannot be 0"));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(config_error(format!(
                "logging.format '{}' must be 'json' or 'pretty'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError::Config(config::ConfigError::Message(message.into()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            cdek: CdekConfig::new("", ""),
            gateway: GatewayConfig::default(),
            token_cache: TokenCacheConfig::default(),
            rate_limit: RateLimitConfig {
                enabled: true,
                requests_per_second: default_rps(),
                burst_size: default_burst(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
