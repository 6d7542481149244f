use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_FAILURE_RETRY_SECS, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_MIN_REFRESH_SECS,
    DEFAULT_SAFETY_MARGIN_SECS,
};

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub token: TokenRefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

/// `["*"]` allows every origin; credentials stay permitted either way.
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origins")]
    pub allow_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allow_origins: default_allow_origins() }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|origin| origin == "*")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    /// applies to the token endpoint and to every geolocation call
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { timeout_ms: default_timeout_ms() }
    }
}

/// ================================
/// Token lifecycle
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct TokenRefreshConfig {
    /// refresh this many seconds before the provider-declared expiry
    #[serde(default = "default_safety_margin")]
    pub safety_margin_seconds: u64,
    /// lower bound for the refresh delay, guards zero/negative `expires_in`
    #[serde(default = "default_min_refresh")]
    pub min_refresh_seconds: u64,
    /// delay before the next attempt after a failed refresh
    #[serde(default = "default_failure_retry")]
    pub failure_retry_seconds: u64,
    #[serde(default)]
    pub startup_retry: RetryConfig,
}

impl Default for TokenRefreshConfig {
    fn default() -> Self {
        Self {
            safety_margin_seconds: default_safety_margin(),
            min_refresh_seconds: default_min_refresh(),
            failure_retry_seconds: default_failure_retry(),
            startup_retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// invariant: >= base_delay_ms
    pub max_delay_ms: Option<u64>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> String {
    "8000".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_allow_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_safety_margin() -> u64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

fn default_min_refresh() -> u64 {
    DEFAULT_MIN_REFRESH_SECS
}

fn default_failure_retry() -> u64 {
    DEFAULT_FAILURE_RETRY_SECS
}
