//! Configuration management for the attendance desk
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Page host configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Attendance backend configuration
    #[serde(default)]
    pub backend: BackendConfig,

    /// Report generation configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Notification banner timing
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend provider: http, mock
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Origin of the attendance API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix appended to the origin
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// When to regenerate the report after a mutation: inline, deferred
    #[serde(default = "default_refresh")]
    pub refresh: String,

    /// Delay before a deferred refresh
    #[serde(default = "default_refresh_delay")]
    pub refresh_delay_ms: u64,

    /// Delay before the first report after page start
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Maximum summary requests in flight per list (1 = sequential)
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Time a banner stays fully visible
    #[serde(default = "default_visible")]
    pub visible_ms: u64,

    /// Fade-out transition length
    #[serde(default = "default_fade")]
    pub fade_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full EnvFilter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

/// How the controller regenerates the report after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Await the refresh right after the mutation
    Inline,
    /// Leave a pending refresh for the host to run after the delay
    Deferred(Duration),
}

/// Banner lifetime split into the visible part and the fade-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeTiming {
    pub visible: Duration,
    pub fade: Duration,
}

impl Default for NoticeTiming {
    fn default() -> Self {
        Self {
            visible: Duration::from_millis(default_visible()),
            fade: Duration::from_millis(default_fade()),
        }
    }
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8003 }
fn default_provider() -> String { "http".to_string() }
fn default_base_url() -> String { "http://127.0.0.1:8002".to_string() }
fn default_api_prefix() -> String { crate::DEFAULT_API_PREFIX.to_string() }
fn default_timeout() -> u64 { 30 }
fn default_refresh() -> String { "inline".to_string() }
fn default_refresh_delay() -> u64 { 500 }
fn default_initial_delay() -> u64 { 1000 }
fn default_max_in_flight() -> usize { 1 }
fn default_visible() -> u64 { 3000 }
fn default_fade() -> u64 { 300 }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "frequencia-page".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            refresh: default_refresh(),
            refresh_delay_ms: default_refresh_delay(),
            initial_delay_ms: default_initial_delay(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            visible_ms: default_visible(),
            fade_ms: default_fade(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            service_name: default_service_name(),
        }
    }
}

impl BackendConfig {
    /// Full base of every API path (origin + prefix, no trailing slash)
    pub fn api_base(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ReportConfig {
    /// Refresh policy for an arbitrary delay, keeping the configured mode
    pub fn policy_with_delay(&self, delay_ms: u64) -> RefreshPolicy {
        match self.refresh.as_str() {
            "deferred" => RefreshPolicy::Deferred(Duration::from_millis(delay_ms)),
            "inline" => RefreshPolicy::Inline,
            other => {
                tracing::warn!(refresh = other, "Unknown refresh mode, using inline");
                RefreshPolicy::Inline
            }
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__BACKEND__BASE_URL=http://school.local:8002
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Base URL every backend path is appended to
    pub fn api_base(&self) -> String {
        self.backend.api_base()
    }

    /// Policy used after mutations
    pub fn refresh_policy(&self) -> RefreshPolicy {
        self.report.policy_with_delay(self.report.refresh_delay_ms)
    }

    /// Policy used for the first report after start
    pub fn initial_refresh_policy(&self) -> RefreshPolicy {
        self.report.policy_with_delay(self.report.initial_delay_ms)
    }

    /// Banner timing
    pub fn notice_timing(&self) -> NoticeTiming {
        NoticeTiming {
            visible: Duration::from_millis(self.notifications.visible_ms),
            fade: Duration::from_millis(self.notifications.fade_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8003);
        assert_eq!(config.backend.provider, "http");
        assert_eq!(config.report.max_in_flight, 1);
    }

    #[test]
    fn test_api_base_joins_prefix() {
        let config = AppConfig::default();
        assert_eq!(config.api_base(), "http://127.0.0.1:8002/api/v1");

        let backend = BackendConfig {
            base_url: "http://school.local/".to_string(),
            api_prefix: "/api/v1/".to_string(),
            ..BackendConfig::default()
        };
        assert_eq!(backend.api_base(), "http://school.local/api/v1");
        assert_eq!(backend.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_refresh_policy() {
        let mut config = AppConfig::default();
        assert_eq!(config.refresh_policy(), RefreshPolicy::Inline);

        config.report.refresh = "deferred".to_string();
        assert_eq!(
            config.refresh_policy(),
            RefreshPolicy::Deferred(Duration::from_millis(500))
        );
        assert_eq!(
            config.initial_refresh_policy(),
            RefreshPolicy::Deferred(Duration::from_millis(1000))
        );

        config.report.refresh = "sometimes".to_string();
        assert_eq!(config.refresh_policy(), RefreshPolicy::Inline);
    }

    #[test]
    fn test_notice_timing() {
        let timing = AppConfig::default().notice_timing();
        assert_eq!(timing, NoticeTiming::default());
        assert_eq!(timing.visible + timing.fade, Duration::from_millis(3300));
    }
}
