// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact mailer.
//!
//! Values come from the process environment (optionally seeded from a
//! `.env` file by the binary). Defaults match the deployed portfolio
//! backend: five submissions per client per hour, Gmail transport.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Paths served by the API itself.
pub const RESERVED_PATHS: &[&str] = &["/api/health", "/api/test", "/api/send-email"];

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Configuration for the contact mailer service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:3001)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum accepted request body size in bytes (default: 10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Outbound mail configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Sliding window admission policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum admitted submissions per client inside the window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds (default: one hour)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Interval between sweeps of idle client keys, in seconds (default: 300)
    #[serde(default = "default_cleanup_secs")]
    pub cleanup_interval_secs: u64,
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Mail service selector (`gmail`, `outlook`, ..., or `console`)
    #[serde(default = "default_service")]
    pub service: String,

    /// Account user, also used as the sender address
    #[serde(default)]
    pub user: Option<String>,

    /// Account password or app password
    #[serde(default)]
    pub password: Option<String>,

    /// Address that receives owner notifications
    #[serde(default)]
    pub owner_email: Option<String>,

    /// Explicit SMTP host, overriding the service table
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// Explicit SMTP port, overriding the service table
    #[serde(default)]
    pub smtp_port: Option<u16>,
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed frontend origin, or `*` (default: `*`)
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    60 * 60 * 1000
}

fn default_cleanup_secs() -> u64 {
    300
}

fn default_service() -> String {
    "gmail".to_string()
}

fn default_frontend_url() -> String {
    "*".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            cors: CorsConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            cleanup_interval_secs: default_cleanup_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            service: default_service(),
            user: None,
            password: None,
            owner_email: None,
            smtp_host: None,
            smtp_port: None,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the sliding window duration
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Get the idle-key sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MailConfig {
    /// Whether the selector picks the log-only dispatcher.
    pub fn is_console(&self) -> bool {
        self.service.eq_ignore_ascii_case("console")
    }

    /// Owner notification address, falling back to the account user.
    pub fn owner_address(&self) -> Option<&str> {
        self.owner_email.as_deref().or(self.user.as_deref())
    }
}

impl CorsConfig {
    /// Whether any origin is accepted.
    pub fn allows_any_origin(&self) -> bool {
        self.frontend_url.trim() == "*"
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set keys that fail to parse are
    /// reported rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(port) = get("PORT") {
            let port: u16 = parse_value("PORT", &port)?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = get("MAX_BODY_BYTES") {
            config.max_body_bytes = parse_value("MAX_BODY_BYTES", &v)?;
        }

        if let Some(v) = get("RATE_LIMIT_MAX") {
            config.rate_limit.max_requests = parse_value("RATE_LIMIT_MAX", &v)?;
        }
        if let Some(v) = get("RATE_LIMIT_WINDOW_MS") {
            config.rate_limit.window_ms = parse_value("RATE_LIMIT_WINDOW_MS", &v)?;
        }
        if let Some(v) = get("RATE_LIMIT_CLEANUP_SECS") {
            config.rate_limit.cleanup_interval_secs = parse_value("RATE_LIMIT_CLEANUP_SECS", &v)?;
        }

        if let Some(service) = get("EMAIL_SERVICE") {
            config.mail.service = service.trim().to_lowercase();
        }
        config.mail.user = get("EMAIL_USER");
        config.mail.password = get("EMAIL_PASS");
        config.mail.owner_email = get("OWNER_EMAIL");
        config.mail.smtp_host = get("SMTP_HOST");
        if let Some(v) = get("SMTP_PORT") {
            config.mail.smtp_port = Some(parse_value("SMTP_PORT", &v)?);
        }

        if let Some(origin) = get("FRONTEND_URL") {
            config.cors.frontend_url = origin.trim().to_string();
        }

        if let Some(v) = get("METRICS_ENABLED") {
            config.metrics.enabled = parse_value("METRICS_ENABLED", &v)?;
        }
        if let Some(path) = get("METRICS_PATH") {
            config.metrics.path = path;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: self.bind_addr.clone(),
            })?;

        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_MAX",
                value: "0".to_string(),
            });
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_CLEANUP_SECS",
                value: "0".to_string(),
            });
        }
        if self.rate_limit.window_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_WINDOW_MS",
                value: "0".to_string(),
            });
        }

        if !self.mail.is_console() {
            if self.mail.user.is_none() {
                return Err(ConfigError::Missing("EMAIL_USER"));
            }
            if self.mail.password.is_none() {
                return Err(ConfigError::Missing("EMAIL_PASS"));
            }
        }

        if !self.cors.allows_any_origin() {
            let valid = Url::parse(&self.cors.frontend_url)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::Invalid {
                    key: "FRONTEND_URL",
                    value: self.cors.frontend_url.clone(),
                });
            }
        }

        let metrics_path = self.metrics.path.trim_end_matches('/');
        if !self.metrics.path.starts_with('/') || RESERVED_PATHS.contains(&metrics_path) {
            return Err(ConfigError::Invalid {
                key: "METRICS_PATH",
                value: self.metrics.path.clone(),
            });
        }

        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
