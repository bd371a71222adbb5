//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure populated from
//! environment variables (optionally via a `.env` file) or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Frappe backend location and client behaviour.
    pub frappe: FrappeConfig,

    /// Frappe credentials (token pair and legacy login).
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Frappe backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrappeConfig {
    /// Base URL of the Frappe site, e.g. `https://erp.example.com`.
    pub url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Credentials used to talk to Frappe.
///
/// The API key/secret pair is the canonical way to authenticate. The
/// username/password pair drives the legacy session login.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Which part of the token pair is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCredential {
    ApiKey,
    ApiSecret,
    ApiKeyAndSecret,
    Login,
}

impl std::fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "API key (FRAPPE_API_KEY) is not configured"),
            Self::ApiSecret => write!(f, "API secret (FRAPPE_API_SECRET) is not configured"),
            Self::ApiKeyAndSecret => write!(
                f,
                "API key and secret (FRAPPE_API_KEY, FRAPPE_API_SECRET) are not configured"
            ),
            Self::Login => write!(
                f,
                "username and password (FRAPPE_USERNAME, FRAPPE_PASSWORD) are not configured"
            ),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl CredentialsConfig {
    /// Report which half of the token pair is missing, if any.
    pub fn missing_token_credential(&self) -> Option<MissingCredential> {
        match (present(&self.api_key), present(&self.api_secret)) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(MissingCredential::ApiKey),
            (Some(_), None) => Some(MissingCredential::ApiSecret),
            (None, None) => Some(MissingCredential::ApiKeyAndSecret),
        }
    }

    /// The `(key, secret)` pair when both halves are set.
    pub fn token_pair(&self) -> Option<(&str, &str)> {
        Some((present(&self.api_key)?, present(&self.api_secret)?))
    }

    /// The `(username, password)` pair when both halves are set.
    pub fn login_pair(&self) -> Option<(&str, &str)> {
        Some((present(&self.username)?, present(&self.password)?))
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CredentialsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

impl Default for FrappeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "frappe-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            frappe: FrappeConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_TRANSPORT`); the backend uses the `FRAPPE_`
    /// prefix (`FRAPPE_URL`, `FRAPPE_API_KEY`, `FRAPPE_API_SECRET`,
    /// `FRAPPE_USERNAME`, `FRAPPE_PASSWORD`, `FRAPPE_TIMEOUT_SECS`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        if let Ok(url) = std::env::var("FRAPPE_URL") {
            config.frappe.url = url;
        }

        if let Ok(timeout) = std::env::var("FRAPPE_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.frappe.timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid FRAPPE_TIMEOUT_SECS value: {}", timeout),
            }
        }

        config.credentials = CredentialsConfig {
            api_key: std::env::var("FRAPPE_API_KEY").ok(),
            api_secret: std::env::var("FRAPPE_API_SECRET").ok(),
            username: std::env::var("FRAPPE_USERNAME").ok(),
            password: std::env::var("FRAPPE_PASSWORD").ok(),
        };

        config
    }

    /// Log which authentication channel will be used.
    ///
    /// Kept out of [`Config::from_env`], which runs before logging is set up.
    pub fn log_credential_status(&self) {
        match self.credentials.missing_token_credential() {
            None => info!("Using API key/secret authentication"),
            Some(missing) if self.credentials.login_pair().is_some() => {
                warn!("{}; falling back to username/password login", missing)
            }
            Some(missing) => {
                warn!("{}; backend calls will fail until credentials are set", missing)
            }
        }
    }
}
