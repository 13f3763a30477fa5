//! # Configuration Settings
//!
//! Defines the configuration structure for the certgate service.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::services::ImportPolicy;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Global configuration snapshot and signer state locations
    #[validate(nested)]
    pub trust: TrustConfig,

    /// Certificate import policy
    pub import: ImportPolicyConfig,
}

impl AppConfig {
    /// Build configuration from `CERTGATE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
            trust: TrustConfig::from_env(),
            import: ImportPolicyConfig::from_env(),
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.trust.snapshot_path.as_os_str().is_empty() {
            return Err(Error::validation("Global configuration snapshot path cannot be empty"));
        }
        if let Some(path) = &self.trust.signer_state_path {
            if path == &self.trust.snapshot_path {
                return Err(Error::validation(
                    "Signer state and global configuration cannot share a file",
                ));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, max = 65535, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Maximum upload size in bytes
    #[validate(range(min = 1024, message = "Max body size must be at least 1KB"))]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            timeout_seconds: 30,
            max_body_size: 256 * 1024,
        }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("CERTGATE_HOST").unwrap_or(defaults.host);

        let port = match std::env::var("CERTGATE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|e| Error::config(format!("Invalid CERTGATE_PORT '{}': {}", value, e)))?,
            Err(_) => defaults.port,
        };

        let timeout_seconds = std::env::var("CERTGATE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        let max_body_size = std::env::var("CERTGATE_MAX_BODY_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_body_size);

        Ok(Self { host, port, timeout_seconds, max_body_size })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "certgate".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: std::env::var("CERTGATE_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: std::env::var("CERTGATE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging: std::env::var("CERTGATE_JSON_LOGGING")
                .map(|s| s.to_lowercase() == "true" || s == "1")
                .unwrap_or(defaults.json_logging),
        }
    }
}

/// Locations of the trust inputs loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrustConfig {
    /// JSON global configuration snapshot
    pub snapshot_path: PathBuf,

    /// JSON token list seeding the in-memory signer; empty signer when unset
    pub signer_state_path: Option<PathBuf>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self { snapshot_path: PathBuf::from("./data/globalconf.json"), signer_state_path: None }
    }
}

impl TrustConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            snapshot_path: std::env::var("CERTGATE_GLOBALCONF_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            signer_state_path: std::env::var("CERTGATE_SIGNER_STATE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

/// Certificate import policy switches
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportPolicyConfig {
    /// Signing certificates must fulfil a pending certificate request
    pub require_csr_for_signing: bool,
}

impl Default for ImportPolicyConfig {
    fn default() -> Self {
        Self { require_csr_for_signing: true }
    }
}

impl ImportPolicyConfig {
    fn from_env() -> Self {
        Self {
            require_csr_for_signing: std::env::var("CERTGATE_REQUIRE_CSR_FOR_SIGNING")
                .map(|s| !(s.eq_ignore_ascii_case("false") || s == "0"))
                .unwrap_or(true),
        }
    }
}

impl From<ImportPolicyConfig> for ImportPolicy {
    fn from(config: ImportPolicyConfig) -> Self {
        ImportPolicy { require_csr_for_signing: config.require_csr_for_signing }
    }
}
