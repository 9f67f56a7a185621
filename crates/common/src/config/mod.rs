//! Configuration management for Curatly services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Museum API configuration
    #[serde(default)]
    pub museums: MuseumsConfig,

    /// Search and pagination tuning
    #[serde(default)]
    pub search: SearchConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MuseumsConfig {
    #[serde(default)]
    pub met: MetConfig,

    #[serde(default)]
    pub aic: AicConfig,
}

/// Metropolitan Museum of Art collection API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetConfig {
    #[serde(default = "default_met_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_museum_timeout")]
    pub timeout_secs: u64,

    /// Retries for rate-limited search requests
    #[serde(default = "default_met_retries")]
    pub max_retries: u32,

    /// First retry delay; doubles on every attempt
    #[serde(default = "default_met_retry_delay")]
    pub retry_base_delay_ms: u64,

    /// Upper bound on ids accepted by the by-ids endpoint
    #[serde(default = "default_max_ids")]
    pub max_ids_per_request: usize,
}

/// Art Institute of Chicago API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AicConfig {
    #[serde(default = "default_aic_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_museum_timeout")]
    pub timeout_secs: u64,

    /// IIIF image service used when a response carries no config block
    #[serde(default = "default_iiif_url")]
    pub default_iiif_url: String,

    /// Public website, used for artwork links
    #[serde(default = "default_aic_website")]
    pub website_url: String,

    /// Width requested from the IIIF image service
    #[serde(default = "default_image_width")]
    pub image_width: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Query used when the caller leaves the search box empty
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Page size when `limit` is omitted
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Met ids fetched per sub-batch
    #[serde(default = "default_met_batch_size")]
    pub met_batch_size: usize,

    /// Sub-batch attempts allowed per page, as a multiple of `limit`
    #[serde(default = "default_met_attempt_factor")]
    pub met_attempt_factor: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret the hosted auth backend signs session tokens with.
    /// Without it every request is treated as anonymous.
    pub jwt_secret: Option<String>,

    /// Expected `aud` claim
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_database_url() -> String { "postgres://localhost/curatly".to_string() }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_met_base_url() -> String { "https://collectionapi.metmuseum.org/public/collection/v1".to_string() }
fn default_aic_base_url() -> String { "https://api.artic.edu/api/v1".to_string() }
fn default_museum_timeout() -> u64 { 15 }
fn default_met_retries() -> u32 { 3 }
fn default_met_retry_delay() -> u64 { 500 }
fn default_max_ids() -> usize { 50 }
fn default_iiif_url() -> String { "https://www.artic.edu/iiif/2".to_string() }
fn default_aic_website() -> String { "https://www.artic.edu".to_string() }
fn default_image_width() -> u32 { 843 }
fn default_query() -> String { "art".to_string() }
fn default_limit() -> u32 { 20 }
fn default_met_batch_size() -> usize { 5 }
fn default_met_attempt_factor() -> usize { 3 }
fn default_jwt_audience() -> String { "authenticated".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "curatly".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

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
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            read_url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for MetConfig {
    fn default() -> Self {
        Self {
            base_url: default_met_base_url(),
            timeout_secs: default_museum_timeout(),
            max_retries: default_met_retries(),
            retry_base_delay_ms: default_met_retry_delay(),
            max_ids_per_request: default_max_ids(),
        }
    }
}

impl Default for AicConfig {
    fn default() -> Self {
        Self {
            base_url: default_aic_base_url(),
            timeout_secs: default_museum_timeout(),
            default_iiif_url: default_iiif_url(),
            website_url: default_aic_website(),
            image_width: default_image_width(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_query: default_query(),
            default_limit: default_limit(),
            met_batch_size: default_met_batch_size(),
            met_attempt_factor: default_met_attempt_factor(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_audience: default_jwt_audience(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            museums: MuseumsConfig::default(),
            search: SearchConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.search.default_limit, 20);
        assert_eq!(config.search.met_batch_size, 5);
        assert_eq!(config.museums.aic.image_width, 843);
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_read_database_fallback() {
        let config = AppConfig::default();
        assert_eq!(config.read_database_url(), "postgres://localhost/curatly");
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "port": 3000 },
            "museums": { "met": { "max_retries": 5 } }
        }))
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.museums.met.max_retries, 5);
        assert_eq!(config.museums.met.retry_base_delay_ms, 500);
        assert_eq!(config.museums.aic.base_url, "https://api.artic.edu/api/v1");
    }
}
