//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `CATALOG_API_URL` - Catalog API base URL
//!   (default: <https://openapi.programming-hero.com/api>)
//! - `CATALOG_TIMEOUT_SECS` - Per-request timeout for catalog calls (default: 10)
//! - `CATALOG_CACHE_TTL_SECS` - TTL for cached categories and product details (default: 300)
//! - `SESSION_IDLE_SECS` - Idle time after which a page session is dropped (default: 1800)
//! - `SESSION_MAX` - Open page sessions kept before the least recently used
//!   is evicted (default: 10000)
//! - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default catalog API base URL.
pub const DEFAULT_CATALOG_API_URL: &str = "https://openapi.programming-hero.com/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Page session limits
    pub sessions: SessionConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., production, staging)
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// TTL for cached categories and product details
    pub cache_ttl: Duration,
}

/// Page session limits.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Idle time after which a session expires
    pub idle: Duration,
    /// Open sessions kept before the least recently used is evicted
    pub max_sessions: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(1800),
            max_sessions: 10_000,
        }
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_sessions = parse_env_or_default("SESSION_MAX", 10_000_u64)?;
        if max_sessions == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_MAX".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            idle: get_secs_or_default("SESSION_IDLE_SECS", 1800)?,
            max_sessions,
        })
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_url(),
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or_default("STOREFRONT_PORT", 3000_u16)?;
        let catalog = CatalogConfig::from_env()?;
        let sessions = SessionConfig::from_env()?;
        let log_format = parse_env_or_default("LOG_FORMAT", LogFormat::Pretty)?;

        Ok(Self {
            host,
            port,
            catalog,
            sessions,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = match get_optional_env("CATALOG_API_URL") {
            Some(raw) => parse_base_url(&raw)
                .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_API_URL".to_string(), e))?,
            None => default_catalog_url(),
        };

        Ok(Self {
            base_url,
            timeout: get_secs_or_default("CATALOG_TIMEOUT_SECS", 10)?,
            cache_ttl: get_secs_or_default("CATALOG_CACHE_TTL_SECS", 300)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a catalog base URL, forcing a trailing slash so relative endpoint
/// paths join under it rather than replacing its last segment.
///
/// # Errors
///
/// Returns a message if the URL is malformed or not http(s).
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn default_catalog_url() -> Url {
    // Constant input; a parse failure here is a programming error.
    #[allow(clippy::expect_used)]
    parse_base_url(DEFAULT_CATALOG_API_URL).expect("default catalog URL is valid")
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Read a whole number of seconds; zero is rejected.
fn get_secs_or_default(key: &str, default: u64) -> Result<Duration, ConfigError> {
    let secs = parse_env_or_default(key, default)?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
