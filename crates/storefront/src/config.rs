//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>);
//!   an `https` URL turns on secure cookies
//! - `STOREFRONT_LOCALE` - Display locale, `ar-EG` or `en` (default: ar-EG)
//! - `STOREFRONT_STORE_NAME` - Store name in order messages (default: Matgar.tech)
//! - `WHATSAPP_RECIPIENT` - Number that receives orders, digits only
//!   (default: 201557219572)
//! - `CART_RESET_DELAY_MS` - Cart reset delay after the link is opened (default: 1500)
//! - `QUICK_RESET_DELAY_MS` - Quick form reset delay (default: 2000)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog JSON (default: built-in catalog)
//! - `SHOPPER_IDLE_MINUTES` - Idle expiry of shopper state and sessions (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use matgar_core::checkout::{
    DEFAULT_CART_RESET_DELAY, DEFAULT_QUICK_RESET_DELAY, DEFAULT_STORE_NAME,
};
use matgar_core::{CheckoutSettings, Locale, RecipientId};
use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Recipient, locale, store name and reset delays
    pub checkout: CheckoutSettings,
    /// Product catalog file; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,
    /// How long an idle shopper's cart and forms are kept
    pub shopper_idle: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Lookup(&lookup);

        let checkout = CheckoutSettings {
            recipient: env.parse_or("WHATSAPP_RECIPIENT", RecipientId::default)?,
            store_name: env.get_or_default("STOREFRONT_STORE_NAME", DEFAULT_STORE_NAME),
            locale: env.parse_or("STOREFRONT_LOCALE", Locale::default)?,
            cart_reset_delay: env.millis_or("CART_RESET_DELAY_MS", DEFAULT_CART_RESET_DELAY)?,
            quick_reset_delay: env.millis_or("QUICK_RESET_DELAY_MS", DEFAULT_QUICK_RESET_DELAY)?,
        };

        let idle_minutes: u64 = env.parse_or("SHOPPER_IDLE_MINUTES", || 60)?;

        Ok(Self {
            host: env.parse_or("STOREFRONT_HOST", || IpAddr::from([127, 0, 0, 1]))?,
            port: env.parse_or("STOREFRONT_PORT", || 3000)?,
            base_url: env.parse_or("STOREFRONT_BASE_URL", default_base_url)?,
            checkout,
            catalog_path: env.get("STOREFRONT_CATALOG_PATH").map(PathBuf::from),
            shopper_idle: Duration::from_secs(idle_minutes.saturating_mul(60)),
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: default_base_url(),
            checkout: CheckoutSettings::default(),
            catalog_path: None,
            shopper_idle: Duration::from_secs(60 * 60),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Lookup<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Lookup<'_, F> {
    /// Get an optional variable. Empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, or fall back to `default` when it is unset.
    fn parse_or<T>(&self, key: &str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or_else(
            || Ok(default()),
            |value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            },
        )
    }

    /// Parse a millisecond count.
    fn millis_or(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse_or(key, || u64::try_from(default.as_millis()).unwrap_or(u64::MAX))
            .map(Duration::from_millis)
    }
}
