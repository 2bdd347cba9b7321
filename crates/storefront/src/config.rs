//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_DATABASE_URL` - `SQLite` URL (falls back to `DATABASE_URL`,
//!   default: `sqlite://huertohogar.db`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_SEED_CATALOG` - Seed an empty catalog on startup (default: true)
//! - `STOREFRONT_AUTO_MIGRATE` - Run migrations on startup (default: true)
//! - `STOREFRONT_RATE_LIMIT_AUTH` - Rate limit login/registration (default: true)
//! - `STOREFRONT_ADMIN_EMAIL` - Default admin account (default: admin@huertohogar.com)
//! - `STOREFRONT_ADMIN_PASSWORD` - Default admin password; the account is only
//!   created when this is set
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use huerto_core::{Email, MIN_PASSWORD_LENGTH};

const DEFAULT_DATABASE_URL: &str = "sqlite://huertohogar.db";
const DEFAULT_ADMIN_EMAIL: &str = "admin@huertohogar.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "password",
    "xxx",
    "todo",
    "fixme",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
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
    /// `SQLite` database URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Insert the starter products when the catalog is empty
    pub seed_catalog: bool,
    /// Run embedded migrations on startup
    pub auto_migrate: bool,
    /// Apply the rate limiter to login and registration
    pub rate_limit_auth: bool,
    /// Admin account created on startup, if configured
    pub default_admin: Option<AdminAccountConfig>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Credentials of the admin account provisioned on startup.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminAccountConfig {
    pub email: Email,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccountConfig")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the admin password
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or the admin password
    /// fails validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = SecretString::from(
            env.optional("STOREFRONT_DATABASE_URL")
                .or_else(|| env.optional("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned()),
        );
        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "3000")?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_owned(), e.to_string())
        })?;

        let default_admin = match env.optional("STOREFRONT_ADMIN_PASSWORD") {
            Some(password) => {
                let email = env.parsed::<Email>("STOREFRONT_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL)?;
                validate_admin_password(&password, "STOREFRONT_ADMIN_PASSWORD")?;
                Some(AdminAccountConfig {
                    email,
                    password: SecretString::from(password),
                })
            }
            None => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            seed_catalog: env.flag("STOREFRONT_SEED_CATALOG", true)?,
            auto_migrate: env.flag("STOREFRONT_AUTO_MIGRATE", true)?,
            rate_limit_auth: env.flag("STOREFRONT_RATE_LIMIT_AUTH", true)?,
            default_admin,
            log_format: env.parsed("STOREFRONT_LOG_FORMAT", "pretty")?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Whether the database lives only in memory.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let url = self.database_url.expose_secret();
        url.contains(":memory:") || url.contains("mode=memory")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_owned())
    }

    /// Parse a variable (or its default).
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
    }

    /// Parse a boolean flag.
    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_owned(),
                format!("expected a boolean, got '{other}'"),
            )),
        }
    }
}

/// Validate that the admin password is long enough and not a placeholder.
fn validate_admin_password(password: &str, var_name: &str) -> Result<(), ConfigError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }

    let lower = password.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
