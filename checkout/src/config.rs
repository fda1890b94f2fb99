//! Configuration management for the checkout server.
//!
//! Loads configuration from environment variables. `.env` and then `.env.local`
//! are read first; neither overrides a variable that is already set.
//!
//! Database and SMTP settings are required. The server refuses to start
//! without them instead of running with a half-working checkout.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storefront_core::DEFAULT_ORDER_PREFIX;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variables are unset or empty.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PostgreSQL` configuration
    pub database: DatabaseConfig,
    /// SMTP configuration
    pub smtp: SmtpConfig,
    /// Store branding and order numbering
    pub store: StoreConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,
}

impl DatabaseConfig {
    /// Acquire timeout as a [`Duration`].
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

/// SMTP configuration
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server host
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// Implicit TLS (`true`) or STARTTLS (`false`)
    pub secure: bool,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// `From` header, e.g. `Audiophile <orders@example.com>`
    pub from: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

/// Store branding and order numbering
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store name used in confirmation emails
    pub name: String,
    /// Order number prefix
    pub order_prefix: String,
    /// Public storefront URL, used for the "view your order" link
    pub app_url: String,
    /// Support address shown in confirmation emails
    pub support_email: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "Audiophile".to_string(),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            app_url: "https://audiophile.example.com".to_string(),
            support_email: "support@audiophile.shop".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Prometheus exporter port; the exporter is off when unset
    pub metrics_port: Option<u16>,
}

impl ServerConfig {
    /// `host:port` for the HTTP listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every unset required variable,
    /// or [`ConfigError::Invalid`] for the first unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            var(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let database_url = required("DATABASE_URL");
        let smtp_host = required("SMTP_HOST");
        let smtp_port = required("SMTP_PORT");
        let smtp_user = required("SMTP_USER");
        let smtp_pass = required("SMTP_PASS");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let defaults = StoreConfig::default();
        let store_name = var("STORE_NAME").unwrap_or(defaults.name);
        let from = var("EMAIL_FROM").unwrap_or_else(|| format!("{store_name} <{smtp_user}>"));

        Ok(Self {
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout: parse_or(&var, "DATABASE_CONNECT_TIMEOUT", 30)?,
            },
            smtp: SmtpConfig {
                host: smtp_host,
                port: parse_value("SMTP_PORT", &smtp_port)?,
                secure: var("SMTP_SECURE").is_some_and(|v| v.trim() == "true"),
                username: smtp_user,
                password: smtp_pass,
                from,
            },
            store: StoreConfig {
                name: store_name,
                order_prefix: var("ORDER_NUMBER_PREFIX").unwrap_or(defaults.order_prefix),
                app_url: var("APP_URL")
                    .map_or(defaults.app_url, |url| url.trim_end_matches('/').to_string()),
                support_email: var("SUPPORT_EMAIL").unwrap_or(defaults.support_email),
            },
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&var, "PORT", 3000)?,
                metrics_port: var("METRICS_PORT")
                    .map(|raw| parse_value("METRICS_PORT", &raw))
                    .transpose()?,
            },
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

/// Read `.env` then `.env.local` from the working directory, if present.
///
/// # Errors
///
/// See [`load_dotenv_files_in`].
pub fn load_dotenv_files() -> Result<Vec<PathBuf>, dotenvy::Error> {
    load_dotenv_files_in(Path::new("."))
}

/// Read `.env` then `.env.local` from `dir`, if present.
///
/// Variables already in the environment win over both files, and `.env` wins
/// over `.env.local`. Returns the files that were loaded.
///
/// # Errors
///
/// Returns the `dotenvy` error for a file that exists but cannot be parsed.
pub fn load_dotenv_files_in(dir: &Path) -> Result<Vec<PathBuf>, dotenvy::Error> {
    let mut loaded = Vec::new();
    for file in [".env", ".env.local"] {
        let path = dir.join(file);
        if path.exists() {
            dotenvy::from_path(&path)?;
            loaded.push(path);
        }
    }
    Ok(loaded)
}
