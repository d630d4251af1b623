//! Configuration management for the API server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! `DATABASE_URL` is the only required setting.

use webapi_core::config::parse_or;
use webapi_core::{ConfigError, HostEnvironment, LogFormat, env_lookup};
use webapi_postgres::DatabaseConfig;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment mode (`APP_ENVIRONMENT`)
    pub environment: HostEnvironment,
    /// Database pool configuration
    pub database: DatabaseConfig,
    /// Listener configuration
    pub server: ServerConfig,
    /// Log line format (`LOG_FORMAT`)
    pub log_format: LogFormat,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl ServerConfig {
    /// Default bind host.
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";

    /// Default bind port.
    pub const DEFAULT_PORT: u16 = 8080;

    /// `host:port`, suitable for `TcpListener::bind`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    /// Load configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = HostEnvironment::new(
            lookup("APP_ENVIRONMENT")
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| HostEnvironment::PRODUCTION.to_string()),
        );

        let host = lookup("SERVER_HOST")
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| ServerConfig::DEFAULT_HOST.to_string());
        let port = parse_or(lookup, "SERVER_PORT", ServerConfig::DEFAULT_PORT)?;

        Ok(Self {
            environment,
            database: DatabaseConfig::from_lookup(lookup)?,
            server: ServerConfig { host, port },
            log_format: parse_or(lookup, "LOG_FORMAT", LogFormat::default())?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(&lookup(&[("DATABASE_URL", "postgres://localhost/product")]))
                .unwrap();

        assert_eq!(config.environment, HostEnvironment::production());
        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(&lookup(&[
            ("APP_ENVIRONMENT", "Development"),
            ("DATABASE_URL", "postgres://localhost/product"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "3000"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert!(config.environment.is_development());
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.server.address(), "127.0.0.1:3000");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_database_url_fails_fast() {
        let err = Config::from_lookup(&lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing { name: "DATABASE_URL" });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_lookup(&lookup(&[
            ("DATABASE_URL", "postgres://localhost/product"),
            ("SERVER_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SERVER_PORT", .. }));

        let err = Config::from_lookup(&lookup(&[
            ("DATABASE_URL", "postgres://localhost/product"),
            ("LOG_FORMAT", "xml"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "LOG_FORMAT", .. }));
    }
}
