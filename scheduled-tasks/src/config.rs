//! Configuration for the scheduled tasks worker.
//!
//! `DATABASE_URL` is required; everything else has a default.

use std::num::NonZeroUsize;
use std::time::Duration;
use webapi_core::config::{parse_or, parse_positive_or};
use webapi_core::{ConfigError, HostEnvironment, LogFormat, env_lookup};
use webapi_postgres::DatabaseConfig;

/// Default `SAMPLE_JOB_INTERVAL_SECS`.
pub const DEFAULT_SAMPLE_JOB_INTERVAL_SECS: u64 = 10;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment mode (`APP_ENVIRONMENT`)
    pub environment: HostEnvironment,
    /// Database pool configuration
    pub database: DatabaseConfig,
    /// Log line format (`LOG_FORMAT`)
    pub log_format: LogFormat,
    /// Maximum simultaneous job executions (`SCHEDULER_MAX_CONCURRENCY`)
    pub max_concurrency: usize,
    /// Time between sample job runs (`SAMPLE_JOB_INTERVAL_SECS`)
    pub sample_job_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DATABASE_URL` is missing or a value is
    /// malformed.
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

        let max_concurrency =
            parse_positive_or(lookup, "SCHEDULER_MAX_CONCURRENCY", default_concurrency())?;
        let interval_secs = parse_positive_or(
            lookup,
            "SAMPLE_JOB_INTERVAL_SECS",
            DEFAULT_SAMPLE_JOB_INTERVAL_SECS,
        )?;

        Ok(Self {
            environment,
            database: DatabaseConfig::from_lookup(lookup)?,
            log_format: parse_or(lookup, "LOG_FORMAT", LogFormat::default())?,
            max_concurrency,
            sample_job_interval: Duration::from_secs(interval_secs),
        })
    }
}

/// One execution slot per available CPU.
fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
