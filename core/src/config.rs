//! Environment-variable configuration helpers.
//!
//! Every process reads its settings through a lookup function instead of
//! calling [`std::env::var`] directly, so parsing can be tested with a plain
//! map. [`env_lookup`] is the production lookup.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// A setting is missing or malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{name} is not set. Add it to the environment or to a .env file.")]
    Missing {
        /// Variable name
        name: &'static str,
    },

    /// A variable could not be parsed.
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Read a variable from the process environment.
#[must_use]
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read a required, non-blank variable.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the variable is unset or blank.
pub fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing { name })
}

/// Parse an optional variable, falling back to `default` when unset or blank.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the variable is set but does not parse.
pub fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|error: T::Err| ConfigError::Invalid {
                    name,
                    reason: error.to_string(),
                    value,
                })
        }
        _ => Ok(default),
    }
}

/// Like [`parse_or`], but zero is rejected.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the variable does not parse or is zero.
pub fn parse_positive_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Default + PartialEq,
    T::Err: Display,
{
    let value = parse_or(lookup, name, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: lookup(name).unwrap_or_default(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
