//! Environment module - injected dependencies shared by every process.
//!
//! All time reads go through [`Clock`] so that handlers and jobs can be tested
//! with a fixed instant, and the deployment mode is carried by
//! [`HostEnvironment`] instead of being re-read from the process environment.

use chrono::{DateTime, Utc};
use std::fmt;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```ignore
/// // Production - uses system clock
/// let clock = SystemClock;
///
/// // Test - fixed time for deterministic tests
/// let clock = FixedClock::new(time);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Environment names that enable verbose diagnostics.
const DEVELOPMENT_ENVIRONMENT_NAMES: [&str; 3] =
    ["Development", "DeveloperVisualStudio", "DeveloperDocker"];

/// The deployment mode this process runs in.
///
/// Development environments expose error chains and stack text in responses;
/// every other environment hides them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    name: String,
}

impl HostEnvironment {
    /// Default environment name when none is configured.
    pub const PRODUCTION: &'static str = "Production";

    /// Create an environment from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Production environment (verbose diagnostics disabled).
    #[must_use]
    pub fn production() -> Self {
        Self::new(Self::PRODUCTION)
    }

    /// Development environment (verbose diagnostics enabled).
    #[must_use]
    pub fn development() -> Self {
        Self::new("Development")
    }

    /// The configured environment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether verbose diagnostics should be exposed.
    ///
    /// Matching is case-insensitive.
    #[must_use]
    pub fn is_development(&self) -> bool {
        DEVELOPMENT_ENVIRONMENT_NAMES
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(self.name.trim()))
    }
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::production()
    }
}

impl fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_names() {
        assert!(HostEnvironment::new("Development").is_development());
        assert!(HostEnvironment::new("developervisualstudio").is_development());
        assert!(HostEnvironment::new("DeveloperDocker").is_development());
        assert!(HostEnvironment::development().is_development());
    }

    #[test]
    fn test_non_development_names() {
        assert!(!HostEnvironment::production().is_development());
        assert!(!HostEnvironment::new("Staging").is_development());
        assert!(!HostEnvironment::new("").is_development());
        assert!(!HostEnvironment::default().is_development());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
