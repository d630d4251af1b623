//! # Web API Core
//!
//! Shared domain primitives for the Company Product web API and its scheduled
//! tasks worker.
//!
//! This crate provides:
//! - **Time**: the [`Clock`](environment::Clock) abstraction and a per-unit-of-work
//!   [`ClockSnapshot`]
//! - **Identifiers**: the injectable [`GuidFactory`]
//! - **Value types**: the validated, normalized [`EmailAddress`]
//! - **Credentials**: PBKDF2 password hashing behind [`PasswordHashingService`]
//! - **Deployment mode**: [`HostEnvironment`](environment::HostEnvironment)
//! - **Logging**: [`telemetry::init_tracing`] shared by both processes
//! - **Configuration**: lookup-based environment parsing with [`ConfigError`]
//!
//! ## Example
//!
//! ```
//! use webapi_core::environment::SystemClock;
//! use webapi_core::ClockSnapshot;
//! use webapi_core::environment::Clock;
//!
//! let snapshot = ClockSnapshot::new(&SystemClock);
//! assert_eq!(snapshot.now(), snapshot.now());
//! ```

pub mod clock_snapshot;
pub mod config;
pub mod email_address;
pub mod environment;
pub mod guid;
pub mod password_hashing;
pub mod telemetry;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use clock_snapshot::ClockSnapshot;
pub use config::{ConfigError, env_lookup};
pub use email_address::{EmailAddress, EmailAddressError};
pub use environment::{Clock, HostEnvironment, SystemClock};
pub use guid::{GuidFactory, RandomGuidFactory};
pub use telemetry::{LogFormat, init_tracing};
pub use password_hashing::{
    HashAlgorithm, HashedSecret, HashingParameters, PasswordHashingError, PasswordHashingService,
    Pbkdf2PasswordHashingService,
};
