//! HTTP API server for Company Product.
//!
//! The binary in `main.rs` only loads configuration and serves; everything
//! else lives here so that integration tests can build the same router
//! around mock dependencies.
//!
//! # Modules
//!
//! - [`config`]: environment-variable configuration
//! - [`state`]: shared handler state
//! - [`router`]: routes and the middleware stack
//! - [`health`]: `GET /health`

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod health;
pub mod router;
pub mod state;

pub use config::{Config, ServerConfig};
pub use health::{ApiHealth, DatabaseHealth, GetHealthData, HEALTH_CACHE_TTL, HealthCache};
pub use router::{HEALTH_ROUTE, build_router, route_table};
pub use state::AppState;
