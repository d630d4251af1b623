//! Application state for the API server.
//!
//! Contains every shared resource a handler can ask for. Each field is
//! extractable on its own through `State<T>` thanks to `FromRef`, so
//! handlers only name what they use.

use crate::health::{HEALTH_CACHE_TTL, HealthCache};
use crate::router::route_table;
use axum::extract::FromRef;
use std::sync::Arc;
use webapi_core::{Clock, GuidFactory, HostEnvironment, RandomGuidFactory, SystemClock};
use webapi_postgres::Database;
use webapi_web::{ExceptionHandler, JsonOptions, RouteTable};

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is either small or behind an `Arc`.
#[derive(Clone, FromRef)]
pub struct AppState {
    /// Deployment mode
    pub environment: HostEnvironment,

    /// JSON settings shared with the exception layer
    pub json: Arc<JsonOptions>,

    /// Named routes for `Location` generation
    pub routes: Arc<RouteTable>,

    /// Database used by the health probe
    pub database: Arc<dyn Database>,

    /// Memoized database probe results
    pub health_cache: Arc<HealthCache>,

    /// Source of trace ids
    pub guids: Arc<dyn GuidFactory>,

    /// Wall clock for per-request snapshots
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Production wiring around `database`.
    #[must_use]
    pub fn new(environment: HostEnvironment, database: Arc<dyn Database>) -> Self {
        Self {
            environment,
            json: Arc::new(JsonOptions::new()),
            routes: Arc::new(route_table()),
            database,
            health_cache: Arc::new(HealthCache::new(HEALTH_CACHE_TTL)),
            guids: Arc::new(RandomGuidFactory),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the trace id source.
    #[must_use]
    pub fn with_guid_factory(mut self, guids: Arc<dyn GuidFactory>) -> Self {
        self.guids = guids;
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// State for the exception handling layer.
    #[must_use]
    pub fn exception_handler(&self) -> ExceptionHandler {
        ExceptionHandler::new(self.environment.clone(), Arc::clone(&self.json))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.environment)
            .field("json", &self.json)
            .field("health_cache", &self.health_cache)
            .finish_non_exhaustive()
    }
}
