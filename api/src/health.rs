//! Health check endpoint.
//!
//! `GET /health` reports whether the process and the database are usable.
//! The database probe result is cached for [`HEALTH_CACHE_TTL`], so load
//! balancers polling the endpoint cause at most one `SELECT NULL;` per
//! minute no matter how many requests arrive.
//!
//! # Example
//!
//! ```bash
//! curl http://localhost:8080/health
//! # {
//! #   "data": { "apiHealth": "healthy", "databaseHealth": "healthy" },
//! #   "message": "The API is functioning normally."
//! # }
//! ```

use axum::{extract::State, http::header, response::Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use webapi_postgres::Database;
use webapi_web::{ActionContext, ActionResult, AppError, MemoryCache, RequestTime};

/// How long a database probe result is reused.
pub const HEALTH_CACHE_TTL: Duration = Duration::from_secs(60);

const DATABASE_HEALTH_KEY: &str = "database-health";

/// IMF-fixdate, the preferred `Date` header format.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Cache holding the last database probe result.
pub type HealthCache = MemoryCache<&'static str, DatabaseHealth>;

/// Whether the process can serve requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiHealth {
    /// Serving requests
    Healthy,
    /// Not serving requests
    Unhealthy,
}

/// Whether the database answered the last probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatabaseHealth {
    /// The probe succeeded
    Healthy,
    /// The probe failed
    Unhealthy,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHealthData {
    /// Process health
    pub api_health: ApiHealth,
    /// Database health
    pub database_health: DatabaseHealth,
}

impl GetHealthData {
    /// Healthy only if every component is.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.api_health == ApiHealth::Healthy && self.database_health == DatabaseHealth::Healthy
    }

    /// Envelope message describing the overall state.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "The API is {}functioning normally.",
            if self.is_healthy() { "" } else { "not " }
        )
    }
}

/// Run the no-op query; any failure means unhealthy.
pub async fn probe_database(database: &dyn Database) -> DatabaseHealth {
    match database.execute_noop().await {
        Ok(()) => DatabaseHealth::Healthy,
        Err(error) => {
            tracing::warn!(error = %error, "Database health probe failed");
            DatabaseHealth::Unhealthy
        }
    }
}

/// `GET /health`.
///
/// Always 200: an unreachable database is reported in the payload, not
/// through the status code.
///
/// The `Date` header is the request's clock snapshot.
///
/// # Errors
///
/// Only if the envelope cannot be written.
pub async fn get_health(
    State(cache): State<Arc<HealthCache>>,
    State(database): State<Arc<dyn Database>>,
    RequestTime(now): RequestTime,
    ctx: ActionContext,
) -> Result<Response, AppError> {
    let database_health = cache
        .get_or_create(DATABASE_HEALTH_KEY, || async move {
            probe_database(database.as_ref()).await
        })
        .await;

    let data = GetHealthData {
        api_health: ApiHealth::Healthy,
        database_health,
    };
    let message = data.message();

    Ok(ActionResult::ok()
        .with_header(
            header::DATE,
            now.instant().format(HTTP_DATE_FORMAT).to_string(),
        )
        .as_json_with_message(data, message)
        .respond(ctx)?)
}
