//! Router configuration for the API server.
//!
//! Builds the complete Axum router with all endpoints and the middleware
//! stack. Outermost first:
//!
//! 1. Trace id assignment and the `http_request` span
//! 2. `Strict-Transport-Security` outside development
//! 3. Exception envelope rendering
//! 4. Panic capture
//! 5. Request body size limit

use crate::health::get_health;
use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use http::{HeaderValue, header};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use webapi_web::{RouteTable, handle_exceptions, panic_response, trace_id_layer};

/// Route name of `GET /health`.
pub const HEALTH_ROUTE: &str = "GetHealth";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Largest accepted request body.
pub const MAX_REQUEST_BODY_BYTES: usize = 1_000_000;

/// HSTS policy sent outside development.
pub const HSTS_POLICY: &str = "max-age=31536000";

/// Named routes available to `ActionContext::url_for`.
#[must_use]
pub fn route_table() -> RouteTable {
    RouteTable::new().with_route(HEALTH_ROUTE, HEALTH_PATH)
}

/// Build the complete Axum router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route(HEALTH_PATH, get(get_health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.exception_handler(),
            handle_exceptions,
        ));

    let router = if state.environment.is_development() {
        router
    } else {
        router.layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_POLICY),
        ))
    };

    router
        .layer(trace_id_layer(Arc::clone(&state.guids)))
        .with_state(state)
}
