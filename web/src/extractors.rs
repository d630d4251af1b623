//! Custom Axum extractors.
//!
//! - `TraceId`: the id assigned by the trace id middleware
//! - `RequestTime`: one frozen clock reading for the whole request
//!
//! # Examples
//!
//! ```ignore
//! use webapi_web::extractors::{RequestTime, TraceId};
//!
//! async fn handler(trace_id: TraceId, RequestTime(now): RequestTime) -> String {
//!     tracing::info!(trace_id = %trace_id.0, "Processing request");
//!     format!("Request {} started at {now}", trace_id.0)
//! }
//! ```

use crate::middleware::TRACE_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use webapi_core::{Clock, ClockSnapshot};

/// Trace id of the current request.
///
/// Set by [`crate::middleware::TraceIdLayer`]. Without the layer the
/// `X-Trace-Id` header is parsed, and a fresh id is generated when that is
/// missing too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(pub Uuid);

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(trace_id) = parts.extensions.get::<Self>() {
            return Ok(*trace_id);
        }

        let trace_id = parts
            .headers
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(trace_id))
    }
}

/// The request's [`ClockSnapshot`], read from the shared `Arc<dyn Clock>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTime(pub ClockSnapshot);

#[async_trait]
impl<S> FromRequestParts<S> for RequestTime
where
    Arc<dyn Clock>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(snapshot) = parts.extensions.get::<Self>() {
            return Ok(*snapshot);
        }

        let clock = Arc::<dyn Clock>::from_ref(state);
        let snapshot = Self(ClockSnapshot::new(clock.as_ref()));
        parts.extensions.insert(snapshot);
        Ok(snapshot)
    }
}
