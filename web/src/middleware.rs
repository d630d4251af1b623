//! Axum middleware for request tracking and observability.
//!
//! # Flow
//!
//! 1. **Extract** the trace id from the `X-Trace-Id` header, or create one with
//!    the injected [`GuidFactory`]
//! 2. **Store** it in request extensions as [`TraceId`]
//! 3. **Create** an `http_request` tracing span carrying it
//! 4. **Inject** it into the response `X-Trace-Id` header
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use webapi_web::middleware::trace_id_layer;
//!
//! let app = Router::new()
//!     .route("/health", get(health))
//!     .layer(trace_id_layer(Arc::new(RandomGuidFactory)));
//! ```

use crate::extractors::TraceId;
use axum::{extract::Request, http::HeaderValue, response::Response};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;
use webapi_core::GuidFactory;

/// Header name for the request trace id.
pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Create a layer that assigns every request a trace id.
#[must_use]
pub fn trace_id_layer(guids: Arc<dyn GuidFactory>) -> TraceIdLayer {
    TraceIdLayer { guids }
}

/// Layer for trace id tracking.
#[derive(Clone)]
pub struct TraceIdLayer {
    guids: Arc<dyn GuidFactory>,
}

impl std::fmt::Debug for TraceIdLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceIdLayer").finish_non_exhaustive()
    }
}

impl<S> Layer<S> for TraceIdLayer {
    type Service = TraceIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceIdMiddleware {
            inner,
            guids: Arc::clone(&self.guids),
        }
    }
}

/// Middleware service for trace id tracking.
#[derive(Clone)]
pub struct TraceIdMiddleware<S> {
    inner: S,
    guids: Arc<dyn GuidFactory>,
}

impl<S> Service<Request> for TraceIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let trace_id = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(|| self.guids.create_random());

        req.extensions_mut().insert(TraceId(trace_id));

        let span = tracing::info_span!(
            "http_request",
            trace_id = %trace_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(
            async move {
                let start = Instant::now();
                let mut response = fut.await?;

                tracing::info!(
                    status = response.status().as_u16(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Request completed"
                );

                if let Ok(header_value) = HeaderValue::from_str(&trace_id.to_string()) {
                    response.headers_mut().insert(TRACE_ID_HEADER, header_value);
                }

                Ok(response)
            }
            .instrument(span),
        )
    }
}
