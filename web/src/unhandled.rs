//! Last-resort error handling.
//!
//! Two pieces cooperate:
//!
//! - [`panic_response`], installed through
//!   `tower_http::catch_panic::CatchPanicLayer::custom`, turns a handler panic
//!   into a 500 tagged [`UnhandledException`].
//! - [`handle_exceptions`], installed with
//!   `axum::middleware::from_fn_with_state`, renders tagged responses:
//!   [`UnhandledException`] becomes the standard 500 envelope and
//!   [`ErrorMessage`] becomes `{ "data": null, "message": ... }` with the
//!   original status.
//!
//! The exception chain is only exposed in development environments.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/health", get(health))
//!     .layer(CatchPanicLayer::custom(panic_response))
//!     .layer(middleware::from_fn_with_state(handler, handle_exceptions));
//! ```

use crate::context::{HttpContext, RequestHead};
use crate::error::{ErrorMessage, UnhandledException};
use crate::exception::ExceptionData;
use crate::json::JsonOptions;
use crate::results::HttpResult;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::sync::Arc;
use webapi_core::HostEnvironment;

/// Envelope message for unhandled failures.
pub const UNHANDLED_EXCEPTION_MESSAGE: &str = "An unhandled exception has occurred.";

/// State for [`handle_exceptions`].
#[derive(Debug, Clone)]
pub struct ExceptionHandler {
    environment: HostEnvironment,
    json: Arc<JsonOptions>,
}

impl ExceptionHandler {
    /// Render envelopes with `json`, exposing chains only in development.
    #[must_use]
    pub const fn new(environment: HostEnvironment, json: Arc<JsonOptions>) -> Self {
        Self { environment, json }
    }

    /// Replace a tagged response with its envelope. Untagged responses pass
    /// through unchanged.
    #[must_use]
    pub fn render(&self, request: RequestHead, response: Response) -> Response {
        if let Some(UnhandledException(exception)) = response.extensions().get::<UnhandledException>() {
            return self.unhandled(request, exception.clone());
        }

        if let Some(ErrorMessage(message)) = response.extensions().get::<ErrorMessage>() {
            let message = message.clone();
            return self.error_message(request, response, message);
        }

        response
    }

    fn unhandled(&self, request: RequestHead, exception: ExceptionData) -> Response {
        metrics::counter!("http.requests.unhandled_exceptions").increment(1);

        let data = self.environment.is_development().then_some(exception);

        HttpResult::internal_server_error()
            .as_json_optional(data, Some(UNHANDLED_EXCEPTION_MESSAGE.to_string()))
            .respond(HttpContext::new(request, Arc::clone(&self.json)))
            .unwrap_or_else(|error| {
                tracing::error!(error = %error, "Failed to write unhandled exception envelope");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }

    fn error_message(&self, request: RequestHead, original: Response, message: String) -> Response {
        let status = original.status();
        let (parts, _) = original.into_parts();

        let mut response = HttpResult::with_status(status)
            .as_json_optional::<()>(None, Some(message))
            .respond(HttpContext::new(request, Arc::clone(&self.json)))
            .unwrap_or_else(|error| {
                tracing::error!(error = %error, "Failed to write error envelope");
                status.into_response()
            });

        for (name, value) in &parts.headers {
            if name != axum::http::header::CONTENT_TYPE && name != axum::http::header::CONTENT_LENGTH {
                response.headers_mut().append(name, value.clone());
            }
        }

        response
    }
}

/// Middleware rendering [`UnhandledException`] and [`ErrorMessage`] tags.
pub async fn handle_exceptions(
    State(handler): State<ExceptionHandler>,
    request: Request,
    next: Next,
) -> Response {
    let head = RequestHead {
        method: request.method().clone(),
        uri: request.uri().clone(),
        headers: request.headers().clone(),
    };

    let response = next.run(request).await;
    handler.render(head, response)
}

/// Panic handler for `CatchPanicLayer::custom`.
#[must_use]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_string()))
        .unwrap_or_else(|| "Request handler panicked".to_string());

    tracing::error!(panic = %message, "Request handler panicked");

    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response
        .extensions_mut()
        .insert(UnhandledException(ExceptionData::from_message(message)));
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use crate::error::AppError;
    use axum::{Router, body::Body, middleware, routing::get};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn failing() -> Result<String, AppError> {
        Err(anyhow::anyhow!("socket closed")
            .context("querying orders")
            .into())
    }

    async fn missing() -> Result<String, AppError> {
        Err(AppError::not_found("Order", 7))
    }

    async fn panicking() -> String {
        panic!("index out of bounds")
    }

    fn app(environment: HostEnvironment) -> Router {
        let handler = ExceptionHandler::new(environment, Arc::new(JsonOptions::default()));

        Router::new()
            .route("/fail", get(failing))
            .route("/missing", get(missing))
            .route("/panic", get(panicking))
            .route("/ok", get(|| async { "fine" }))
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn_with_state(handler, handle_exceptions))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_unhandled_error_hides_chain_in_production() {
        let (status, body) = get_json(app(HostEnvironment::production()), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "data": null, "message": "An unhandled exception has occurred." })
        );
    }

    #[tokio::test]
    async fn test_unhandled_error_exposes_chain_in_development() {
        let (status, body) = get_json(app(HostEnvironment::development()), "/fail").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], UNHANDLED_EXCEPTION_MESSAGE);
        assert_eq!(body["data"]["message"], "querying orders");
        assert_eq!(body["data"]["innerException"]["message"], "socket closed");
        assert_eq!(body["data"]["innerException"]["innerException"], Value::Null);
    }

    #[tokio::test]
    async fn test_panic_becomes_single_500() {
        let (status, body) = get_json(app(HostEnvironment::production()), "/panic").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["message"], UNHANDLED_EXCEPTION_MESSAGE);

        let (_, body) = get_json(app(HostEnvironment::development()), "/panic").await;
        assert_eq!(body["data"]["message"], "index out of bounds");
    }

    #[tokio::test]
    async fn test_error_message_keeps_status() {
        let (status, body) = get_json(app(HostEnvironment::production()), "/missing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "data": null, "message": "Order with id 7 not found" })
        );
    }

    #[tokio::test]
    async fn test_untagged_responses_pass_through() {
        let request = Request::builder().uri("/ok").body(Body::empty()).unwrap();
        let response = app(HostEnvironment::production())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
