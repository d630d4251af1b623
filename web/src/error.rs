//! Error types for web handlers.
//!
//! [`AppError`] bridges handler failures and HTTP responses. It does not write
//! a body itself: it tags the response with a marker extension and the
//! exception handling layer (see [`crate::unhandled`]) renders the envelope
//! with the shared JSON settings.
//!
//! - Server errors with an underlying cause are tagged [`UnhandledException`]
//!   and become the standard 500 envelope.
//! - Everything else is tagged [`ErrorMessage`] and keeps its status, with
//!   `{ "data": null, "message": ... }` as the body.

use crate::exception::ExceptionData;
use crate::results::ResultError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Response extension marking an escaped error that must become a 500
/// envelope.
#[derive(Debug, Clone)]
pub struct UnhandledException(pub ExceptionData);

/// Response extension carrying a client-facing error message.
#[derive(Debug, Clone)]
pub struct ErrorMessage(pub String);

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(ctx: ActionContext) -> Result<Response, AppError> {
///     let user = find_user(id).await
///         .map_err(|_| AppError::not_found("User", id))?;
///     Ok(ActionResult::ok().as_json_with(user).respond(ctx)?)
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Internal error (for logging and development diagnostics)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this error escapes as an unhandled exception.
    #[must_use]
    pub fn is_unhandled(&self) -> bool {
        self.status.is_server_error() && self.source.is_some()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| &**e as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(source) = self.source.as_ref().filter(|_| self.status.is_server_error()) {
            tracing::error!(
                status = %self.status,
                message = %self.message,
                error = %format!("{source:#}"),
                "Unhandled error in request handler"
            );

            let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
            response
                .extensions_mut()
                .insert(UnhandledException(ExceptionData::from_anyhow(source)));
            return response;
        }

        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Server error");
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "Request rejected");
        }

        let mut response = self.status.into_response();
        response.extensions_mut().insert(ErrorMessage(self.message));
        response
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// A result that cannot be executed is a server bug.
impl From<ResultError> for AppError {
    fn from(err: ResultError) -> Self {
        Self::from(anyhow::Error::new(err))
    }
}
