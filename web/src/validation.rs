//! Request model binding and validation.
//!
//! Handlers take [`Validated<T>`] instead of `Json<T>`. The extractor
//! deserializes the body, runs [`Validate::validate`], and on any failure
//! short-circuits with a 400 envelope listing one [`ValidationFailure`] per
//! error, so the handler never runs on an invalid model.
//!
//! Failures only carry an `exception` chain in development environments.

use crate::context::HttpContext;
use crate::exception::ExceptionData;
use crate::json::JsonOptions;
use crate::results::HttpResult;
use axum::{
    Json, async_trait,
    extract::{FromRef, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use webapi_core::HostEnvironment;

/// Envelope message for rejected request models.
pub const INVALID_MODEL_MESSAGE: &str = "Request model is invalid.";

/// One problem with a bound request model.
#[derive(Debug)]
pub struct ValidationError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ValidationError {
    /// An error with a client-facing message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the error that caused this failure.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The client-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn Error + 'static))
    }
}

/// Model-level validation run after deserialization.
pub trait Validate {
    /// Check the model.
    ///
    /// # Errors
    ///
    /// Returns every problem found, not just the first.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Serialized form of a [`ValidationError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    /// Client-facing message
    pub message: String,
    /// Underlying error chain (development only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionData>,
}

impl ValidationFailure {
    /// A failure with no exception chain.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exception: None,
        }
    }

    /// Convert `error`, keeping its cause only when `environment` is
    /// development.
    #[must_use]
    pub fn from_error(error: &ValidationError, environment: &HostEnvironment) -> Self {
        let exception = if environment.is_development() {
            error.source().map(ExceptionData::from_error)
        } else {
            None
        };

        Self {
            message: error.message.clone(),
            exception,
        }
    }
}

/// A JSON body that deserialized and validated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validated<T>(pub T);

/// Rejection produced by [`Validated`].
#[derive(Debug)]
pub struct ValidationRejection {
    failures: Vec<ValidationFailure>,
    context: HttpContext,
}

impl ValidationRejection {
    /// The failures that will be reported.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        tracing::debug!(failures = self.failures.len(), "{INVALID_MODEL_MESSAGE}");
        metrics::counter!("http.requests.invalid_model").increment(1);

        HttpResult::bad_request_with(Some(INVALID_MODEL_MESSAGE.to_string()), self.failures)
            .respond(self.context)
            .unwrap_or_else(|error| {
                tracing::error!(error = %error, "Failed to write validation failure envelope");
                StatusCode::BAD_REQUEST.into_response()
            })
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for Validated<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Arc<JsonOptions>: FromRef<S>,
    HostEnvironment: FromRef<S>,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let environment = HostEnvironment::from_ref(state);
        let (parts, body) = req.into_parts();
        let context = HttpContext::from_parts(&parts, Arc::<JsonOptions>::from_ref(state));
        let req = Request::from_parts(parts, body);

        let value = match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => value,
            Err(rejection) => {
                let error = ValidationError::new(rejection.body_text()).with_source(rejection);
                return Err(ValidationRejection {
                    failures: vec![ValidationFailure::from_error(&error, &environment)],
                    context,
                });
            }
        };

        match value.validate() {
            Ok(()) => Ok(Self(value)),
            Err(errors) => Err(ValidationRejection {
                failures: errors
                    .iter()
                    .map(|error| ValidationFailure::from_error(error, &environment))
                    .collect(),
                context,
            }),
        }
    }
}
