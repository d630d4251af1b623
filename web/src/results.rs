//! The result envelope builder.
//!
//! An [`ApiResult`] is a status code plus an ordered list of formatters. A
//! formatter is a callback that mutates the in-flight response (usually a
//! header) before any body is written. [`ApiResult::as_json`] and friends turn
//! it into a [`JsonResult`], which additionally writes the standard envelope:
//!
//! ```json
//! { "data": ..., "message": ... }
//! ```
//!
//! Results are generic over the [`ResultContext`] they execute against, so the
//! status-code constructors below exist once for both [`ActionResult`]
//! (handlers) and [`HttpResult`] (middleware). Constructors that generate URLs
//! from named routes only exist for [`ActionResult`].
//!
//! Executing a result consumes it.
//!
//! # Example
//!
//! ```ignore
//! async fn get_user(ctx: ActionContext, Path(id): Path<u64>) -> Result<Response, AppError> {
//!     let user = load_user(id).await?;
//!     Ok(ActionResult::ok().as_json_with(user).respond(ctx)?)
//! }
//! ```

use crate::context::{ActionContext, HttpContext, ResultContext};
use crate::routes::RouteValues;
use crate::validation::ValidationFailure;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while executing a result.
#[derive(Debug, Error)]
pub enum ResultError {
    /// The result was executed without a status code.
    #[error("Status code is required.")]
    StatusCodeRequired,

    /// A route-based `Location` could not be generated.
    #[error("No routes matched the supplied values.")]
    NoRouteMatched,

    /// A formatter produced a header value that is not legal on the wire.
    #[error("Invalid value for header '{name}'.")]
    InvalidHeader {
        /// The header being written
        name: HeaderName,
        /// Why the value was rejected
        #[source]
        source: axum::http::header::InvalidHeaderValue,
    },

    /// The envelope could not be serialized.
    #[error("Failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A custom formatter failed.
    #[error("{0}")]
    Formatter(String),
}

/// Ordered callback applied to the response before the body is written.
pub type Formatter<C> = Box<dyn FnOnce(&mut C) -> Result<(), ResultError> + Send>;

/// Result built in handlers.
pub type ActionResult = ApiResult<ActionContext>;

/// Result built outside handlers, where no route table is available.
pub type HttpResult = ApiResult<HttpContext>;

/// The JSON body every endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Payload
    pub data: Option<T>,
    /// Human-readable summary
    pub message: Option<String>,
}

/// A status code plus ordered response formatters.
pub struct ApiResult<C> {
    status: Option<StatusCode>,
    formatters: Vec<Formatter<C>>,
}

impl<C> fmt::Debug for ApiResult<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResult")
            .field("status", &self.status)
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

/// Expands to one constructor per plain status code.
macro_rules! status_results {
    ($($(#[$doc:meta])* $name:ident => $status:ident;)*) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name() -> Self {
                Self::with_status(StatusCode::$status)
            }
        )*
    };
}

impl<C: ResultContext> ApiResult<C> {
    /// A result with an optional status and no formatters.
    #[must_use]
    pub const fn new(status: Option<StatusCode>) -> Self {
        Self {
            status,
            formatters: Vec::new(),
        }
    }

    /// A result with `status` and no formatters.
    #[must_use]
    pub const fn with_status(status: StatusCode) -> Self {
        Self::new(Some(status))
    }

    /// Replace the status code.
    #[must_use]
    pub fn with_status_code(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Append a formatter. Formatters run in the order they were added.
    #[must_use]
    pub fn add_formatter<F>(mut self, formatter: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), ResultError> + Send + 'static,
    {
        self.formatters.push(Box::new(formatter));
        self
    }

    /// Append a formatter that sets `name` to `value`.
    ///
    /// The value is validated at execution time.
    #[must_use]
    pub fn with_header(self, name: HeaderName, value: impl Into<String>) -> Self {
        let value = value.into();
        self.add_formatter(move |ctx| {
            let value = HeaderValue::try_from(value)
                .map_err(|source| ResultError::InvalidHeader { name: name.clone(), source })?;
            ctx.response_mut().headers_mut().insert(name, value);
            Ok(())
        })
    }

    /// The status code, if set.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        self.status
    }

    /// Number of registered formatters.
    #[must_use]
    pub fn formatter_count(&self) -> usize {
        self.formatters.len()
    }

    /// Envelope with neither data nor message.
    #[must_use]
    pub const fn as_json(self) -> JsonResult<C, ()> {
        JsonResult::new(self, None, None)
    }

    /// Envelope carrying `data`.
    #[must_use]
    pub const fn as_json_with<T>(self, data: T) -> JsonResult<C, T> {
        JsonResult::new(self, Some(data), None)
    }

    /// Envelope carrying `data` and `message`.
    #[must_use]
    pub fn as_json_with_message<T>(self, data: T, message: impl Into<String>) -> JsonResult<C, T> {
        JsonResult::new(self, Some(data), Some(message.into()))
    }

    /// Envelope where either part may be absent.
    #[must_use]
    pub const fn as_json_optional<T>(self, data: Option<T>, message: Option<String>) -> JsonResult<C, T> {
        JsonResult::new(self, data, message)
    }

    /// Set the status and run every formatter in order.
    ///
    /// # Errors
    ///
    /// Returns [`ResultError::StatusCodeRequired`] if no status was set, or the
    /// first formatter failure; later formatters do not run.
    pub fn execute(self, context: &mut C) -> Result<(), ResultError> {
        let status = self.status.ok_or(ResultError::StatusCodeRequired)?;
        context.response_mut().set_status(status);

        for formatter in self.formatters {
            formatter(context)?;
        }

        Ok(())
    }

    /// Execute against `context` and produce the response.
    ///
    /// # Errors
    ///
    /// See [`ApiResult::execute`].
    pub fn respond(self, mut context: C) -> Result<Response, ResultError> {
        self.execute(&mut context)?;
        Ok(context.into_sink().into_response())
    }

    status_results! {
        /// 100 Continue
        continue_ => CONTINUE;
        /// 200 OK
        ok => OK;
        /// 304 Not Modified
        not_modified => NOT_MODIFIED;
        /// 400 Bad Request
        bad_request => BAD_REQUEST;
        /// 403 Forbidden
        forbidden => FORBIDDEN;
        /// 404 Not Found
        not_found => NOT_FOUND;
        /// 405 Method Not Allowed
        method_not_allowed => METHOD_NOT_ALLOWED;
        /// 406 Not Acceptable
        not_acceptable => NOT_ACCEPTABLE;
        /// 409 Conflict
        conflict => CONFLICT;
        /// 410 Gone
        gone => GONE;
        /// 411 Length Required
        length_required => LENGTH_REQUIRED;
        /// 412 Precondition Failed
        precondition_failed => PRECONDITION_FAILED;
        /// 413 Payload Too Large
        payload_too_large => PAYLOAD_TOO_LARGE;
        /// 414 URI Too Long
        uri_too_long => URI_TOO_LONG;
        /// 415 Unsupported Media Type
        unsupported_media_type => UNSUPPORTED_MEDIA_TYPE;
        /// 417 Expectation Failed
        expectation_failed => EXPECTATION_FAILED;
        /// 418 I'm a teapot
        im_a_teapot => IM_A_TEAPOT;
        /// 428 Precondition Required
        precondition_required => PRECONDITION_REQUIRED;
        /// 431 Request Header Fields Too Large
        request_header_fields_too_large => REQUEST_HEADER_FIELDS_TOO_LARGE;
        /// 451 Unavailable For Legal Reasons
        unavailable_for_legal_reasons => UNAVAILABLE_FOR_LEGAL_REASONS;
        /// 500 Internal Server Error
        internal_server_error => INTERNAL_SERVER_ERROR;
        /// 501 Not Implemented
        not_implemented => NOT_IMPLEMENTED;
        /// 502 Bad Gateway
        bad_gateway => BAD_GATEWAY;
        /// 503 Service Unavailable
        service_unavailable => SERVICE_UNAVAILABLE;
        /// 504 Gateway Timeout
        gateway_timeout => GATEWAY_TIMEOUT;
        /// 505 HTTP Version Not Supported
        http_version_not_supported => HTTP_VERSION_NOT_SUPPORTED;
        /// 506 Variant Also Negotiates
        variant_also_negotiates => VARIANT_ALSO_NEGOTIATES;
        /// 510 Not Extended
        not_extended => NOT_EXTENDED;
        /// 511 Network Authentication Required
        network_authentication_required => NETWORK_AUTHENTICATION_REQUIRED;
        /// 202 Accepted
        accepted => ACCEPTED;
        /// 204 No Content
        no_content => NO_CONTENT;
        /// 300 Multiple Choices
        multiple_choices => MULTIPLE_CHOICES;
    }

    /// 201 Created with `Location`.
    #[must_use]
    pub fn created(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED).with_header(header::LOCATION, location)
    }

    /// 202 Accepted with `Location`.
    #[must_use]
    pub fn accepted_at(location: impl Into<String>) -> Self {
        Self::accepted().with_header(header::LOCATION, location)
    }

    /// 204 No Content with one extra formatter.
    #[must_use]
    pub fn no_content_with<F>(formatter: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), ResultError> + Send + 'static,
    {
        Self::no_content().add_formatter(formatter)
    }

    /// 300 Multiple Choices with the preferred choice in `Location`.
    #[must_use]
    pub fn multiple_choices_with_preferred(location: impl Into<String>) -> Self {
        Self::multiple_choices().with_header(header::LOCATION, location)
    }

    /// 301 Moved Permanently
    #[must_use]
    pub fn moved_permanently(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::MOVED_PERMANENTLY).with_header(header::LOCATION, location)
    }

    /// 302 Found
    #[must_use]
    pub fn found(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FOUND).with_header(header::LOCATION, location)
    }

    /// 303 See Other
    #[must_use]
    pub fn see_other(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::SEE_OTHER).with_header(header::LOCATION, location)
    }

    /// 307 Temporary Redirect
    #[must_use]
    pub fn temporary_redirect(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::TEMPORARY_REDIRECT).with_header(header::LOCATION, location)
    }

    /// 308 Permanent Redirect
    #[must_use]
    pub fn permanent_redirect(location: impl Into<String>) -> Self {
        Self::with_status(StatusCode::PERMANENT_REDIRECT).with_header(header::LOCATION, location)
    }

    /// 400 Bad Request listing validation failures.
    #[must_use]
    pub fn bad_request_with(
        message: Option<String>,
        failures: Vec<ValidationFailure>,
    ) -> JsonResult<C, Vec<ValidationFailure>> {
        Self::bad_request().as_json_optional(Some(failures), message)
    }

    /// 401 Unauthorized with a `WWW-Authenticate` challenge.
    #[must_use]
    pub fn unauthorized(www_authenticate: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED).with_header(header::WWW_AUTHENTICATE, www_authenticate)
    }

    /// 407 Proxy Authentication Required with a `Proxy-Authenticate` challenge.
    #[must_use]
    pub fn proxy_authentication_required(proxy_authenticate: impl Into<String>) -> Self {
        Self::with_status(StatusCode::PROXY_AUTHENTICATION_REQUIRED)
            .with_header(header::PROXY_AUTHENTICATE, proxy_authenticate)
    }

    /// 408 Request Timeout, optionally asking the client to close the
    /// connection.
    #[must_use]
    pub fn request_timeout(close_connection: bool) -> Self {
        let result = Self::with_status(StatusCode::REQUEST_TIMEOUT);
        if close_connection {
            result.with_header(header::CONNECTION, "close")
        } else {
            result
        }
    }

    /// 416 Range Not Satisfiable with `Content-Range`.
    #[must_use]
    pub fn range_not_satisfiable(content_range: impl Into<String>) -> Self {
        Self::with_status(StatusCode::RANGE_NOT_SATISFIABLE)
            .with_header(header::CONTENT_RANGE, content_range)
    }

    /// 501 Not Implemented with `Retry-After`.
    #[must_use]
    pub fn not_implemented_retry_after(retry_after: impl Into<String>) -> Self {
        Self::not_implemented().with_header(header::RETRY_AFTER, retry_after)
    }
}

impl ActionResult {
    fn location_for_route(self, route_name: String, values: RouteValues) -> Self {
        self.add_formatter(move |ctx: &mut ActionContext| {
            let url = ctx.url_for(&route_name, &values)?;
            let value = HeaderValue::try_from(url).map_err(|source| ResultError::InvalidHeader {
                name: header::LOCATION,
                source,
            })?;
            ctx.response_mut().headers_mut().insert(header::LOCATION, value);
            Ok(())
        })
    }

    /// 201 Created with `Location` generated from a named route.
    #[must_use]
    pub fn created_at_route(route_name: impl Into<String>, values: RouteValues) -> Self {
        Self::with_status(StatusCode::CREATED).location_for_route(route_name.into(), values)
    }

    /// 202 Accepted with `Location` generated from a named route.
    #[must_use]
    pub fn accepted_at_route(route_name: impl Into<String>, values: RouteValues) -> Self {
        Self::accepted().location_for_route(route_name.into(), values)
    }

    /// 300 Multiple Choices with the preferred `Location` generated from a
    /// named route.
    #[must_use]
    pub fn multiple_choices_with_preferred_route(
        route_name: impl Into<String>,
        values: RouteValues,
    ) -> Self {
        Self::multiple_choices().location_for_route(route_name.into(), values)
    }
}

/// A result that writes the standard JSON envelope.
pub struct JsonResult<C, T> {
    result: ApiResult<C>,
    data: Option<T>,
    message: Option<String>,
}

impl<C, T: fmt::Debug> fmt::Debug for JsonResult<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonResult")
            .field("result", &self.result)
            .field("data", &self.data)
            .field("message", &self.message)
            .finish()
    }
}

impl<C: ResultContext, T> JsonResult<C, T> {
    const fn new(result: ApiResult<C>, data: Option<T>, message: Option<String>) -> Self {
        Self {
            result,
            data,
            message,
        }
    }

    /// Replace the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replace the payload, possibly changing its type.
    #[must_use]
    pub fn with_data<U>(self, data: U) -> JsonResult<C, U> {
        JsonResult::new(self.result, Some(data), self.message)
    }

    /// Replace the status code.
    #[must_use]
    pub fn with_status_code(mut self, status: StatusCode) -> Self {
        self.result = self.result.with_status_code(status);
        self
    }

    /// Append a formatter.
    #[must_use]
    pub fn add_formatter<F>(mut self, formatter: F) -> Self
    where
        F: FnOnce(&mut C) -> Result<(), ResultError> + Send + 'static,
    {
        self.result = self.result.add_formatter(formatter);
        self
    }

    /// The status code, if set.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        self.result.status_code()
    }

    /// The payload.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl<C: ResultContext, T: Serialize> JsonResult<C, T> {
    /// Set the status, run every formatter, then write the envelope.
    ///
    /// # Errors
    ///
    /// See [`ApiResult::execute`]; additionally
    /// [`ResultError::Serialization`] if the payload cannot be serialized.
    pub fn execute(self, context: &mut C) -> Result<(), ResultError> {
        self.result.execute(context)?;

        let envelope = Envelope {
            data: self.data,
            message: self.message,
        };
        let options = *context.json_options();
        let body = options.to_vec(&envelope)?;
        context.response_mut().set_body(options.content_type(), body);

        Ok(())
    }

    /// Execute against `context` and produce the response.
    ///
    /// # Errors
    ///
    /// See [`JsonResult::execute`].
    pub fn respond(self, mut context: C) -> Result<Response, ResultError> {
        self.execute(&mut context)?;
        Ok(context.into_sink().into_response())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::context::RequestHead;
    use crate::json::JsonOptions;
    use crate::routes::RouteTable;
    use axum::http::{HeaderMap, Method, Uri};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    fn http_context() -> HttpContext {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("api.example.com"));
        HttpContext::new(
            RequestHead {
                method: Method::POST,
                uri: Uri::from_static("/users"),
                headers,
            },
            Arc::new(JsonOptions::compact()),
        )
    }

    fn action_context() -> ActionContext {
        ActionContext::new(
            http_context(),
            Arc::new(RouteTable::new().with_route("get-user", "/users/{id}")),
        )
    }

    fn body_json(context: &impl ResultContext) -> Value {
        serde_json::from_slice(context.response().body().unwrap()).unwrap()
    }

    #[test]
    fn test_missing_status_fails() {
        let mut context = http_context();
        let result = HttpResult::new(None);

        assert!(matches!(
            result.execute(&mut context),
            Err(ResultError::StatusCodeRequired)
        ));
        assert_eq!(context.response().status(), None);
        assert_eq!(
            ResultError::StatusCodeRequired.to_string(),
            "Status code is required."
        );
    }

    #[test]
    fn test_status_only_sets_status() {
        let mut context = http_context();
        HttpResult::ok().execute(&mut context).unwrap();

        assert_eq!(context.response().status(), Some(StatusCode::OK));
        assert!(context.response().headers().is_empty());
        assert!(context.response().body().is_none());
    }

    #[test]
    fn test_with_status_code_overrides() {
        let result = HttpResult::new(None).with_status_code(StatusCode::IM_A_TEAPOT);
        assert_eq!(result.status_code(), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(HttpResult::see_other("/x").status_code(), Some(StatusCode::SEE_OTHER));
    }

    #[test]
    fn test_formatters_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let (first, second) = (Arc::clone(&order), Arc::clone(&order));
        let mut context = http_context();

        HttpResult::accepted()
            .add_formatter(move |_| {
                first.lock().unwrap().push(1);
                Ok(())
            })
            .add_formatter(move |_| {
                second.lock().unwrap().push(2);
                Ok(())
            })
            .execute(&mut context)
            .unwrap();

        assert_eq!(*order.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_failing_formatter_aborts_before_body() {
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let mut context = http_context();

        let result = HttpResult::ok()
            .add_formatter(|_| Err(ResultError::Formatter("boom".to_string())))
            .add_formatter(move |_| {
                *flag.lock().unwrap() = true;
                Ok(())
            })
            .as_json_with(json!({ "id": 1 }))
            .execute(&mut context);

        assert!(matches!(result, Err(ResultError::Formatter(message)) if message == "boom"));
        assert!(!*ran.lock().unwrap());
        assert!(context.response().body().is_none());
    }

    #[test]
    fn test_json_envelope() {
        let mut context = http_context();
        HttpResult::ok()
            .as_json_with_message(json!({ "name": "Ada" }), "Loaded.")
            .execute(&mut context)
            .unwrap();

        assert_eq!(
            body_json(&context),
            json!({ "data": { "name": "Ada" }, "message": "Loaded." })
        );
        assert_eq!(
            context.response().headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }

    #[test]
    fn test_empty_envelope_has_null_members() {
        let mut context = http_context();
        HttpResult::not_found().as_json().execute(&mut context).unwrap();

        assert_eq!(context.response().status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(body_json(&context), json!({ "data": null, "message": null }));
    }

    #[test]
    fn test_with_data_and_message() {
        let result = HttpResult::ok().as_json().with_data(5).with_message("five");
        assert_eq!(result.data(), Some(&5));
        assert_eq!(result.message(), Some("five"));
    }

    #[test]
    fn test_location_constructors() {
        for (result, status) in [
            (HttpResult::created("/users/1"), StatusCode::CREATED),
            (HttpResult::accepted_at("/users/1"), StatusCode::ACCEPTED),
            (HttpResult::multiple_choices_with_preferred("/users/1"), StatusCode::MULTIPLE_CHOICES),
            (HttpResult::moved_permanently("/users/1"), StatusCode::MOVED_PERMANENTLY),
            (HttpResult::found("/users/1"), StatusCode::FOUND),
            (HttpResult::see_other("/users/1"), StatusCode::SEE_OTHER),
            (HttpResult::temporary_redirect("/users/1"), StatusCode::TEMPORARY_REDIRECT),
            (HttpResult::permanent_redirect("/users/1"), StatusCode::PERMANENT_REDIRECT),
        ] {
            let mut context = http_context();
            result.execute(&mut context).unwrap();

            assert_eq!(context.response().status(), Some(status));
            assert_eq!(context.response().headers()[header::LOCATION], "/users/1");
        }
    }

    #[test]
    fn test_challenge_and_range_headers() {
        let mut context = http_context();
        HttpResult::unauthorized("Bearer").execute(&mut context).unwrap();
        assert_eq!(context.response().headers()[header::WWW_AUTHENTICATE], "Bearer");

        let mut context = http_context();
        HttpResult::proxy_authentication_required("Basic")
            .execute(&mut context)
            .unwrap();
        assert_eq!(context.response().headers()[header::PROXY_AUTHENTICATE], "Basic");

        let mut context = http_context();
        HttpResult::range_not_satisfiable("bytes */1000")
            .execute(&mut context)
            .unwrap();
        assert_eq!(context.response().headers()[header::CONTENT_RANGE], "bytes */1000");

        let mut context = http_context();
        HttpResult::not_implemented_retry_after("120")
            .execute(&mut context)
            .unwrap();
        assert_eq!(context.response().status(), Some(StatusCode::NOT_IMPLEMENTED));
        assert_eq!(context.response().headers()[header::RETRY_AFTER], "120");
    }

    #[test]
    fn test_request_timeout_connection_close() {
        let mut context = http_context();
        HttpResult::request_timeout(true).execute(&mut context).unwrap();
        assert_eq!(context.response().headers()[header::CONNECTION], "close");

        let mut context = http_context();
        HttpResult::request_timeout(false).execute(&mut context).unwrap();
        assert!(context.response().headers().get(header::CONNECTION).is_none());
    }

    #[test]
    fn test_no_content_with_formatter() {
        let mut context = http_context();
        HttpResult::no_content_with(|ctx| {
            ctx.response_mut()
                .headers_mut()
                .insert(header::ETAG, HeaderValue::from_static("\"v2\""));
            Ok(())
        })
        .execute(&mut context)
        .unwrap();

        assert_eq!(context.response().status(), Some(StatusCode::NO_CONTENT));
        assert_eq!(context.response().headers()[header::ETAG], "\"v2\"");
    }

    #[test]
    fn test_invalid_header_value() {
        let mut context = http_context();
        let result = HttpResult::created("/users/\n1").execute(&mut context);

        assert!(matches!(
            result,
            Err(ResultError::InvalidHeader { name, .. }) if name == header::LOCATION
        ));
    }

    #[test]
    fn test_created_at_route_is_absolute() {
        let mut context = action_context();
        ActionResult::created_at_route("get-user", RouteValues::new().with("id", 9))
            .execute(&mut context)
            .unwrap();

        assert_eq!(context.response().status(), Some(StatusCode::CREATED));
        assert_eq!(
            context.response().headers()[header::LOCATION],
            "http://api.example.com/users/9"
        );
    }

    #[test]
    fn test_route_constructors_fail_without_match() {
        for result in [
            ActionResult::created_at_route("missing", RouteValues::new()),
            ActionResult::accepted_at_route("get-user", RouteValues::new()),
            ActionResult::multiple_choices_with_preferred_route("missing", RouteValues::new()),
        ] {
            let mut context = action_context();
            let error = result.execute(&mut context).unwrap_err();

            assert!(matches!(error, ResultError::NoRouteMatched));
            assert_eq!(error.to_string(), "No routes matched the supplied values.");
        }
    }

    #[test]
    fn test_bad_request_with_failures() {
        let mut context = http_context();
        HttpResult::bad_request_with(
            Some("Request model is invalid.".to_string()),
            vec![ValidationFailure::new("Name is required.")],
        )
        .execute(&mut context)
        .unwrap();

        assert_eq!(context.response().status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            body_json(&context),
            json!({
                "data": [{ "message": "Name is required." }],
                "message": "Request model is invalid."
            })
        );
    }

    #[test]
    fn test_respond_builds_response() {
        let response = HttpResult::ok()
            .as_json_with(json!([1, 2]))
            .respond(http_context())
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
    }
}
