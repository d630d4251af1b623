//! Contexts a result executes against.
//!
//! A result never touches axum types directly. It writes into a
//! [`ResponseSink`] reached through the [`ResultContext`] trait, and two thin
//! adapters supply that capability:
//!
//! - [`HttpContext`]: the raw request head plus the sink. Usable anywhere,
//!   including middleware.
//! - [`ActionContext`]: an [`HttpContext`] plus the [`RouteTable`], so results
//!   built for handlers can also generate URLs.
//!
//! Both are extractors, pulling the shared [`JsonOptions`] (and route table)
//! out of application state via `FromRef`.

use crate::json::JsonOptions;
use crate::results::ResultError;
use crate::routes::{RouteTable, RouteValues};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header, request::Parts},
    response::Response,
};
use std::convert::Infallible;
use std::sync::Arc;

/// The parts of the incoming request a result may read.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// Request method
    pub method: Method,
    /// Request target
    pub uri: Uri,
    /// Request headers
    pub headers: HeaderMap,
}

impl RequestHead {
    /// Copy the head out of request parts.
    #[must_use]
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
        }
    }

    /// Scheme the client used: the URI scheme, then `X-Forwarded-Proto`,
    /// then `http`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.uri
            .scheme_str()
            .or_else(|| {
                self.headers
                    .get("x-forwarded-proto")
                    .and_then(|v| v.to_str().ok())
            })
            .unwrap_or("http")
    }

    /// Host the client addressed: the `Host` header, then the URI authority.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.uri.authority().map(axum::http::uri::Authority::as_str))
    }
}

/// The response being built.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ResponseSink {
    /// Set the status code.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// The status code, if set.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace the body and its content type.
    pub fn set_body(&mut self, content_type: HeaderValue, body: Vec<u8>) {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = Some(body);
    }

    /// The body, if written.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Convert into an axum response. An unset status becomes 200.
    #[must_use]
    pub fn into_response(self) -> Response {
        let mut response = Response::new(self.body.map_or_else(Body::empty, Body::from));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

/// Capability a result needs from its environment.
pub trait ResultContext: Send + Sized + 'static {
    /// The incoming request.
    fn request(&self) -> &RequestHead;

    /// The response being built.
    fn response(&self) -> &ResponseSink;

    /// The response being built, mutably.
    fn response_mut(&mut self) -> &mut ResponseSink;

    /// Shared serializer settings.
    fn json_options(&self) -> &JsonOptions;

    /// Give up the context, keeping the built response.
    fn into_sink(self) -> ResponseSink;
}

/// Low-level context: request head and response only.
#[derive(Debug)]
pub struct HttpContext {
    request: RequestHead,
    response: ResponseSink,
    json: Arc<JsonOptions>,
}

impl HttpContext {
    /// Start a response for `request`.
    #[must_use]
    pub fn new(request: RequestHead, json: Arc<JsonOptions>) -> Self {
        Self {
            request,
            response: ResponseSink::default(),
            json,
        }
    }

    /// Start a response for the request described by `parts`.
    #[must_use]
    pub fn from_parts(parts: &Parts, json: Arc<JsonOptions>) -> Self {
        Self::new(RequestHead::from_parts(parts), json)
    }
}

impl ResultContext for HttpContext {
    fn request(&self) -> &RequestHead {
        &self.request
    }

    fn response(&self) -> &ResponseSink {
        &self.response
    }

    fn response_mut(&mut self) -> &mut ResponseSink {
        &mut self.response
    }

    fn json_options(&self) -> &JsonOptions {
        &self.json
    }

    fn into_sink(self) -> ResponseSink {
        self.response
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for HttpContext
where
    Arc<JsonOptions>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts, Arc::<JsonOptions>::from_ref(state)))
    }
}

/// Handler context: an [`HttpContext`] that can also generate URLs.
#[derive(Debug)]
pub struct ActionContext {
    http: HttpContext,
    routes: Arc<RouteTable>,
}

impl ActionContext {
    /// Wrap `http` with route generation.
    #[must_use]
    pub const fn new(http: HttpContext, routes: Arc<RouteTable>) -> Self {
        Self { http, routes }
    }

    /// The known routes.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Absolute URL for `route_name`, built from the request's scheme and
    /// `Host`. Falls back to the bare path when the host is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`ResultError::NoRouteMatched`] if the route is unknown or a
    /// placeholder has no value.
    pub fn url_for(&self, route_name: &str, values: &RouteValues) -> Result<String, ResultError> {
        let path = self
            .routes
            .resolve(route_name, values)
            .ok_or(ResultError::NoRouteMatched)?;
        let request = self.http.request();

        Ok(match request.host() {
            Some(host) => format!("{}://{host}{path}", request.scheme()),
            None => path,
        })
    }
}

impl ResultContext for ActionContext {
    fn request(&self) -> &RequestHead {
        self.http.request()
    }

    fn response(&self) -> &ResponseSink {
        self.http.response()
    }

    fn response_mut(&mut self) -> &mut ResponseSink {
        self.http.response_mut()
    }

    fn json_options(&self) -> &JsonOptions {
        self.http.json_options()
    }

    fn into_sink(self) -> ResponseSink {
        self.http.into_sink()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActionContext
where
    Arc<JsonOptions>: FromRef<S>,
    Arc<RouteTable>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(
            HttpContext::from_parts(parts, Arc::<JsonOptions>::from_ref(state)),
            Arc::<RouteTable>::from_ref(state),
        ))
    }
}
