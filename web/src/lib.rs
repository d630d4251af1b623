//! Axum integration for the Company Product web API.
//!
//! This crate holds everything between a request arriving and a JSON
//! envelope leaving:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  TraceIdLayer                           │  ← X-Trace-Id, request span
//! │  handle_exceptions + CatchPanicLayer    │  ← 500 envelopes, panics
//! ├─────────────────────────────────────────┤
//! │  Validated<T>                           │  ← bind + validate, 400 envelope
//! │  Handler                                │
//! │  ApiResult / JsonResult                 │  ← status + ordered formatters
//! └─────────────────────────────────────────┘
//! ```
//!
//! Every JSON response has the shape `{ "data": ..., "message": ... }`.
//!
//! # Example
//!
//! ```ignore
//! use webapi_web::{ActionContext, ActionResult, AppError};
//!
//! async fn get_order(ctx: ActionContext) -> Result<Response, AppError> {
//!     let order = load_order().await?;
//!     Ok(ActionResult::ok()
//!         .as_json_with_message(order, "Order loaded.")
//!         .respond(ctx)?)
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod context;
pub mod error;
pub mod exception;
pub mod extractors;
pub mod json;
pub mod middleware;
pub mod results;
pub mod routes;
pub mod unhandled;
pub mod validation;

// Re-export key types for convenience
pub use cache::MemoryCache;
pub use context::{ActionContext, HttpContext, RequestHead, ResponseSink, ResultContext};
pub use error::{AppError, ErrorMessage, UnhandledException};
pub use exception::ExceptionData;
pub use extractors::{RequestTime, TraceId};
pub use json::{JSON_CONTENT_TYPE, JsonOptions};
pub use middleware::{TRACE_ID_HEADER, TraceIdLayer, trace_id_layer};
pub use results::{
    ActionResult, ApiResult, Envelope, Formatter, HttpResult, JsonResult, ResultError,
};
pub use routes::{RouteTable, RouteValues};
pub use unhandled::{
    ExceptionHandler, UNHANDLED_EXCEPTION_MESSAGE, handle_exceptions, panic_response,
};
pub use validation::{
    INVALID_MODEL_MESSAGE, Validate, Validated, ValidationError, ValidationFailure,
    ValidationRejection,
};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
