//! Process-wide JSON serialization settings.
//!
//! One [`JsonOptions`] is built at startup and shared by `Arc` between handler
//! result rendering and the unhandled exception layer, so every body written
//! by the API has the same shape.
//!
//! Property and enum naming is camelCase through `#[serde(rename_all)]` on the
//! payload types; unknown properties are ignored on read because payload types
//! do not use `deny_unknown_fields`.

use axum::http::HeaderValue;
use serde::Serialize;

/// `Content-Type` written with every envelope.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// JSON writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    pretty: bool,
}

impl JsonOptions {
    /// Pretty-printed output.
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    /// Whether output is indented.
    #[must_use]
    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Serialize `value` with these settings.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be represented as JSON
    /// (for example a map with non-string keys).
    pub fn to_vec<T>(&self, value: &T) -> Result<Vec<u8>, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        }
    }

    /// The `Content-Type` header value for bodies written with these settings.
    #[must_use]
    pub const fn content_type(&self) -> HeaderValue {
        HeaderValue::from_static(JSON_CONTENT_TYPE)
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self::new()
    }
}
