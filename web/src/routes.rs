//! Named route templates for URL generation.
//!
//! Routing itself belongs to axum. This table only remembers the path
//! templates of routes that results need to link to (for `Location` headers),
//! keyed by a stable name.
//!
//! Templates use `{name}` placeholders:
//!
//! ```
//! use webapi_web::routes::{RouteTable, RouteValues};
//!
//! let routes = RouteTable::new().with_route("get-user", "/users/{id}");
//! let path = routes.resolve("get-user", &RouteValues::new().with("id", 42));
//! assert_eq!(path.as_deref(), Some("/users/42"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Values substituted into a route template.
///
/// Values with no matching placeholder are appended as a query string, in
/// name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues {
    values: BTreeMap<String, String>,
}

impl RouteValues {
    /// No values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether no values were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Route name to path template.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    templates: HashMap<String, String>,
}

impl RouteTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `template` under `name`, replacing any earlier template.
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.add(name, template);
        self
    }

    /// Register `template` under `name`, replacing any earlier template.
    pub fn add(&mut self, name: impl Into<String>, template: impl Into<String>) {
        self.templates.insert(name.into(), template.into());
    }

    /// The template registered under `name`.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    /// Build the path for `name` from `values`.
    ///
    /// Returns `None` if the route is unknown, a placeholder has no value, or
    /// the template is malformed.
    #[must_use]
    pub fn resolve(&self, name: &str, values: &RouteValues) -> Option<String> {
        let template = self.templates.get(name)?;
        let mut path = String::with_capacity(template.len());
        let mut used = Vec::new();
        let mut rest = template.as_str();

        while let Some(open) = rest.find('{') {
            path.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let close = after_open.find('}')?;
            let parameter = &after_open[..close];
            let value = values.get(parameter)?;

            path.push_str(&urlencoding::encode(value));
            used.push(parameter);
            rest = &after_open[close + 1..];
        }

        if rest.contains('}') {
            return None;
        }
        path.push_str(rest);

        let mut separator = '?';
        for (key, value) in &values.values {
            if used.contains(&key.as_str()) {
                continue;
            }
            path.push(separator);
            path.push_str(&urlencoding::encode(key));
            path.push('=');
            path.push_str(&urlencoding::encode(value));
            separator = '&';
        }

        Some(path)
    }
}
