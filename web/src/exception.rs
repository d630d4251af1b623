//! Serializable error chains.
//!
//! [`ExceptionData`] is a singly linked snapshot of an error and its causes,
//! written into response bodies in development environments.

use serde::{Deserialize, Serialize};
use std::backtrace::BacktraceStatus;
use std::error::Error;

/// Maximum number of nodes kept when unwinding a `source()` chain.
pub const MAX_EXCEPTION_DEPTH: usize = 32;

/// One error in a chain, plus the error that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionData {
    /// The error's display text
    pub message: String,
    /// Captured backtrace, when one exists
    pub stack_trace: Option<String>,
    /// The underlying cause
    pub inner_exception: Option<Box<ExceptionData>>,
}

impl ExceptionData {
    /// A single node with no cause.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: None,
            inner_exception: None,
        }
    }

    /// Unwind `error` and its `source()` chain.
    ///
    /// At most [`MAX_EXCEPTION_DEPTH`] nodes are kept; deeper causes are
    /// dropped.
    #[must_use]
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut messages = Vec::new();
        let mut current = Some(error);

        while let Some(err) = current {
            if messages.len() == MAX_EXCEPTION_DEPTH {
                break;
            }
            messages.push(err.to_string());
            current = err.source();
        }

        let mut chain: Option<Box<Self>> = None;
        for message in messages.into_iter().rev() {
            chain = Some(Box::new(Self {
                message,
                stack_trace: None,
                inner_exception: chain,
            }));
        }

        chain.map_or_else(|| Self::from_message(error.to_string()), |node| *node)
    }

    /// Unwind an `anyhow` error, attaching its backtrace to the outermost node
    /// if one was captured (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    #[must_use]
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let root: &(dyn Error + 'static) = &**error;
        let mut data = Self::from_error(root);

        let backtrace = error.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            data.stack_trace = Some(backtrace.to_string());
        }

        data
    }

    /// Number of nodes in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self;
        while let Some(inner) = &node.inner_exception {
            depth += 1;
            node = inner;
        }
        depth
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use anyhow::Context as _;
    use std::fmt;

    /// Error whose cause is the next level down, `levels` deep.
    #[derive(Debug)]
    struct Nested {
        level: usize,
        inner: Option<Box<Nested>>,
    }

    impl Nested {
        fn new(levels: usize) -> Self {
            (1..levels).fold(Self { level: 0, inner: None }, |inner, level| Self {
                level,
                inner: Some(Box::new(inner)),
            })
        }
    }

    impl fmt::Display for Nested {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "level {}", self.level)
        }
    }

    impl Error for Nested {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.inner.as_deref().map(|e| e as &(dyn Error + 'static))
        }
    }

    #[test]
    fn test_single_error() {
        let error = std::io::Error::other("disk on fire");
        let data = ExceptionData::from_error(&error);

        assert_eq!(data.message, "disk on fire");
        assert_eq!(data.inner_exception, None);
        assert_eq!(data.depth(), 1);
    }

    #[test]
    fn test_chain_order_is_outermost_first() {
        let data = ExceptionData::from_error(&Nested::new(3));

        assert_eq!(data.message, "level 2");
        let inner = data.inner_exception.as_ref().unwrap();
        assert_eq!(inner.message, "level 1");
        assert_eq!(inner.inner_exception.as_ref().unwrap().message, "level 0");
        assert_eq!(data.depth(), 3);
    }

    #[test]
    fn test_depth_is_capped() {
        let data = ExceptionData::from_error(&Nested::new(100));

        assert_eq!(data.depth(), MAX_EXCEPTION_DEPTH);
        assert_eq!(data.message, "level 99");
    }

    #[test]
    fn test_anyhow_context_chain() {
        let error = Err::<(), _>(std::io::Error::other("connection reset"))
            .context("loading profile")
            .unwrap_err();
        let data = ExceptionData::from_anyhow(&error);

        assert_eq!(data.message, "loading profile");
        assert_eq!(
            data.inner_exception.as_ref().unwrap().message,
            "connection reset"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let data = ExceptionData {
            message: "outer".to_string(),
            stack_trace: None,
            inner_exception: Some(Box::new(ExceptionData::from_message("inner"))),
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "outer",
                "stackTrace": null,
                "innerException": {
                    "message": "inner",
                    "stackTrace": null,
                    "innerException": null
                }
            })
        );
    }
}
