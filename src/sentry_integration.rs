//! Sentry integration for qboe-rs errors.
//!
//! This module provides integration with Sentry for error reporting and
//! breadcrumb capture. It is only available when the `sentry` feature is
//! enabled:
//!
//! ```toml
//! [dependencies]
//! qboe-rs = { version = "0.1", features = ["sentry"] }
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

/// Convert a qboe-rs Error into a Sentry breadcrumb.
///
/// This implementation captures relevant context from qboe-rs errors as
/// Sentry breadcrumbs, making it easy to track gateway call history.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let (category, message, data) = match error {
            Error::Request(source) => (
                "http.request",
                format!("HTTP request error: {source}"),
                BTreeMap::new(),
            ),

            Error::Http { status, reason } => {
                let mut data = BTreeMap::new();
                data.insert("status_code".to_string(), Value::from(status.as_u16()));
                data.insert("reason".to_string(), Value::from(reason.clone()));
                (
                    "http.response",
                    format!("gateway returned {status}"),
                    data,
                )
            }

            Error::Credentials { kind, path, problem } => {
                let mut data = BTreeMap::new();
                data.insert(
                    "path".to_string(),
                    Value::from(path.display().to_string()),
                );
                (
                    "qboe.config",
                    format!("{kind} file {problem}"),
                    data,
                )
            }

            Error::Tls(problem) => ("qboe.tls", problem.to_string(), BTreeMap::new()),

            Error::Status { code, message } => {
                let mut data = BTreeMap::new();
                data.insert("status_code".to_string(), Value::from(*code));
                data.insert("message".to_string(), Value::from(message.clone()));
                (
                    "qboe.protocol",
                    format!("gateway error status {code}"),
                    data,
                )
            }

            Error::Item(message) => ("qboe.validation", message.clone(), BTreeMap::new()),

            Error::MissingTicket => (
                "qboe.protocol",
                "signon response carried neither a ticket nor an error".to_string(),
                BTreeMap::new(),
            ),

            Error::Document(source) => (
                "qboe.protocol",
                format!("unparseable response document: {source}"),
                BTreeMap::new(),
            ),

            Error::UnexpectedResponse(detail) => {
                ("qboe.protocol", detail.clone(), BTreeMap::new())
            }

            Error::Envelope(source) => (
                "qboe.encode",
                format!("request encoding failed: {source}"),
                BTreeMap::new(),
            ),

            Error::InvalidEndpoint => (
                "qboe.config",
                "Invalid endpoint URL".to_string(),
                BTreeMap::new(),
            ),

            Error::RecoveryStalled { rounds, detail } => {
                let mut data = BTreeMap::new();
                data.insert("rounds".to_string(), Value::from(*rounds as u64));
                ("qboe.recovery", detail.clone(), data)
            }
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}
