//! Response shaping.
//!
//! Every handler outcome, success or failure, leaves through this module so that
//! status codes, CORS headers and error bodies stay uniform across resources.

use super::event::Response;
use crate::errors::Error;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Seconds a browser may cache a preflight answer.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Generic 500 message; details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

fn base_headers(content_type: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ("Content-Type".to_string(), content_type.to_string()),
    ])
}

impl Response {
    /// Text body under the given content type.
    #[must_use]
    pub fn raw(status: u16, content_type: &str, body: impl Into<String>) -> Self {
        Self {
            status_code: status,
            headers: base_headers(content_type),
            body: body.into(),
            is_base64_encoded: false,
        }
    }

    /// JSON-serialised body.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(text) => Self::raw(status, JSON_CONTENT_TYPE, text),
            Err(err) => Self::from_error(&Error::Json(err)),
        }
    }

    #[must_use]
    pub fn ok<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(200, body)
    }

    #[must_use]
    pub fn created<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(201, body)
    }

    /// Empty 200 answering a CORS preflight.
    #[must_use]
    pub fn preflight(methods: &str, allowed_headers: &str) -> Self {
        let headers = BTreeMap::from([
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ("Access-Control-Allow-Methods".to_string(), methods.to_string()),
            ("Access-Control-Allow-Headers".to_string(), allowed_headers.to_string()),
            ("Access-Control-Max-Age".to_string(), PREFLIGHT_MAX_AGE.to_string()),
        ]);
        Self {
            status_code: 200,
            headers,
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    /// Maps an error onto its status code and caller-facing body.
    ///
    /// Client errors echo their message. Upstream failures relay the CDN status and
    /// text. Everything else becomes a 500 carrying only [`Error::kind`].
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Validation { .. } => {
                debug!(error = %err, "Rejected request");
                Self::json(400, &json!({ "error": err.to_string() }))
            }
            Error::NotFound { .. } => {
                debug!(error = %err, "Record not found");
                Self::json(404, &json!({ "error": err.to_string() }))
            }
            Error::MethodNotSupported { method } => {
                warn!(%method, "Method not allowed");
                Self::json(405, &json!({ "error": "Method not allowed" }))
            }
            Error::Upstream { status, body } => {
                warn!(status, "Upload endpoint failure relayed to caller");
                let relayed = if (400..=599).contains(status) { *status } else { 502 };
                Self::json(
                    relayed,
                    &json!({ "error": "Upload failed", "status": status, "details": body }),
                )
            }
            _ => {
                error!(error = %err, kind = err.kind(), "Request failed");
                Self::raw(
                    500,
                    JSON_CONTENT_TYPE,
                    json!({ "error": INTERNAL_ERROR_MESSAGE, "type": err.kind() }).to_string(),
                )
            }
        }
    }
}
