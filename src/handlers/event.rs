//! Serverless event envelopes.
//!
//! The platform hands each invocation a JSON [`Request`] and expects a JSON
//! [`Response`] back; field names follow the platform's camelCase convention.

use crate::core::fields::Payload;
use crate::errors::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// HTTP verb of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Options,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other(String),
}

impl Method {
    /// Parses a verb case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPTIONS" => Self::Options,
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Options => "OPTIONS",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Other(other) => other,
        };
        f.write_str(name)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// Inbound invocation envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default = "default_method")]
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Set when the platform base64-encoded `body` for transport.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            http_method: default_method(),
            body: None,
            query_string_parameters: None,
            headers: None,
            is_base64_encoded: false,
        }
    }
}

impl Request {
    #[must_use]
    pub fn method(&self) -> Method {
        Method::parse(&self.http_method)
    }

    /// Raw query parameter value.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }

    /// Header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// True when the envelope carries no body or a blank one.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.trim().is_empty())
    }

    /// Body bytes with the transport-level base64 layer removed.
    ///
    /// # Errors
    /// Returns a decode error if `isBase64Encoded` is set but the body is not base64.
    pub fn body_bytes(&self) -> Result<Vec<u8>> {
        let Some(body) = self.body.as_deref() else {
            return Ok(Vec::new());
        };
        if self.is_base64_encoded {
            let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            Ok(STANDARD.decode(compact)?)
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }

    /// Parses the body as a JSON object.
    ///
    /// A missing body yields an empty object. A body that is base64-encoded JSON
    /// without the transport flag set is unwrapped as well.
    ///
    /// # Errors
    /// Returns a validation error when the body is not JSON or not an object.
    pub fn json_body(&self) -> Result<Payload> {
        let bytes = self.body_bytes()?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload::new());
        }

        let value = match serde_json::from_slice::<JsonValue>(&bytes) {
            Ok(value) => value,
            Err(err) => {
                let inner = decode_base64_json(&bytes).ok_or_else(|| {
                    Error::validation(format!("Invalid JSON: {err}"))
                })?;
                debug!("Request body was base64-encoded JSON");
                inner
            }
        };

        match value {
            JsonValue::Object(map) => Ok(map),
            _ => Err(Error::validation("Request body must be a JSON object")),
        }
    }
}

fn decode_base64_json(bytes: &[u8]) -> Option<JsonValue> {
    let compact: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD.decode(compact).ok()?;
    serde_json::from_slice(&decoded).ok()
}

/// Outbound invocation envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl Response {
    /// Parses the body back into JSON, mainly for callers inspecting a reply.
    ///
    /// # Errors
    /// Returns a JSON error when the body is not valid JSON.
    pub fn json_body(&self) -> Result<JsonValue> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}
