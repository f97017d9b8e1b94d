//! HTTP exchange types shared by the request builders, the decoders and the
//! transport.
//!
//! # Design
//! Requests and responses are plain data. Builders never touch the network;
//! a [`Transport`](crate::transport::Transport) turns an `HttpRequest` into an
//! `HttpResponse`, and the decoders in [`response`](crate::response) consume
//! it. Network failures are folded into the response itself (status `0`), so
//! this boundary never produces an `Err`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

/// Status code used for responses that never reached the service.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved HTTP request: absolute URL, merged headers and an
/// optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// An HTTP response described as plain data.
///
/// `data` holds the decoded JSON body, or `Value::String` with the raw text
/// when the body was not JSON. Header names are lower-cased.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub data: Value,
}

impl HttpResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, data: Value) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Response standing in for a request that failed below HTTP (connection
    /// refused, timeout, unreadable body).
    pub fn transport_failure(description: impl fmt::Display) -> Self {
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            headers: BTreeMap::new(),
            data: json!({ "error": description.to_string() }),
        }
    }

    /// Parse a raw body the way the service is expected to answer: JSON when
    /// possible, opaque text otherwise. An empty body maps to `Value::Null`.
    pub fn parse_body(raw: &str) -> Value {
        if raw.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failure_carries_description() {
        let response = HttpResponse::transport_failure("Connection refused");
        assert_eq!(response.status, 0);
        assert!(!response.is_success());
        assert!(response.headers.is_empty());
        assert_eq!(response.data["error"], "Connection refused");
    }

    #[test]
    fn parse_body_falls_back_to_text() {
        assert_eq!(HttpResponse::parse_body(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(
            HttpResponse::parse_body("<html>bad gateway</html>"),
            Value::String("<html>bad gateway</html>".to_string())
        );
        assert_eq!(HttpResponse::parse_body("  "), Value::Null);
    }

    #[test]
    fn success_range_is_2xx() {
        let mk = |status| HttpResponse::new(status, BTreeMap::new(), Value::Null);
        assert!(mk(200).is_success());
        assert!(mk(204).is_success());
        assert!(mk(299).is_success());
        assert!(!mk(199).is_success());
        assert!(!mk(300).is_success());
        assert!(!mk(404).is_success());
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
    }
}
