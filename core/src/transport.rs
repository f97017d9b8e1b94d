//! The seam between the client and the network.
//!
//! # Design
//! [`Transport::execute`] is infallible: anything that goes wrong below HTTP
//! is reported as an [`HttpResponse`] with status `0` and an `error` payload.
//! [`UreqTransport`] is the blocking implementation used by default; tests
//! substitute their own.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a resolved request and reports the outcome as data.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> HttpResponse;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// 4xx/5xx statuses are returned as data, not as errors, so the decoders see
/// every service answer.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Same as [`UreqTransport::new`] with an overall per-request deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let url = request.url.as_str();
        let body = request.body.as_ref().map(|value| value.to_string());

        let mut response = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &request.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(url), &request.headers).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(url), &request.headers).send_empty()
            }
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let raw = response.body_mut().read_to_string()?;

        Ok(HttpResponse::new(status, headers, HttpResponse::parse_body(&raw)))
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        debug!(method = %request.method, url = %request.url, "sending request");
        match self.send(request) {
            Ok(response) => {
                debug!(status = response.status, url = %request.url, "received response");
                response
            }
            Err(error) => {
                warn!(%error, url = %request.url, "transport failure");
                HttpResponse::transport_failure(error)
            }
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connection_refused_becomes_status_zero() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://127.0.0.1:{port}/v1/workouts/count"),
            headers: Vec::new(),
            body: None,
        };
        let response = UreqTransport::new().execute(&request);
        assert_eq!(response.status, 0);
        assert!(!response.is_success());
        assert!(response.data["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}
