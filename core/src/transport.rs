//! The seam between request building and the network.
//!
//! # Design
//! `VerificationClient` never decides how bytes reach the service: it hands
//! an `HttpRequest` to whatever `Transport` it was given. `UreqTransport`
//! talks to the real API; `StubTransport` answers from memory and records
//! what it was asked, so tests select a fake explicitly instead of the
//! client sniffing its environment.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use url::Url;

use crate::error::{Result, VerifyError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round trip.
///
/// Non-2xx statuses are responses, not errors: implementations return them
/// as `HttpResponse` values and leave classification to `parse_response`.
/// `Err` is reserved for requests that never got an answer.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).send(request)
    }
}

/// Blocking HTTPS transport backed by a shared `ureq::Agent`.
///
/// Every request carries the API secret, so URLs that are not `https` are
/// refused unless the transport was built with `allow_plain_http`.
/// Redirects are never followed: a 3xx reaches `parse_response` as is.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    allow_plain_http: bool,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UreqTransport {
    /// `timeout` bounds the whole call (connect, send, receive). `None`
    /// leaves ureq's defaults in place.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            allow_plain_http: false,
        }
    }

    /// Also accept `http://` URLs, e.g. for a local mock of the service.
    pub fn allow_plain_http(mut self) -> Self {
        self.allow_plain_http = true;
        self
    }

    fn check_scheme(&self, url: &str) -> Result<()> {
        let scheme = Url::parse(url)?.scheme().to_string();
        match scheme.as_str() {
            "https" => Ok(()),
            "http" if self.allow_plain_http => Ok(()),
            other => Err(VerifyError::Transport(format!(
                "refusing to send credentials over {other}://, only https is allowed"
            ))),
        }
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.check_scheme(&request.url)?;
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name, value);
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name, value);
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| VerifyError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// In-memory transport answering every request with the same response.
///
/// Each request is recorded and can be inspected with `requests()`.
#[derive(Debug)]
pub struct StubTransport {
    response: HttpResponse,
    sent: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new(response: HttpResponse) -> Self {
        Self {
            response,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// 200 with `Content-Type: application/json` and the given body.
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(HttpResponse::new(200, body).with_header("content-type", "application/json"))
    }

    /// Bare status with an empty body.
    pub fn status(status: u16) -> Self {
        Self::new(HttpResponse::new(status, ""))
    }

    /// Requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(self.response.clone())
    }
}
