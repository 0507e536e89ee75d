//! Synchronous client for the Nexmo Verify phone-verification API.
//!
//! # Overview
//! `VerificationClient` starts, checks, inspects, cancels and advances
//! verification workflows. Every call merges the caller's parameters with the
//! API credentials, form-encodes them into a GET query or POST body, sends
//! the request through a `Transport`, and classifies the response as parsed
//! data, an authentication failure or a generic HTTP failure.
//!
//! # Design
//! - The client is stateless apart from immutable credentials, an optional
//!   endpoint override and the transport.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   the shared `parse_response`, so the I/O boundary stays explicit.
//! - The transport is injected: `UreqTransport` for the real service,
//!   `StubTransport` for in-memory fakes.
//! - Without an override, requests resolve against the process-wide endpoint
//!   (`set_default_endpoint`), defaulting to `https://api.nexmo.com`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
pub mod transport;
pub mod types;

pub use client::VerificationClient;
pub use config::{
    default_endpoint, reset_default_endpoint, set_default_endpoint, ClientOptions, Credentials,
    DEFAULT_ENDPOINT,
};
pub use error::{Result, VerifyError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{ParamValue, RequestParams};
pub use response::{parse_response, ParsedResponse};
pub use transport::{StubTransport, Transport, UreqTransport};
pub use types::{CheckAttempt, ControlResponse, SearchResponse, StatusResponse};
