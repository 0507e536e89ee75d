//! Error types for the verification client.
//!
//! # Design
//! `Authentication` gets a dedicated variant because a 401 means the key or
//! secret is wrong, which callers handle differently from "the service
//! returned something unexpected." Every other non-2xx response lands in
//! `Http` with the raw status code and body.

use thiserror::Error;

/// Errors returned by `VerificationClient` and its helpers.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Credentials could not be resolved at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The service returned 401.
    #[error("authentication failed: invalid API key or secret")]
    Authentication,

    /// The service returned a non-2xx status other than 401.
    #[error("Unexpected HTTP response (code={status})")]
    Http { status: u16, body: String },

    /// The body claimed to be JSON but could not be decoded.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint or request URL could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// The request never produced a response (connect, TLS, I/O, timeout).
    #[error("transport failure: {0}")]
    Transport(String),
}

impl VerifyError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, VerifyError::Authentication)
    }

    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            VerifyError::Authentication => Some(401),
            VerifyError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for the verify-core crate.
pub type Result<T> = std::result::Result<T, VerifyError>;
