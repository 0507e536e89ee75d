//! Typed views over common verify API response bodies.
//!
//! # Design
//! The client itself never validates response schemas; these DTOs exist for
//! callers who want fields instead of `serde_json::Value`, via
//! `ParsedResponse::deserialize`. Unknown fields are ignored and everything
//! the service may omit is optional.

use serde::{Deserialize, Serialize};

/// Status code the service uses for "request accepted".
pub const STATUS_OK: &str = "0";

/// Body returned by start and check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl StatusResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Body returned by the control endpoint (cancel / trigger next event).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

impl ControlResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// One code submission recorded against a verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckAttempt {
    pub code: String,
    pub status: String,
}

/// Body returned by search. `status` holds the workflow state, e.g.
/// `IN PROGRESS`, `SUCCESS` or `CANCELLED`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub checks: Vec<CheckAttempt>,
    #[serde(default)]
    pub error_text: Option<String>,
}
