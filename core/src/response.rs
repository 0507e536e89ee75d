//! Shared interpretation of every verify API response.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, VerifyError};
use crate::http::HttpResponse;

/// Successful response body: decoded JSON, or raw text for any other
/// content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    Json(Value),
    Text(String),
}

impl ParsedResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedResponse::Json(v) => Some(v),
            ParsedResponse::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParsedResponse::Json(_) => None,
            ParsedResponse::Text(t) => Some(t),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            ParsedResponse::Json(v) => Some(v),
            ParsedResponse::Text(_) => None,
        }
    }

    /// Decode into a typed view. A text body is parsed as JSON first.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            ParsedResponse::Json(v) => v,
            ParsedResponse::Text(t) => serde_json::from_str(&t)?,
        };
        Ok(serde_json::from_value(value)?)
    }
}

/// Classify a raw response as success, authentication failure or generic
/// failure.
///
/// 2xx bodies are JSON-decoded only when the primary `Content-Type` token
/// is `application/json`; a missing header counts as non-JSON.
pub fn parse_response(response: HttpResponse) -> Result<ParsedResponse> {
    match response.status {
        200..=299 => {
            if is_json(&response) {
                Ok(ParsedResponse::Json(serde_json::from_str(&response.body)?))
            } else {
                Ok(ParsedResponse::Text(response.body))
            }
        }
        401 => Err(VerifyError::Authentication),
        status => Err(VerifyError::Http {
            status,
            body: response.body,
        }),
    }
}

fn is_json(response: &HttpResponse) -> bool {
    response
        .header("content-type")
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}
