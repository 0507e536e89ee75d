//! Credentials, client options and the process-wide API endpoint.
//!
//! # Design
//! Credential resolution happens once, at construction, and produces an
//! immutable `Credentials` value. Environment access goes through a lookup
//! closure (`Credentials::resolve_with`) so tests can inject values without
//! touching process state.
//!
//! The endpoint is a lock-guarded process default that clients without an
//! explicit override read each time they build a request.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Result, VerifyError};

/// Base URL used when neither the client nor the process overrides it.
pub const DEFAULT_ENDPOINT: &str = "https://api.nexmo.com";

pub const API_KEY_ENV: &str = "NEXMO_API_KEY";
pub const API_SECRET_ENV: &str = "NEXMO_API_SECRET";

static ENDPOINT_OVERRIDE: RwLock<Option<Url>> = RwLock::new(None);

/// The endpoint every client without its own override talks to.
pub fn default_endpoint() -> Url {
    let guard = ENDPOINT_OVERRIDE.read().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref() {
        Some(url) => url.clone(),
        None => Url::parse(DEFAULT_ENDPOINT).expect("DEFAULT_ENDPOINT is a valid URL"),
    }
}

/// Replace the process-wide endpoint. Requests already built keep the URL
/// they resolved.
pub fn set_default_endpoint(endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)?;
    *ENDPOINT_OVERRIDE.write().unwrap_or_else(PoisonError::into_inner) = Some(url);
    Ok(())
}

/// Restore the built-in `https://api.nexmo.com` endpoint.
pub fn reset_default_endpoint() {
    *ENDPOINT_OVERRIDE.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// API key and secret sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Read both values from `NEXMO_API_KEY` / `NEXMO_API_SECRET`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Explicit values first, then the process environment.
    pub fn resolve(key: Option<String>, secret: Option<String>) -> Result<Self> {
        Self::resolve_with(key, secret, |name| std::env::var(name).ok())
    }

    /// Explicit values first, then `lookup` for each missing field. Either
    /// field missing in both places is a configuration error.
    pub fn resolve_with<F>(key: Option<String>, secret: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = key.or_else(|| lookup(API_KEY_ENV)).ok_or_else(|| {
            VerifyError::Configuration(format!("no API key given and {API_KEY_ENV} is not set"))
        })?;
        let secret = secret.or_else(|| lookup(API_SECRET_ENV)).ok_or_else(|| {
            VerifyError::Configuration(format!(
                "no API secret given and {API_SECRET_ENV} is not set"
            ))
        })?;
        Ok(Self { key, secret })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Construction options for `VerificationClient::new`.
///
/// Every field is optional; missing credentials fall back to the
/// environment, a missing endpoint falls back to the process default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub key: Option<String>,
    pub secret: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Stored in whole milliseconds, rounded up so a non-zero timeout never
    /// collapses to zero.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let millis = timeout.as_nanos().div_ceil(1_000_000);
        self.timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parse the endpoint override, if any.
    pub fn endpoint_url(&self) -> Result<Option<Url>> {
        self.endpoint
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(VerifyError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let creds = Credentials::resolve_with(
            Some("explicit-key".into()),
            Some("explicit-secret".into()),
            env(&[(API_KEY_ENV, "env-key"), (API_SECRET_ENV, "env-secret")]),
        )
        .unwrap();
        assert_eq!(creds.key(), "explicit-key");
        assert_eq!(creds.secret(), "explicit-secret");
    }

    #[test]
    fn missing_fields_fall_back_to_environment() {
        let creds = Credentials::resolve_with(
            Some("explicit-key".into()),
            None,
            env(&[(API_SECRET_ENV, "env-secret")]),
        )
        .unwrap();
        assert_eq!(creds.key(), "explicit-key");
        assert_eq!(creds.secret(), "env-secret");
    }

    #[test]
    fn missing_everywhere_is_configuration_error() {
        let err = Credentials::resolve_with(None, None, env(&[])).unwrap_err();
        assert!(matches!(err, VerifyError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn missing_secret_alone_is_configuration_error() {
        let err = Credentials::resolve_with(None, None, env(&[(API_KEY_ENV, "k")])).unwrap_err();
        assert!(matches!(err, VerifyError::Configuration(_)));
        assert!(err.to_string().contains(API_SECRET_ENV));
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("my-key", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("my-key"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: ClientOptions =
            serde_json::from_str(r#"{"key":"k","timeout_ms":5000}"#).unwrap();
        assert_eq!(opts.key.as_deref(), Some("k"));
        assert!(opts.secret.is_none());
        assert_eq!(opts.timeout_duration(), Some(Duration::from_secs(5)));
        assert!(opts.endpoint_url().unwrap().is_none());
    }

    #[test]
    fn sub_second_timeouts_keep_their_precision() {
        let cases = [
            (Duration::from_millis(500), Duration::from_millis(500)),
            (Duration::from_millis(1500), Duration::from_millis(1500)),
            (Duration::from_micros(1), Duration::from_millis(1)),
            (Duration::from_micros(2500), Duration::from_millis(3)),
            (Duration::from_secs(30), Duration::from_secs(30)),
        ];
        for (given, expected) in cases {
            let opts = ClientOptions::new().timeout(given);
            assert_eq!(opts.timeout_duration(), Some(expected), "{given:?}");
        }
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let opts = ClientOptions::new().endpoint("not a url");
        assert!(matches!(
            opts.endpoint_url(),
            Err(VerifyError::InvalidEndpoint(_))
        ));
    }
}
