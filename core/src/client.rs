//! Stateless request builder and executor for the verify API.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a shared `parse_response` that consumes the
//! `HttpResponse`. The operation methods (`start_verification`, ...) join the
//! two through the injected `Transport`. Callers that want to own the I/O can
//! call `build_*` and `parse_response` themselves.
//!
//! The client holds credentials, an optional endpoint override and the
//! transport, none of which change after construction, so one instance can
//! serve concurrent callers.

use tracing::debug;
use url::Url;

use crate::config::{self, ClientOptions, Credentials};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::params::RequestParams;
use crate::response::{parse_response, ParsedResponse};
use crate::transport::{Transport, UreqTransport};

pub const START_PATH: &str = "/verify/json";
pub const CHECK_PATH: &str = "/verify/check/json";
pub const SEARCH_PATH: &str = "/verify/search/json";
pub const CONTROL_PATH: &str = "/verify/control/json";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Client for the phone verification workflow.
#[derive(Debug, Clone)]
pub struct VerificationClient<T = UreqTransport> {
    credentials: Credentials,
    endpoint: Option<Url>,
    transport: T,
}

impl VerificationClient<UreqTransport> {
    /// Resolve credentials (explicit options, then `NEXMO_API_KEY` /
    /// `NEXMO_API_SECRET`) and build an HTTPS transport.
    ///
    /// Fails with `Configuration` before any network activity when a
    /// credential is missing.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let endpoint = options.endpoint_url()?;
        let timeout = options.timeout_duration();
        let credentials = Credentials::resolve(options.key, options.secret)?;
        Ok(Self {
            credentials,
            endpoint,
            transport: UreqTransport::new(timeout),
        })
    }

    /// `new` with every value taken from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }
}

impl<T: Transport> VerificationClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            credentials,
            endpoint: None,
            transport,
        }
    }

    /// Pin this client to `endpoint` instead of the process-wide default.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The endpoint the next request will be built against.
    pub fn endpoint(&self) -> Url {
        self.endpoint.clone().unwrap_or_else(config::default_endpoint)
    }

    // -- operations ------------------------------------------------------

    /// Start a verification. Field validation is left to the service.
    pub fn start_verification(&self, params: RequestParams) -> Result<ParsedResponse> {
        let request = self.build_start_verification(params)?;
        self.execute("start_verification", request)
    }

    /// Submit the code the user received for `request_id`.
    pub fn check_verification(
        &self,
        request_id: &str,
        params: RequestParams,
    ) -> Result<ParsedResponse> {
        let request = self.build_check_verification(request_id, params)?;
        self.execute("check_verification", request)
    }

    pub fn get_verification(&self, request_id: &str) -> Result<ParsedResponse> {
        let request = self.build_get_verification(request_id)?;
        self.execute("get_verification", request)
    }

    pub fn cancel_verification(&self, request_id: &str) -> Result<ParsedResponse> {
        let request = self.build_cancel_verification(request_id)?;
        self.execute("cancel_verification", request)
    }

    pub fn trigger_next_verification_event(&self, request_id: &str) -> Result<ParsedResponse> {
        let request = self.build_trigger_next_verification_event(request_id)?;
        self.execute("trigger_next_verification_event", request)
    }

    // -- request builders ------------------------------------------------

    pub fn build_start_verification(&self, params: RequestParams) -> Result<HttpRequest> {
        self.build_post(START_PATH, params)
    }

    pub fn build_check_verification(
        &self,
        request_id: &str,
        mut params: RequestParams,
    ) -> Result<HttpRequest> {
        params.insert("request_id", request_id);
        self.build_post(CHECK_PATH, params)
    }

    pub fn build_get_verification(&self, request_id: &str) -> Result<HttpRequest> {
        self.build_get(SEARCH_PATH, RequestParams::new().with("request_id", request_id))
    }

    pub fn build_cancel_verification(&self, request_id: &str) -> Result<HttpRequest> {
        self.build_control(request_id, "cancel")
    }

    pub fn build_trigger_next_verification_event(&self, request_id: &str) -> Result<HttpRequest> {
        self.build_control(request_id, "trigger_next_event")
    }

    // -- internals -------------------------------------------------------

    fn execute(&self, operation: &'static str, request: HttpRequest) -> Result<ParsedResponse> {
        debug!(operation, method = request.method.as_str(), "sending verify request");
        let response = self.transport.send(&request)?;
        debug!(operation, status = response.status, "received verify response");
        parse_response(response)
    }

    fn build_control(&self, request_id: &str, cmd: &str) -> Result<HttpRequest> {
        let params = RequestParams::new()
            .with("request_id", request_id)
            .with("cmd", cmd);
        self.build_post(CONTROL_PATH, params)
    }

    fn build_get(&self, path: &str, params: RequestParams) -> Result<HttpRequest> {
        let mut url = self.resolve(path)?;
        let query = self.sign(params).encode();
        url.set_query(Some(&query));
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    fn build_post(&self, path: &str, params: RequestParams) -> Result<HttpRequest> {
        let url = self.resolve(path)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(self.sign(params).encode()),
        })
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        debug_assert!(!path.contains('?'), "API paths carry no query component");
        Ok(self.endpoint().join(path)?)
    }

    /// Append the credentials last so they win over any caller-supplied
    /// `api_key` / `api_secret`.
    fn sign(&self, mut params: RequestParams) -> RequestParams {
        params.insert("api_key", self.credentials.key());
        params.insert("api_secret", self.credentials.secret());
        params
    }
}
