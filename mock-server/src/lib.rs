use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Wrong codes accepted before a verification fails.
pub const MAX_CHECK_ATTEMPTS: usize = 3;

/// Credentials the mock accepts and the code every verification expects.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    pub api_secret: String,
    pub code: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            code: "1234".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VerificationStatus {
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

#[derive(Clone, Debug, Serialize)]
pub struct Check {
    pub code: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Verification {
    pub request_id: String,
    pub number: String,
    #[serde(rename = "sender_id")]
    pub brand: String,
    pub status: VerificationStatus,
    pub checks: Vec<Check>,
    pub events: u32,
}

pub type Db = Arc<RwLock<HashMap<String, Verification>>>;

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    db: Db,
}

type Params = HashMap<String, String>;

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/verify/json", post(start_verification))
        .route("/verify/check/json", post(check_verification))
        .route("/verify/search/json", get(search_verification))
        .route("/verify/control/json", post(control_verification))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn authorize(config: &MockConfig, params: &Params) -> Result<(), StatusCode> {
    let key_ok = params.get("api_key") == Some(&config.api_key);
    let secret_ok = params.get("api_secret") == Some(&config.api_secret);
    if key_ok && secret_ok {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

fn failure(status: &str, error_text: impl Into<String>) -> Json<Value> {
    Json(json!({ "status": status, "error_text": error_text.into() }))
}

fn missing(param: &str) -> Json<Value> {
    failure(
        "2",
        format!("Your request is incomplete and missing the mandatory parameter: {param}"),
    )
}

fn not_found(request_id: &str) -> Json<Value> {
    failure(
        "101",
        format!("No verification request found for '{request_id}'"),
    )
}

async fn start_verification(
    State(state): State<AppState>,
    Form(params): Form<Params>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state.config, &params)?;
    let Some(number) = params.get("number") else {
        return Ok(missing("number"));
    };
    let Some(brand) = params.get("brand") else {
        return Ok(missing("brand"));
    };

    let request_id = Uuid::new_v4().simple().to_string();
    let verification = Verification {
        request_id: request_id.clone(),
        number: number.clone(),
        brand: brand.clone(),
        status: VerificationStatus::InProgress,
        checks: Vec::new(),
        events: 1,
    };
    state.db.write().await.insert(request_id.clone(), verification);
    info!(%request_id, "verification started");
    Ok(Json(json!({ "status": "0", "request_id": request_id })))
}

async fn check_verification(
    State(state): State<AppState>,
    Form(params): Form<Params>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state.config, &params)?;
    let Some(request_id) = params.get("request_id") else {
        return Ok(missing("request_id"));
    };
    let Some(code) = params.get("code") else {
        return Ok(missing("code"));
    };

    let mut db = state.db.write().await;
    let verification = match db.get_mut(request_id) {
        Some(v) if v.status == VerificationStatus::InProgress => v,
        _ => {
            return Ok(failure(
                "6",
                format!("Request '{request_id}' was not found or it has been verified already."),
            ))
        }
    };

    if *code == state.config.code {
        verification.checks.push(Check {
            code: code.clone(),
            status: "VALID".to_string(),
        });
        verification.status = VerificationStatus::Success;
        info!(%request_id, "verification succeeded");
        return Ok(Json(json!({
            "status": "0",
            "request_id": request_id,
            "event_id": Uuid::new_v4().simple().to_string(),
        })));
    }

    verification.checks.push(Check {
        code: code.clone(),
        status: "INVALID".to_string(),
    });
    if verification.checks.len() >= MAX_CHECK_ATTEMPTS {
        verification.status = VerificationStatus::Failed;
        info!(%request_id, "verification failed after too many attempts");
        return Ok(failure("17", "The wrong code was provided too many times"));
    }
    Ok(failure("16", "The code provided does not match the expected value"))
}

async fn search_verification(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state.config, &params)?;
    let Some(request_id) = params.get("request_id") else {
        return Ok(missing("request_id"));
    };

    let db = state.db.read().await;
    match db.get(request_id) {
        Some(v) => Ok(Json(json!(v))),
        None => Ok(not_found(request_id)),
    }
}

async fn control_verification(
    State(state): State<AppState>,
    Form(params): Form<Params>,
) -> Result<Json<Value>, StatusCode> {
    authorize(&state.config, &params)?;
    let Some(request_id) = params.get("request_id") else {
        return Ok(missing("request_id"));
    };
    let Some(cmd) = params.get("cmd") else {
        return Ok(missing("cmd"));
    };
    if cmd != "cancel" && cmd != "trigger_next_event" {
        return Ok(failure("3", format!("Invalid value of parameter: cmd={cmd}")));
    }

    let mut db = state.db.write().await;
    let Some(verification) = db.get_mut(request_id) else {
        return Ok(not_found(request_id));
    };
    if verification.status != VerificationStatus::InProgress {
        return Ok(failure(
            "19",
            format!("Verification request ['{request_id}'] can't be controlled with {cmd} now"),
        ));
    }

    if cmd == "cancel" {
        verification.status = VerificationStatus::Cancelled;
    } else {
        verification.events += 1;
    }
    info!(%request_id, %cmd, "verification control applied");
    Ok(Json(json!({ "status": "0", "command": cmd })))
}
