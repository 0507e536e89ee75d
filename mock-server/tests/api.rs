use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, MockConfig};
use serde_json::Value;
use tower::ServiceExt;

const AUTH: &str = "api_key=test-key&api_secret=test-secret";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn send(app: &Router, request: Request<String>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

async fn start(app: &Router) -> String {
    let (status, body) = send(
        app,
        form_request("/verify/json", &format!("number=447700900000&brand=Test&{AUTH}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "0");
    body["request_id"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn wrong_credentials_return_401() {
    let app = app(MockConfig::default());
    let resp = app
        .oneshot(form_request(
            "/verify/json",
            "number=1&brand=x&api_key=test-key&api_secret=wrong",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_without_credentials_returns_401() {
    let app = app(MockConfig::default());
    let resp = app
        .oneshot(get_request("/verify/search/json?request_id=abc"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- start ---

#[tokio::test]
async fn start_returns_request_id() {
    let app = app(MockConfig::default());
    let request_id = start(&app).await;
    assert_eq!(request_id.len(), 32);
}

#[tokio::test]
async fn start_missing_brand_reports_status_2() {
    let app = app(MockConfig::default());
    let (status, body) = send(
        &app,
        form_request("/verify/json", &format!("number=447700900000&{AUTH}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "2");
    assert!(body["error_text"].as_str().unwrap().contains("brand"));
}

// --- check ---

#[tokio::test]
async fn check_unknown_request_reports_status_6() {
    let app = app(MockConfig::default());
    let (_, body) = send(
        &app,
        form_request("/verify/check/json", &format!("request_id=nope&code=1234&{AUTH}")),
    )
    .await;
    assert_eq!(body["status"], "6");
}

#[tokio::test]
async fn too_many_wrong_codes_fail_the_verification() {
    let app = app(MockConfig::default());
    let id = start(&app).await;
    let check = format!("request_id={id}&code=0000&{AUTH}");

    let (_, body) = send(&app, form_request("/verify/check/json", &check)).await;
    assert_eq!(body["status"], "16");
    let (_, body) = send(&app, form_request("/verify/check/json", &check)).await;
    assert_eq!(body["status"], "16");
    let (_, body) = send(&app, form_request("/verify/check/json", &check)).await;
    assert_eq!(body["status"], "17");

    let (_, body) = send(
        &app,
        get_request(&format!("/verify/search/json?request_id={id}&{AUTH}")),
    )
    .await;
    assert_eq!(body["status"], "FAILED");
    assert_eq!(body["checks"].as_array().unwrap().len(), 3);
}

// --- control ---

#[tokio::test]
async fn control_rejects_unknown_cmd() {
    let app = app(MockConfig::default());
    let id = start(&app).await;
    let (_, body) = send(
        &app,
        form_request(
            "/verify/control/json",
            &format!("request_id={id}&cmd=explode&{AUTH}"),
        ),
    )
    .await;
    assert_eq!(body["status"], "3");
}

#[tokio::test]
async fn control_unknown_request_reports_status_101() {
    let app = app(MockConfig::default());
    let (_, body) = send(
        &app,
        form_request(
            "/verify/control/json",
            &format!("request_id=missing&cmd=cancel&{AUTH}"),
        ),
    )
    .await;
    assert_eq!(body["status"], "101");
}

// --- full workflow ---

#[tokio::test]
async fn verification_lifecycle() {
    let app = app(MockConfig::default());
    let id = start(&app).await;

    // search: in progress, no checks yet
    let search = format!("/verify/search/json?request_id={id}&{AUTH}");
    let (_, body) = send(&app, get_request(&search)).await;
    assert_eq!(body["status"], "IN PROGRESS");
    assert_eq!(body["number"], "447700900000");
    assert_eq!(body["sender_id"], "Test");

    // trigger next event
    let (_, body) = send(
        &app,
        form_request(
            "/verify/control/json",
            &format!("request_id={id}&cmd=trigger_next_event&{AUTH}"),
        ),
    )
    .await;
    assert_eq!(body["status"], "0");
    assert_eq!(body["command"], "trigger_next_event");

    // check with the right code
    let (_, body) = send(
        &app,
        form_request("/verify/check/json", &format!("request_id={id}&code=1234&{AUTH}")),
    )
    .await;
    assert_eq!(body["status"], "0");
    assert_eq!(body["request_id"], id.as_str());

    // search: success, events advanced
    let (_, body) = send(&app, get_request(&search)).await;
    assert_eq!(body["status"], "SUCCESS");
    assert_eq!(body["events"], 2);

    // cancel after success: refused
    let (_, body) = send(
        &app,
        form_request(
            "/verify/control/json",
            &format!("request_id={id}&cmd=cancel&{AUTH}"),
        ),
    )
    .await;
    assert_eq!(body["status"], "19");
}
