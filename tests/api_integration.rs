//! Integration tests for the HTTP API
//!
//! Tests status and command endpoints through the router

mod common;

use std::sync::Arc;

use aether_eye::core::{create_router, AppContext, AppState, FaceDatabase, FaceRecords};
use aether_eye::types::ScanTrigger;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{RecordingActuator, RecordingLauncher};
use serde_json::Value;
use tower::ServiceExt;

struct TestApp {
    context: Arc<AppContext>,
    launcher: Arc<RecordingLauncher>,
    actuator: Arc<RecordingActuator>,
}

fn test_app() -> TestApp {
    let launcher = Arc::new(RecordingLauncher::default());
    let actuator = Arc::new(RecordingActuator::default());
    let context = Arc::new(AppContext {
        state: Arc::new(AppState::default()),
        launcher: launcher.clone(),
        actuator: actuator.clone(),
        faces: Some(Arc::new(FaceDatabase::from_records(FaceRecords::default()))),
    });
    TestApp {
        context,
        launcher,
        actuator,
    }
}

async fn call(app: &TestApp, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = create_router(app.context.clone())
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, json) = call(&app, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "online");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_initial_status() {
    let app = test_app();
    let (status, json) = call(&app, "GET", "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sentry"], false);
    assert_eq!(json["auto_light"], true);
    assert_eq!(json["latest"]["text"], "System ready.");
    assert_eq!(json["latest"]["timestamp"], "");
    assert_eq!(json["latest"]["light"], "unknown");
}

#[tokio::test]
async fn test_scan_starts_operator_session() {
    let app = test_app();
    let (status, json) = call(&app, "GET", "/scan").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "started");
    assert_eq!(*app.launcher.launched.lock().unwrap(), vec![ScanTrigger::Operator]);
}

#[tokio::test]
async fn test_light_commands_update_state() {
    let app = test_app();

    let (_, json) = call(&app, "POST", "/light/on").await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["light"], "on");
    assert_eq!(app.context.state.light.lock().unwrap().state(), Some(true));

    let (_, json) = call(&app, "GET", "/light/off").await;
    assert_eq!(json["status"], "ok");
    assert_eq!(app.context.state.light.lock().unwrap().state(), Some(false));
    assert_eq!(*app.actuator.commands.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn test_mode_toggles() {
    let app = test_app();

    let (_, json) = call(&app, "POST", "/sentry/on").await;
    assert_eq!(json["status"], "activated");
    assert_eq!(json["sentry"], true);

    let (_, json) = call(&app, "GET", "/autolight/off").await;
    assert_eq!(json["status"], "disabled");
    assert_eq!(json["auto_light"], false);

    let (_, json) = call(&app, "GET", "/status").await;
    assert_eq!(json["sentry"], true);
    assert_eq!(json["auto_light"], false);

    let (_, json) = call(&app, "GET", "/sentry/whatever").await;
    assert_eq!(json["status"], "deactivated");
}

#[tokio::test]
async fn test_face_reload() {
    let app = test_app();
    let (status, json) = call(&app, "POST", "/faces/reload").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "reloaded");
    assert_eq!(json["faces"], 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app();
    let (status, _) = call(&app, "GET", "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
