//! HTTP + WebSocket API for Aether Eye
//!
//! Endpoints:
//! - GET  /                 - Health
//! - GET  /status           - Modes and latest report
//! - GET  /scan             - Start an operator scan in the background
//! - GET|POST /light/:a     - Manual light command (`on`, anything else is off)
//! - GET|POST /sentry/:a    - Sentry mode on/off
//! - GET|POST /autolight/:a - Auto light on/off
//! - POST /faces/reload     - Re-read the face database
//! - WS   /ws/status        - Live reports

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::facedb::FaceDatabase;
use crate::core::ports::{LightActuator, SessionLauncher};
use crate::core::state::{lock, AppState};
use crate::types::{ScanTrigger, StatusReport, StatusSnapshot};

/// Everything the handlers need
pub struct AppContext {
    pub state: Arc<AppState>,
    pub launcher: Arc<dyn SessionLauncher>,
    pub actuator: Arc<dyn LightActuator>,
    pub faces: Option<Arc<FaceDatabase>>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Generic status response
#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub status: String,
}

/// Light command response
#[derive(Debug, Serialize)]
pub struct LightResponse {
    pub status: String,
    pub light: String,
}

/// Sentry toggle response
#[derive(Debug, Serialize)]
pub struct SentryResponse {
    pub status: String,
    pub sentry: bool,
}

/// Auto-light toggle response
#[derive(Debug, Serialize)]
pub struct AutoLightResponse {
    pub status: String,
    pub auto_light: bool,
}

/// Face reload response
#[derive(Debug, Serialize)]
pub struct FacesResponse {
    pub status: String,
    pub faces: usize,
}

/// Create the API router
pub fn create_router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/status", get(status))
        .route("/scan", get(scan))
        .route("/light/:action", get(light).post(light))
        .route("/sentry/:action", get(sentry).post(sentry))
        .route("/autolight/:action", get(autolight).post(autolight))
        .route("/faces/reload", post(reload_faces))
        .route("/ws/status", get(websocket_handler))
        .with_state(context)
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online".to_string(),
        version: crate::VERSION.to_string(),
    })
}

async fn status(State(ctx): State<Arc<AppContext>>) -> Json<StatusSnapshot> {
    Json(ctx.state.snapshot())
}

/// Start an operator scan; returns immediately
async fn scan(State(ctx): State<Arc<AppContext>>) -> Json<StartedResponse> {
    info!("🌐 scan requested over HTTP");
    ctx.launcher.launch(ScanTrigger::Operator);
    Json(StartedResponse {
        status: "started".to_string(),
    })
}

/// Manual light command
async fn light(
    State(ctx): State<Arc<AppContext>>,
    Path(action): Path<String>,
) -> Result<Json<LightResponse>, StatusCode> {
    let on = action == "on";
    let actuator = Arc::clone(&ctx.actuator);
    let state = Arc::clone(&ctx.state);
    let result = tokio::task::spawn_blocking(move || {
        actuator.set_light(on)?;
        lock(&state.light).record_manual(on, Instant::now());
        Ok::<(), crate::SentryError>(())
    })
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let status = match result {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, on, "manual light command failed");
            "err"
        }
    };
    Ok(Json(LightResponse {
        status: status.to_string(),
        light: action,
    }))
}

async fn sentry(State(ctx): State<Arc<AppContext>>, Path(action): Path<String>) -> Json<SentryResponse> {
    let on = action == "on";
    ctx.state.set_sentry_active(on);
    info!(on, "🛡️ sentry mode");
    Json(SentryResponse {
        status: if on { "activated" } else { "deactivated" }.to_string(),
        sentry: on,
    })
}

async fn autolight(State(ctx): State<Arc<AppContext>>, Path(action): Path<String>) -> Json<AutoLightResponse> {
    let on = action == "on";
    ctx.state.set_auto_light_active(on);
    info!(on, "💡 auto light");
    Json(AutoLightResponse {
        status: if on { "enabled" } else { "disabled" }.to_string(),
        auto_light: on,
    })
}

async fn reload_faces(State(ctx): State<Arc<AppContext>>) -> Result<Json<FacesResponse>, StatusCode> {
    let faces = ctx.faces.clone().ok_or(StatusCode::NOT_FOUND)?;
    let count = tokio::task::spawn_blocking(move || faces.reload())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            warn!(error = %e, "face database reload failed");
            StatusCode::UNPROCESSABLE_ENTITY
        })?;
    Ok(Json(FacesResponse {
        status: "reloaded".to_string(),
        faces: count,
    }))
}

/// WebSocket handler for live reports
async fn websocket_handler(State(ctx): State<Arc<AppContext>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    let rx = ctx.state.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<StatusReport>) {
    loop {
        match rx.recv().await {
            Ok(report) => {
                let json = serde_json::to_string(&report).unwrap_or_default();
                if socket.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "websocket client lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Run the API server until `shutdown` fires
pub async fn run_server(addr: &str, context: Arc<AppContext>, shutdown: CancellationToken) -> crate::Result<()> {
    let router = create_router(context);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("👁️ Aether Eye API running on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::light::tests::RecordingActuator;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[derive(Default)]
    struct NoopLauncher;

    impl SessionLauncher for NoopLauncher {
        fn launch(&self, _trigger: ScanTrigger) {}
    }

    fn context(actuator: RecordingActuator) -> Arc<AppContext> {
        Arc::new(AppContext {
            state: Arc::new(AppState::default()),
            launcher: Arc::new(NoopLauncher),
            actuator: Arc::new(actuator),
            faces: None,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_failed_light_reports_err() {
        let ctx = context(RecordingActuator {
            fail: true,
            ..Default::default()
        });
        let response = create_router(ctx.clone())
            .oneshot(Request::post("/light/on").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "err");
        assert_eq!(json["light"], "on");
        assert_eq!(lock(&ctx.state.light).state(), None);
    }

    #[tokio::test]
    async fn test_reload_without_database_is_404() {
        let response = create_router(context(RecordingActuator::default()))
            .oneshot(Request::post("/faces/reload").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
