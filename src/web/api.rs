//! Defines the Axum API routes and handlers.
//!
//! Validation failures never become HTTP errors: every handler answers 200
//! with a `status` string describing what happened.

use crate::camera::{Camera, CommandError};
use crate::web::models::{
    MoveRequest, MoveResponse, ResetResponse, SetTargetRequest, SetTargetResponse, StatusResponse,
};
use axum::{
    body::Bytes,
    extract::State,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const OPERATOR_PAGE: &str = include_str!("../../static/index.html");

pub struct AppStateInner {
    pub camera: Camera,
}
pub type AppState = Arc<AppStateInner>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(camera: Camera) -> Router {
    create_router_with_state(Arc::new(AppStateInner { camera }))
}

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/move", post(move_handler))
        .route("/set_target", post(set_target_handler))
        .route("/reset", post(reset_handler))
        .route("/status", get(status_handler))
        .with_state(state)
}

/// Router over a fresh camera whose worker is not running. Used by tests.
pub fn app() -> Router {
    create_router(Camera::default())
}

/// Router over a fresh camera with its worker running. Must be called
/// inside a Tokio runtime; the worker stops once the router is dropped.
pub fn app_with_worker() -> Router {
    let camera = Camera::default();
    camera.start();
    create_router(camera)
}

/// Parse a JSON body, falling back to the empty request on any error.
fn lenient_json<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("Unparseable request body: {}", e);
        T::default()
    })
}

async fn index() -> Html<&'static str> {
    Html(OPERATOR_PAGE)
}

/// POST /move
async fn move_handler(State(state): State<AppState>, body: Bytes) -> Json<MoveResponse> {
    let request: MoveRequest = lenient_json(&body);
    let direction = request.direction.unwrap_or_default();
    let response = match state.camera.move_direction(&direction) {
        Ok(accepted) => MoveResponse {
            status: "command received",
            target_region: accepted.target,
            net_delta: Some(accepted.net_delta),
        },
        Err(CommandError::OutOfBounds { target, .. }) => MoveResponse {
            status: "ignored",
            target_region: target,
            net_delta: None,
        },
        Err(CommandError::InvalidDirection(_)) => MoveResponse {
            status: "invalid direction",
            target_region: state.camera.status().target,
            net_delta: None,
        },
        Err(CommandError::MissingCoordinates) => MoveResponse {
            status: "ignored",
            target_region: state.camera.status().target,
            net_delta: None,
        },
    };
    Json(response)
}

/// POST /set_target
async fn set_target_handler(State(state): State<AppState>, body: Bytes) -> Json<SetTargetResponse> {
    let request: SetTargetRequest = lenient_json(&body);
    let (x, y) = request.coordinates();
    let response = match state.camera.set_target(x, y) {
        Ok(target) => SetTargetResponse {
            status: "target updated",
            target_region: target,
        },
        Err(CommandError::OutOfBounds { target, .. }) => SetTargetResponse {
            status: "ignored",
            target_region: target,
        },
        Err(CommandError::MissingCoordinates | CommandError::InvalidDirection(_)) => SetTargetResponse {
            status: "ignored",
            target_region: state.camera.status().target,
        },
    };
    Json(response)
}

/// POST /reset
async fn reset_handler(State(state): State<AppState>) -> Json<ResetResponse> {
    state.camera.reset();
    Json(ResetResponse { status: "system reset" })
}

/// GET /status
async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.camera.status().into())
}
