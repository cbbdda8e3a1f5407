use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{ErrorKind, ProgressError};
use crate::progress::model::{MasteryPoint, ProgressState, UpdateEvent};
use crate::progress::service::DEFAULT_DELTA;
use crate::state::app::AppState;

/// Set to `false` when an update was applied but could not be written back.
pub const PERSISTED_HEADER: &str = "x-progress-persisted";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: ErrorKind,
}

/// Body of `POST /progress/update`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(alias = "lesson_id")]
    pub lesson_id: String,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl UpdateRequest {
    fn into_event(self, now: DateTime<Utc>) -> UpdateEvent {
        UpdateEvent::new(
            self.lesson_id,
            self.delta.unwrap_or(DEFAULT_DELTA),
            self.timestamp.unwrap_or(now),
        )
    }
}

impl IntoResponse for ProgressError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Progress request failed");
        let body = ErrorBody {
            error: self.message,
            kind: self.kind,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/progress", progress_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/snapshot", get(read_snapshot))
        .route("/timeline", get(read_timeline))
        .route("/update", post(update_progress))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn read_snapshot(State(state): State<AppState>) -> Result<Json<ProgressState>, ProgressError> {
    state.repository().snapshot().await.map(Json)
}

async fn read_timeline(State(state): State<AppState>) -> Result<Json<Vec<MasteryPoint>>, ProgressError> {
    state.repository().timeline().await.map(Json)
}

async fn update_progress(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRequest>,
) -> Result<Response, ProgressError> {
    let repository = state.repository();
    let event = payload.into_event(repository.now());
    let outcome = repository.apply_event(&event).await?;

    let persisted = outcome.is_persisted();
    let mut response = Json(outcome.into_state()).into_response();
    response.headers_mut().insert(
        HeaderName::from_static(PERSISTED_HEADER),
        HeaderValue::from_static(if persisted { "true" } else { "false" }),
    );
    Ok(response)
}
