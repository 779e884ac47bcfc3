//! Moderation HTTP API.
//!
//! Exposes the registry and the patch operations as a JSON HTTP API for
//! moderation front ends and automation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/analyses` | List registered analyses |
//! | `GET`  | `/analyses/{id}` | Fetch one analysis |
//! | `POST` | `/analyses/{id}/comments/{comment_id}` | Set a comment's moderation status |
//! | `POST` | `/analyses/{id}/keywords/{key}` | Set a keyword entry's label |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "unknown moderation status" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # Mirror semantics
//!
//! The patch endpoints answer `200` even when the artifact could not be
//! patched: the on-disk document is a display mirror of the moderation
//! action, and a stale mirror must not fail the action itself. A skipped
//! patch is reported in the response body and logged as a warning:
//!
//! ```json
//! { "result": { "mirror": "skipped", "reason": "artifact file not found" } }
//! ```
//!
//! `404` is reserved for requests that cannot even name a target: an
//! unknown analysis id, or an artifact kind the analysis never recorded.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based
//! moderation dashboards can call the API cross-origin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::Config;
use crate::models::{ArtifactKind, KeywordKey, ModerationStatus};
use crate::patch::{patch_comment_status, patch_keyword_label, PatchOutcome};
use crate::registry::{self, Analysis};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the moderation HTTP API.
///
/// Binds to the address configured in `[server].bind` and runs until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/analyses", get(handle_list_analyses))
        .route("/analyses/{id}", get(handle_get_analysis))
        .route(
            "/analyses/{id}/comments/{comment_id}",
            post(handle_moderate_comment),
        )
        .route("/analyses/{id}/keywords/{key}", post(handle_label_keyword))
        .layer(cors)
        .with_state(state);

    println!("moderation API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Registry errors carry "not found" in the message for absent rows; map
/// those to 404 and everything else to 500.
fn classify_registry_error(err: anyhow::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("not found") {
        not_found(msg)
    } else {
        internal(msg)
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /analyses ============

#[derive(Serialize)]
struct AnalysesResponse {
    analyses: Vec<Analysis>,
}

async fn handle_list_analyses(
    State(state): State<AppState>,
) -> Result<Json<AnalysesResponse>, AppError> {
    let analyses = registry::list_analyses(&state.config)
        .await
        .map_err(classify_registry_error)?;
    Ok(Json(AnalysesResponse { analyses }))
}

async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Analysis>, AppError> {
    let analysis = registry::get_analysis(&state.config, &id)
        .await
        .map_err(classify_registry_error)?;
    Ok(Json(analysis))
}

// ============ POST /analyses/{id}/comments/{comment_id} ============

#[derive(Deserialize)]
struct ModerateRequest {
    status: ModerationStatus,
    #[serde(default)]
    file: Option<ArtifactKind>,
}

async fn handle_moderate_comment(
    State(state): State<AppState>,
    Path((id, comment_id)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req: ModerateRequest =
        serde_json::from_value(body).map_err(|e| bad_request(e.to_string()))?;

    let analysis = registry::get_analysis(&state.config, &id)
        .await
        .map_err(classify_registry_error)?;

    let kind = req.file.unwrap_or(ArtifactKind::Gambling);
    let path = analysis
        .artifact_path(&state.config, kind)
        .map_err(|e| not_found(e.to_string()))?;

    let outcome = patch_comment_status(&path, &comment_id, req.status.as_str());
    Ok(Json(mirror_result(
        &outcome,
        &analysis.id,
        &format!("comment {}", comment_id),
    )))
}

// ============ POST /analyses/{id}/keywords/{key} ============

#[derive(Deserialize)]
struct LabelRequest {
    label: i64,
}

async fn handle_label_keyword(
    State(state): State<AppState>,
    Path((id, key)): Path<(String, String)>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let req: LabelRequest = serde_json::from_value(body).map_err(|e| bad_request(e.to_string()))?;
    if !(0..=1).contains(&req.label) {
        return Err(bad_request("label must be 0 or 1"));
    }

    let analysis = registry::get_analysis(&state.config, &id)
        .await
        .map_err(classify_registry_error)?;

    let path = analysis
        .artifact_path(&state.config, ArtifactKind::Keywords)
        .map_err(|e| not_found(e.to_string()))?;

    let key = KeywordKey::parse(&key);
    let outcome = patch_keyword_label(&path, &key, req.label);
    Ok(Json(mirror_result(&outcome, &analysis.id, &key.to_string())))
}

/// Build the patch-endpoint response body; a skipped mirror update is a
/// warning, never an HTTP failure.
fn mirror_result(outcome: &PatchOutcome, analysis_id: &str, subject: &str) -> serde_json::Value {
    if outcome.is_updated() {
        serde_json::json!({ "result": { "mirror": "updated" } })
    } else {
        warn!(
            analysis = analysis_id,
            subject = subject,
            reason = %outcome.describe(),
            "mirror patch skipped"
        );
        serde_json::json!({
            "result": { "mirror": "skipped", "reason": outcome.describe() }
        })
    }
}
