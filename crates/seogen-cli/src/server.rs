//! `seogen serve`: the HTTP boundary.
//!
//! Every generation endpoint wraps the orchestrator's answer in
//! `{success: true, data}`; failures become `{success: false, error, code}`
//! with a status chosen from the root cause of the error.

use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};

use seogen_core::config::Config;
use seogen_core::utils::now_rfc3339;
use seogen_core::{ContentKind, GenerationError, GenerationRequest};

use crate::App;

const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Clone)]
pub struct AppState {
    app: App,
    started: Instant,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self {
            app,
            started: Instant::now(),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate/models", get(list_models))
        .route("/api/generate/switch-model", post(switch_model))
        .route("/api/generate/{kind}", post(generate))
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .route("/api/history", get(history))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn run(config: &Config, app: App) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, active = %app.orchestrator.active_provider(), "HTTP server listening");

    axum::serve(listener, router(AppState::new(app)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

enum ApiError {
    Generation(GenerationError),
    UnknownKind(String),
    /// The body or query string could not be extracted.
    InvalidRequest(StatusCode, String),
    Internal(String),
}

impl From<GenerationError> for ApiError {
    fn from(e: GenerationError) -> Self {
        ApiError::Generation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.status(), rejection.body_text())
    }
}

/// HTTP status for a generation failure, decided by its root cause.
fn status_for(err: &GenerationError) -> StatusCode {
    match err.root_cause() {
        GenerationError::EmptyTopic | GenerationError::UnsupportedProvider(_) => {
            StatusCode::BAD_REQUEST
        }
        GenerationError::UnavailableProvider(_) => StatusCode::SERVICE_UNAVAILABLE,
        GenerationError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
        GenerationError::MalformedResponse { .. }
        | GenerationError::ProviderCall { .. }
        | GenerationError::Aggregate(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Generation(e) => (status_for(&e), e.code(), e.to_string()),
            ApiError::UnknownKind(kind) => (
                StatusCode::NOT_FOUND,
                "unknown_kind",
                format!("unknown content kind '{kind}'"),
            ),
            ApiError::InvalidRequest(status, message) => (status, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        };

        if status.is_server_error() {
            error!(status = %status, code, error = %message, "request failed");
        }

        (
            status,
            Json(json!({ "success": false, "error": message, "code": code })),
        )
            .into_response()
    }
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateBody {
    topic: String,
    selected_keywords: Option<Vec<String>>,
}

async fn generate(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let kind = ContentKind::parse(&kind).ok_or(ApiError::UnknownKind(kind))?;
    let Json(body) = body?;

    let mut request = GenerationRequest::new(kind, body.topic);
    if let Some(selected) = body.selected_keywords {
        request = request.with_selected_keywords(selected);
    }

    let output = state.app.orchestrator.run(&request).await?;
    Ok(Json(json!({ "success": true, "data": output })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SwitchBody {
    model: String,
}

async fn switch_model(
    State(state): State<AppState>,
    body: Result<Json<SwitchBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let message = state.app.orchestrator.switch_provider(&body.model)?;
    Ok(Json(json!({ "success": true, "message": message })))
}

async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let orchestrator = &state.app.orchestrator;
    let models: Vec<Value> = orchestrator
        .selector()
        .registry()
        .all()
        .iter()
        .map(|d| {
            json!({
                "name": d.kind.tag(),
                "displayName": d.display_name,
                "model": d.model_id,
                "available": d.is_available(),
            })
        })
        .collect();
    let available: Vec<&str> = orchestrator
        .available_providers()
        .iter()
        .map(|k| k.tag())
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "active": orchestrator.active_provider().tag(),
            "available": available,
            "models": models,
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatBody {
    message: String,
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = body?;
    let reply = state.app.orchestrator.chat(&body.message).await?;
    Ok(Json(json!({ "success": true, "res": { "data": reply.response } })))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let orchestrator = &state.app.orchestrator;
    let ai_status = if orchestrator.selector().get_active().is_ok() {
        "available"
    } else {
        "unavailable"
    };

    Json(json!({
        "status": "healthy",
        "uptime": state.started.elapsed().as_secs_f64(),
        "activeModel": orchestrator.active_provider().tag(),
        "aiModelStatus": ai_status,
        "timestamp": now_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
    page: Option<usize>,
}

/// `GET /api/history?page=&limit=`: newest records first, with
/// `pagination {total, page, pages}`. Zero or missing values fall back to
/// page 1 and the default page size.
async fn history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let limit = query
        .limit
        .filter(|&l| l > 0)
        .unwrap_or(DEFAULT_HISTORY_LIMIT);
    let page = query.page.filter(|&p| p > 0).unwrap_or(1);

    let Some(sink) = state.app.history.clone() else {
        return Ok(Json(json!({
            "success": true,
            "data": [],
            "pagination": { "total": 0, "page": page, "pages": 0 },
        })));
    };

    let history = tokio::task::spawn_blocking(move || sink.page(page, limit))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(format!("failed to read history: {e}")))?;

    Ok(Json(json!({
        "success": true,
        "data": history.records,
        "pagination": {
            "total": history.total,
            "page": history.page,
            "pages": history.pages,
        },
    })))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
