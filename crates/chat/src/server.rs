//! HTTP surface for the chat pipeline.
//!
//! # Endpoints
//!
//! | Method | Path        | Description                         |
//! |--------|-------------|-------------------------------------|
//! | `POST` | `/api/chat` | `{query, userId?}` to `{response}`  |
//! | `GET`  | `/health`   | Liveness and version                |
//!
//! `POST /api/chat` answers 400 `{error: "Query is required"}` only when the
//! query is missing or blank. Every other outcome, including an unreadable
//! body, is a 200 with conversational text.

use crate::pipeline::{Pipeline, CATCH_ALL_FALLBACK};
use crate::types::{ChatReply, ChatRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use companion_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Build the router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(pipeline)
}

/// Bind `bind` and serve until the process exits.
pub async fn serve(pipeline: Arc<Pipeline>, bind: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind, e)))?;

    info!("Companion listening on http://{}", bind);

    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

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

async fn handle_chat(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Unreadable chat request: {}", rejection);
            return Json(ChatReply {
                response: CATCH_ALL_FALLBACK.to_string(),
            })
            .into_response();
        }
    };

    let text = request.query.unwrap_or_default();
    match pipeline.handle(&text, request.user_id).await {
        Ok(reply) => Json(ChatReply { response: reply.text }).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
