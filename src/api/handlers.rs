//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse, StatusResponse, ToolsResponse};
use super::AppState;
use crate::controller::{TurnError, TurnErrorKind};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health))
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/tools", get(list_tools))
        .with_state(state)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "AI Agent is running",
    })
}

async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.controller.registry().descriptors().to_vec(),
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }

    tracing::info!(history_len = req.history.len(), "Chat request");

    let outcome = state.controller.run(&req.history, &req.prompt).await?;

    Ok(Json(ChatResponse {
        response: outcome.response_text,
        updated_history: outcome.updated_history,
        debug_info: outcome.debug,
    }))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Turn(TurnError),
}

impl From<TurnError> for AppError {
    fn from(error: TurnError) -> Self {
        AppError::Turn(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg, "invalid_request"))
            }
            AppError::Turn(error) => {
                let kind = error.kind();
                let status = match kind {
                    TurnErrorKind::ModelGateway | TurnErrorKind::MalformedModelResponse => {
                        StatusCode::BAD_GATEWAY
                    }
                    TurnErrorKind::UnknownTool | TurnErrorKind::InvalidToolArguments => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    TurnErrorKind::ToolExecution | TurnErrorKind::Internal => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, ErrorResponse::new(error.to_string(), kind.as_str()))
            }
        };

        (status, Json(body)).into_response()
    }
}
