pub mod handlers;
pub mod lifecycle;
pub mod storage;
pub mod types;

use axum::{
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::access::AccessError;
use crate::shared::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AccessError> for RiskError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::NotFound(msg) => Self::NotFound(msg),
            AccessError::Unauthorized(msg) => Self::Unauthorized(msg),
            AccessError::Forbidden(msg) => Self::Forbidden(msg),
            AccessError::Validation(msg) => Self::Validation(msg),
            AccessError::Precondition(msg) => Self::Precondition(msg),
            AccessError::Database(msg) => Self::Database(msg),
            AccessError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for RiskError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Precondition(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Database(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn configure_risk_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/risks", post(handlers::handle_create_risk))
        .route("/api/risks", get(handlers::handle_list_risks))
        .route("/api/risks/report", post(handlers::handle_report_risk))
        .route("/api/risks/summary", get(handlers::handle_risk_summary))
        .route("/api/risks/scales", get(handlers::handle_scales))
        .route(
            "/api/risks/preview_score",
            post(handlers::handle_preview_score),
        )
        .route("/api/risks/:id", get(handlers::handle_get_risk))
        .route("/api/risks/:id", put(handlers::handle_update_risk))
        .route("/api/risks/:id", delete(handlers::handle_delete_risk))
        .route("/api/risks/:id/status", put(handlers::handle_change_status))
        .route("/api/risks/:id/claim", post(handlers::handle_claim_risk))
        .route(
            "/api/risks/:id/evaluate",
            post(handlers::handle_evaluate_risk),
        )
}
