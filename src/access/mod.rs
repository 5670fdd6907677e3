pub mod gate;
pub mod handlers;
pub mod processor;
pub mod roles;
pub mod storage;
pub mod types;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::shared::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
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

impl IntoResponse for AccessError {
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

pub fn configure_access_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/access/requests", get(handlers::handle_list_requests))
        .route(
            "/api/access/requests/:account_id/approve",
            post(handlers::handle_approve),
        )
        .route(
            "/api/access/requests/:account_id/reject",
            post(handlers::handle_reject),
        )
        .route(
            "/api/access/requests/bulk_approve",
            post(handlers::handle_bulk_approve),
        )
        .route(
            "/api/access/requests/bulk_reject",
            post(handlers::handle_bulk_reject),
        )
        .route("/api/access/roles", get(handlers::handle_list_roles))
}
