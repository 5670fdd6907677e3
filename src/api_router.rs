//! API Router
//!
//! Combines the API endpoints from all modules into a unified router.

use axum::{routing::get, Json, Router};
use std::sync::Arc;

use crate::shared::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .merge(crate::auth::configure_auth_routes())
        .merge(crate::access::configure_access_routes())
        .merge(crate::risks::configure_risk_routes())
}
