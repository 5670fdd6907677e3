pub mod jwt;
pub mod password;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::shared::state::AppState;

use jwt::Claims;

/// Extractor for the Authorization bearer token. Yields verified claims
/// only; section authorization happens against the stored account row.
pub struct AuthClaims(pub Claims);

fn unauthorized(message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": message })),
    )
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthClaims {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Expected a bearer token"))?;

        let claims = state
            .jwt
            .verify(token)
            .map_err(|e| unauthorized(&e.to_string()))?;

        Ok(AuthClaims(claims))
    }
}
