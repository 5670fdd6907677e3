use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::access::storage::{db_account_to_view, DbAccount};
use crate::access::types::AccountView;
use crate::security::password::{hash_password, validate_password, verify_password};
use crate::security::AuthClaims;
use crate::shared::schema::accounts;
use crate::shared::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Database(msg) | Self::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub employee_code: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub account: AccountView,
}

fn map_unique_violation(e: DieselError) -> AuthError {
    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = e {
        let detail = info.constraint_name().unwrap_or("");
        if detail.contains("email") {
            return AuthError::Validation("email: already registered".to_string());
        }
        if detail.contains("employee_code") {
            return AuthError::Validation("employee_code: already registered".to_string());
        }
    }
    AuthError::Database(e.to_string())
}

/// Creates a pending account. Approval (and with it any dashboard
/// access) happens separately through the access workflow.
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AccountView>, AuthError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(AuthError::Validation(
            "email: must be a valid address".to_string(),
        ));
    }
    if req.employee_code.trim().is_empty() {
        return Err(AuthError::Validation(
            "employee_code: must not be empty".to_string(),
        ));
    }
    if req.display_name.trim().is_empty() {
        return Err(AuthError::Validation(
            "display_name: must not be empty".to_string(),
        ));
    }
    validate_password(&req.password).map_err(AuthError::Validation)?;

    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| AuthError::Database(e.to_string()))?;
        let password_hash =
            hash_password(&req.password).map_err(|e| AuthError::Internal(e.to_string()))?;
        let now = Utc::now();

        let account = DbAccount {
            id: Uuid::new_v4(),
            email: req.email.trim().to_lowercase(),
            employee_code: req.employee_code.trim().to_string(),
            display_name: req.display_name.trim().to_string(),
            password_hash,
            state: Some("pending".to_string()),
            role_id: None,
            role_name: None,
            granted_sections: serde_json::json!([]),
            approved_at: None,
            approved_by: None,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(accounts::table)
            .values(&account)
            .execute(&mut conn)
            .map_err(map_unique_violation)?;

        log::info!("Registered account {} (pending approval)", account.email);
        Ok::<_, AuthError>(db_account_to_view(account))
    })
    .await
    .map_err(|e| AuthError::Internal(e.to_string()))??;

    Ok(Json(result))
}

/// Verifies credentials and issues a bearer token. Logging in does not
/// imply access: every protected read still consults the section gate.
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pool = state.conn.clone();
    let email = req.email.trim().to_lowercase();

    let account = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| AuthError::Database(e.to_string()))?;
        let account: Option<DbAccount> = accounts::table
            .filter(accounts::email.eq(&email))
            .first(&mut conn)
            .optional()
            .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok::<_, AuthError>(account.filter(|a| verify_password(&req.password, &a.password_hash)))
    })
    .await
    .map_err(|e| AuthError::Internal(e.to_string()))??;

    let account = account
        .ok_or_else(|| AuthError::Unauthorized("invalid email or password".to_string()))?;

    let token = state
        .jwt
        .issue(account.id, &account.email, account.role_name.clone())
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    Ok(Json(TokenResponse {
        token,
        account: db_account_to_view(account),
    }))
}

pub async fn handle_me(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
) -> Result<Json<AccountView>, AuthError> {
    let account_id = claims
        .0
        .account_id()
        .map_err(|e| AuthError::Unauthorized(e.to_string()))?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| AuthError::Database(e.to_string()))?;
        let account: Option<DbAccount> = accounts::table
            .find(account_id)
            .first(&mut conn)
            .optional()
            .map_err(|e| AuthError::Database(e.to_string()))?;
        account
            .map(db_account_to_view)
            .ok_or_else(|| AuthError::NotFound(format!("account {account_id} not found")))
    })
    .await
    .map_err(|e| AuthError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub fn configure_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(handle_register))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/me", get(handle_me))
}
