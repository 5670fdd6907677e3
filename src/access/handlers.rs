use axum::{
    extract::{Path, Query, State},
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::security::AuthClaims;
use crate::shared::schema::{accounts, risk_roles};
use crate::shared::state::AppState;

use super::gate::require_section;
use super::processor::{approve_account, reject_account};
use super::roles::sections;
use super::storage::{db_account_to_view, db_role_to_entry, DbAccount, DbRole};
use super::types::{
    AccountState, AccountView, ApproveRequest, BulkApproveRequest, BulkOutcome, BulkRejectRequest,
    ListAccountsQuery, RoleEntry,
};
use super::AccessError;

fn actor_id(claims: &AuthClaims) -> Result<Uuid, AccessError> {
    claims
        .0
        .account_id()
        .map_err(|e| AccessError::Unauthorized(e.to_string()))
}

pub async fn handle_list_requests(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<Vec<AccountView>>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);

        let mut db_query = accounts::table.into_boxed();

        if let Some(raw) = query.state {
            let wanted: AccountState = raw
                .parse()
                .map_err(|e: String| AccessError::Validation(format!("state: {e}")))?;
            db_query = match wanted {
                // Absent state counts as pending.
                AccountState::Pending => db_query
                    .filter(accounts::state.is_null().or(accounts::state.eq("pending"))),
                other => db_query.filter(accounts::state.eq(other.to_string())),
            };
        }

        let rows: Vec<DbAccount> = db_query
            .order(accounts::created_at.asc())
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .map_err(|e| AccessError::Database(e.to_string()))?;

        Ok::<_, AccessError>(rows.into_iter().map(db_account_to_view).collect())
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_approve(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(account_id): Path<Uuid>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<AccountView>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        let approver = require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let account =
            approve_account(&mut conn, approver.id, account_id, req.role_id, req.sections)?;
        Ok::<_, AccessError>(db_account_to_view(account))
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_reject(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountView>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let account = reject_account(&mut conn, account_id)?;
        Ok::<_, AccessError>(db_account_to_view(account))
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}

fn bulk_outcome(account_id: Uuid, result: Result<DbAccount, AccessError>) -> BulkOutcome {
    match result {
        Ok(account) => BulkOutcome {
            account_id,
            success: true,
            state: Some(AccountState::from_db(account.state.as_deref())),
            error: None,
        },
        Err(e) => BulkOutcome {
            account_id,
            success: false,
            state: None,
            error: Some(e.to_string()),
        },
    }
}

/// Applies the single-approve contract independently per id; one bad id
/// never aborts its siblings.
pub async fn handle_bulk_approve(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Json(req): Json<BulkApproveRequest>,
) -> Result<Json<Vec<BulkOutcome>>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        let approver = require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let outcomes = req
            .account_ids
            .iter()
            .map(|&account_id| {
                let result =
                    approve_account(&mut conn, approver.id, account_id, req.role_id, None);
                bulk_outcome(account_id, result)
            })
            .collect();
        Ok::<_, AccessError>(outcomes)
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_bulk_reject(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Json(req): Json<BulkRejectRequest>,
) -> Result<Json<Vec<BulkOutcome>>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let outcomes = req
            .account_ids
            .iter()
            .map(|&account_id| {
                let result = reject_account(&mut conn, account_id);
                bulk_outcome(account_id, result)
            })
            .collect();
        Ok::<_, AccessError>(outcomes)
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_list_roles(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
) -> Result<Json<Vec<RoleEntry>>, AccessError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AccessError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::ACCESS_CONTROL)?;

        let rows: Vec<DbRole> = risk_roles::table
            .order(risk_roles::name.asc())
            .load(&mut conn)
            .map_err(|e| AccessError::Database(e.to_string()))?;

        Ok::<_, AccessError>(rows.into_iter().map(db_role_to_entry).collect())
    })
    .await
    .map_err(|e| AccessError::Internal(e.to_string()))??;

    Ok(Json(result))
}
