use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::shared::schema::{accounts, risk_roles};

use super::storage::{sections_from_json, sections_to_json, DbAccount, DbRole};
use super::types::AccountState;
use super::AccessError;

/// Approval admits pending (including absent-state) and rejected
/// accounts; re-approving an approved account is a precondition failure,
/// never a silent re-apply.
pub fn can_approve(state: AccountState) -> bool {
    state != AccountState::Approved
}

/// Only pending accounts can be rejected; revoking an approval is a
/// different operation this workflow does not offer.
pub fn can_reject(state: AccountState) -> bool {
    state == AccountState::Pending
}

fn current_state(conn: &mut PgConnection, account_id: Uuid) -> Result<AccountState, AccessError> {
    let state: Option<Option<String>> = accounts::table
        .find(account_id)
        .select(accounts::state)
        .first(conn)
        .optional()
        .map_err(|e| AccessError::Database(e.to_string()))?;

    match state {
        Some(raw) => Ok(AccountState::from_db(raw.as_deref())),
        None => Err(AccessError::NotFound(format!(
            "account {account_id} not found"
        ))),
    }
}

/// Binds the role, snapshots the granted-section set and flips the
/// account to approved, in one compare-and-set statement. The section
/// set is the override when given, else the role's stored defaults
/// (empty for roles outside the catalog).
pub fn approve_account(
    conn: &mut PgConnection,
    approver_id: Uuid,
    account_id: Uuid,
    role_id: Uuid,
    overrides: Option<Vec<String>>,
) -> Result<DbAccount, AccessError> {
    let role: DbRole = risk_roles::table
        .find(role_id)
        .first(conn)
        .optional()
        .map_err(|e| AccessError::Database(e.to_string()))?
        .ok_or_else(|| AccessError::NotFound(format!("role {role_id} not found")))?;

    let sections = overrides.unwrap_or_else(|| sections_from_json(&role.default_sections));
    let now = Utc::now();

    let updated: Option<DbAccount> = diesel::update(
        accounts::table
            .filter(accounts::id.eq(account_id))
            .filter(accounts::state.is_null().or(accounts::state.ne("approved"))),
    )
    .set((
        accounts::state.eq("approved"),
        accounts::role_id.eq(role.id),
        accounts::role_name.eq(role.name.clone()),
        accounts::granted_sections.eq(sections_to_json(&sections)),
        accounts::approved_at.eq(now),
        accounts::approved_by.eq(approver_id),
        accounts::updated_at.eq(now),
    ))
    .get_result(conn)
    .optional()
    .map_err(|e| AccessError::Database(e.to_string()))?;

    match updated {
        Some(account) => {
            log::info!(
                "Approved account {} with role {} ({} sections)",
                account_id,
                role.name,
                sections.len()
            );
            Ok(account)
        }
        None => match current_state(conn, account_id)? {
            AccountState::Approved => Err(AccessError::Precondition(
                "account is already approved".to_string(),
            )),
            state => Err(AccessError::Internal(format!(
                "approve raced with a concurrent update (state {state})"
            ))),
        },
    }
}

/// Flips a pending account to rejected and clears the role binding.
/// Previously-granted sections are retained so a later re-approval can
/// start from them.
pub fn reject_account(
    conn: &mut PgConnection,
    account_id: Uuid,
) -> Result<DbAccount, AccessError> {
    let now = Utc::now();

    let updated: Option<DbAccount> = diesel::update(
        accounts::table
            .filter(accounts::id.eq(account_id))
            .filter(accounts::state.is_null().or(accounts::state.eq("pending"))),
    )
    .set((
        accounts::state.eq("rejected"),
        accounts::role_id.eq(None::<Uuid>),
        accounts::role_name.eq(None::<String>),
        accounts::updated_at.eq(now),
    ))
    .get_result(conn)
    .optional()
    .map_err(|e| AccessError::Database(e.to_string()))?;

    match updated {
        Some(account) => {
            log::info!("Rejected account {account_id}");
            Ok(account)
        }
        None => {
            let state = current_state(conn, account_id)?;
            Err(AccessError::Precondition(format!(
                "only pending accounts can be rejected (state {state})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_admits_pending_and_rejected() {
        assert!(can_approve(AccountState::Pending));
        assert!(can_approve(AccountState::Rejected));
        assert!(!can_approve(AccountState::Approved));
    }

    #[test]
    fn reject_requires_pending() {
        assert!(can_reject(AccountState::Pending));
        assert!(!can_reject(AccountState::Approved));
        assert!(!can_reject(AccountState::Rejected));
    }
}
