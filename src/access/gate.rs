use diesel::prelude::*;
use uuid::Uuid;

use crate::shared::schema::accounts;

use super::storage::sections_from_json;
use super::types::AccountState;
use super::AccessError;

/// The acting account as authorization sees it: approval state plus the
/// granted-section snapshot recorded at approval time. Built fresh from
/// the database on every protected request — the JWT role claim is never
/// a source of truth here.
#[derive(Debug, Clone)]
pub struct SessionAccount {
    pub id: Uuid,
    pub email: String,
    pub state: AccountState,
    pub role_name: Option<String>,
    pub granted_sections: Vec<String>,
}

/// Gate rule: unapproved accounts see nothing; approved accounts see
/// exactly their granted sections.
pub fn can_access(account: &SessionAccount, section: &str) -> bool {
    account.state == AccountState::Approved
        && account.granted_sections.iter().any(|s| s == section)
}

pub fn load_session_account(
    conn: &mut PgConnection,
    account_id: Uuid,
) -> Result<SessionAccount, AccessError> {
    let row: Option<(Uuid, String, Option<String>, Option<String>, serde_json::Value)> =
        accounts::table
            .find(account_id)
            .select((
                accounts::id,
                accounts::email,
                accounts::state,
                accounts::role_name,
                accounts::granted_sections,
            ))
            .first(conn)
            .optional()
            .map_err(|e| AccessError::Database(e.to_string()))?;

    let (id, email, state, role_name, granted) =
        row.ok_or_else(|| AccessError::NotFound(format!("account {account_id} not found")))?;

    Ok(SessionAccount {
        id,
        email,
        state: AccountState::from_db(state.as_deref()),
        role_name,
        granted_sections: sections_from_json(&granted),
    })
}

/// Loads the acting account and checks the section grant in one step.
/// Every protected handler calls this before touching data.
pub fn require_section(
    conn: &mut PgConnection,
    account_id: Uuid,
    section: &str,
) -> Result<SessionAccount, AccessError> {
    let account = load_session_account(conn, account_id)?;
    if !can_access(&account, section) {
        log::warn!(
            "Denied section {} to account {} (state {})",
            section,
            account.id,
            account.state
        );
        return Err(AccessError::Forbidden(format!(
            "section {section} is not granted to this account"
        )));
    }
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(state: AccountState, sections: &[&str]) -> SessionAccount {
        SessionAccount {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            state,
            role_name: Some("Risk Owner".into()),
            granted_sections: sections.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn unapproved_accounts_are_denied_everything() {
        let pending = account(AccountState::Pending, &["overview"]);
        let rejected = account(AccountState::Rejected, &["overview"]);
        assert!(!can_access(&pending, "overview"));
        assert!(!can_access(&rejected, "overview"));
    }

    #[test]
    fn approved_accounts_see_exactly_their_grants() {
        let acct = account(AccountState::Approved, &["overview", "reports"]);
        assert!(can_access(&acct, "overview"));
        assert!(can_access(&acct, "reports"));
        assert!(!can_access(&acct, "risk_management"));
    }

    #[test]
    fn overrides_trump_shared_role() {
        // Same role bound at approval, different recorded snapshots.
        let full = account(
            AccountState::Approved,
            &["overview", "risk_management", "reports"],
        );
        let trimmed = account(AccountState::Approved, &["overview", "reports"]);
        assert!(can_access(&full, "risk_management"));
        assert!(!can_access(&trimmed, "risk_management"));
    }
}
