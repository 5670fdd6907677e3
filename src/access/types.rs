use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Pending,
    Approved,
    Rejected,
}

impl AccountState {
    /// Accounts predating the approval workflow have no stored state;
    /// absence (and any unreadable value) counts as pending.
    pub fn from_db(raw: Option<&str>) -> AccountState {
        raw.and_then(|s| s.parse().ok()).unwrap_or(Self::Pending)
    }
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AccountState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown account state: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub employee_code: String,
    pub display_name: String,
    pub state: AccountState,
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
    pub granted_sections: Vec<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleEntry {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub default_sections: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub role_id: Uuid,
    /// When present, replaces the role's catalog defaults verbatim.
    pub sections: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct BulkApproveRequest {
    pub account_ids: Vec<Uuid>,
    pub role_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BulkRejectRequest {
    pub account_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub account_id: Uuid,
    pub success: bool,
    pub state: Option<AccountState>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub state: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
