use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::schema::{accounts, risk_roles};

use super::types::{AccountState, AccountView, RoleEntry};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = accounts)]
pub struct DbAccount {
    pub id: Uuid,
    pub email: String,
    pub employee_code: String,
    pub display_name: String,
    pub password_hash: String,
    pub state: Option<String>,
    pub role_id: Option<Uuid>,
    pub role_name: Option<String>,
    pub granted_sections: serde_json::Value,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = risk_roles)]
pub struct DbRole {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub default_sections: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

pub fn sections_from_json(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

pub fn sections_to_json(sections: &[String]) -> serde_json::Value {
    serde_json::json!(sections)
}

pub fn db_account_to_view(db: DbAccount) -> AccountView {
    let state = AccountState::from_db(db.state.as_deref());
    let granted_sections = sections_from_json(&db.granted_sections);
    AccountView {
        id: db.id,
        email: db.email,
        employee_code: db.employee_code,
        display_name: db.display_name,
        state,
        role_id: db.role_id,
        role_name: db.role_name,
        granted_sections,
        approved_at: db.approved_at,
        created_at: db.created_at,
    }
}

pub fn db_role_to_entry(db: DbRole) -> RoleEntry {
    let default_sections = sections_from_json(&db.default_sections);
    RoleEntry {
        id: db.id,
        name: db.name,
        description: db.description,
        default_sections,
    }
}
