use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::shared::schema::risk_roles;

/// Dashboard section identifiers grantable to an account.
pub mod sections {
    pub const OVERVIEW: &str = "overview";
    pub const RISK_MANAGEMENT: &str = "risk_management";
    pub const REPORT_RISK: &str = "report_risk";
    pub const REPORTS: &str = "reports";
    pub const ACCESS_CONTROL: &str = "access_control";
    pub const AUDIT_LOG: &str = "audit_log";
    pub const SETTINGS: &str = "settings";
}

pub struct CatalogRole {
    pub name: &'static str,
    pub description: &'static str,
    pub sections: &'static [&'static str],
}

/// Role -> default-section mapping, kept as pure data. Approval
/// snapshots the section set into the account; later catalog edits never
/// retroactively change an existing grant.
pub const CATALOG: [CatalogRole; 5] = [
    CatalogRole {
        name: "Administrator",
        description: "Full access to every dashboard section",
        sections: &[
            sections::OVERVIEW,
            sections::RISK_MANAGEMENT,
            sections::REPORT_RISK,
            sections::REPORTS,
            sections::ACCESS_CONTROL,
            sections::AUDIT_LOG,
            sections::SETTINGS,
        ],
    },
    CatalogRole {
        name: "Risk Owner",
        description: "Evaluates reported risks and manages the register",
        sections: &[
            sections::OVERVIEW,
            sections::RISK_MANAGEMENT,
            sections::REPORTS,
        ],
    },
    CatalogRole {
        name: "Reporter",
        description: "Submits risks for evaluation",
        sections: &[sections::OVERVIEW, sections::REPORT_RISK],
    },
    CatalogRole {
        name: "Auditor",
        description: "Read-only reporting and audit trail",
        sections: &[sections::OVERVIEW, sections::REPORTS, sections::AUDIT_LOG],
    },
    CatalogRole {
        name: "Viewer",
        description: "Landing dashboard only",
        sections: &[sections::OVERVIEW],
    },
];

/// Default sections for a role name. Roles outside the catalog get an
/// empty default set so the operator picks grants manually.
pub fn default_sections(role_name: &str) -> &'static [&'static str] {
    CATALOG
        .iter()
        .find(|r| r.name == role_name)
        .map(|r| r.sections)
        .unwrap_or(&[])
}

/// Inserts catalog roles missing from the database. Idempotent; run at
/// bootstrap. Roles added by operators outside the catalog are left
/// untouched.
pub fn seed_roles(conn: &mut PgConnection) -> QueryResult<usize> {
    let now = Utc::now();
    let mut inserted = 0;
    for role in CATALOG.iter() {
        let sections: Vec<String> = role.sections.iter().map(|s| s.to_string()).collect();
        inserted += diesel::insert_into(risk_roles::table)
            .values((
                risk_roles::id.eq(Uuid::new_v4()),
                risk_roles::name.eq(role.name),
                risk_roles::description.eq(role.description),
                risk_roles::default_sections.eq(serde_json::json!(sections)),
                risk_roles::created_at.eq(now),
            ))
            .on_conflict(risk_roles::name)
            .do_nothing()
            .execute(conn)?;
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_owner_defaults_are_exact() {
        assert_eq!(
            default_sections("Risk Owner"),
            &["overview", "risk_management", "reports"]
        );
    }

    #[test]
    fn uncataloged_role_defaults_to_empty() {
        assert!(default_sections("Executive Sponsor").is_empty());
    }

    #[test]
    fn catalog_names_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in CATALOG.iter().skip(i + 1) {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
