use uuid::Uuid;

use riskserver::access::gate::{can_access, SessionAccount};
use riskserver::access::processor::{can_approve, can_reject};
use riskserver::access::roles::{default_sections, sections, CATALOG};
use riskserver::access::types::AccountState;

fn approved(sections: &[&str]) -> SessionAccount {
    SessionAccount {
        id: Uuid::new_v4(),
        email: "owner@example.com".into(),
        state: AccountState::Approved,
        role_name: Some("Risk Owner".into()),
        granted_sections: sections.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn risk_owner_catalog_defaults_seed_exactly() {
    assert_eq!(
        default_sections("Risk Owner"),
        &["overview", "risk_management", "reports"]
    );
}

#[test]
fn uncataloged_roles_default_to_no_sections() {
    assert!(default_sections("Executive Sponsor").is_empty());
    assert!(default_sections("").is_empty());
}

#[test]
fn every_catalog_role_includes_the_overview() {
    for role in CATALOG.iter() {
        assert!(
            role.sections.contains(&sections::OVERVIEW),
            "{} lacks the landing section",
            role.name
        );
    }
}

#[test]
fn grant_snapshot_decides_access_not_the_role() {
    // Same role bound at approval time, different recorded overrides.
    let full = approved(&["overview", "risk_management", "reports"]);
    let trimmed = approved(&["overview", "reports"]);

    assert!(can_access(&full, sections::RISK_MANAGEMENT));
    assert!(!can_access(&trimmed, sections::RISK_MANAGEMENT));
    assert!(can_access(&trimmed, sections::REPORTS));
}

#[test]
fn non_approved_states_are_denied() {
    for state in [AccountState::Pending, AccountState::Rejected] {
        let account = SessionAccount {
            state,
            ..approved(&["overview"])
        };
        assert!(!can_access(&account, sections::OVERVIEW));
    }
}

#[test]
fn absent_state_reads_as_pending() {
    assert_eq!(AccountState::from_db(None), AccountState::Pending);
    assert_eq!(
        AccountState::from_db(Some("rejected")),
        AccountState::Rejected
    );
    // Unreadable legacy values also degrade to pending rather than erroring.
    assert_eq!(AccountState::from_db(Some("???")), AccountState::Pending);
}

#[test]
fn approval_preconditions_allow_reapproval_after_rejection() {
    assert!(can_approve(AccountState::Pending));
    assert!(can_approve(AccountState::Rejected));
    assert!(!can_approve(AccountState::Approved));

    assert!(can_reject(AccountState::Pending));
    assert!(!can_reject(AccountState::Approved));
}
