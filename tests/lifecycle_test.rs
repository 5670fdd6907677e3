use bigdecimal::BigDecimal;
use std::str::FromStr;

use riskserver::risks::lifecycle::{
    can_transition, ensure_claimable, ensure_status_change, validate_evaluation,
};
use riskserver::risks::types::{EvaluationRequest, RiskStatus, Severity};
use riskserver::risks::RiskError;
use riskserver::scoring::{RiskCategory, RiskLevel};

fn environmental_evaluation() -> EvaluationRequest {
    EvaluationRequest {
        outcome: RiskStatus::Mitigated,
        likelihood: 0.2,
        impact: 0.5,
        severity: Severity::Medium,
        assessment_notes: "reviewed".to_string(),
        treatment_plan: Some("Bund the storage area".to_string()),
        review_date: None,
    }
}

#[test]
fn the_two_vocabularies_never_mix() {
    let self_managed = [
        RiskStatus::Open,
        RiskStatus::InProgress,
        RiskStatus::Resolved,
        RiskStatus::Closed,
    ];
    let evaluation = [
        RiskStatus::Submitted,
        RiskStatus::InReview,
        RiskStatus::Mitigated,
        RiskStatus::Escalated,
    ];
    for from in self_managed {
        for to in evaluation {
            assert!(!can_transition(from, to), "{from} -> {to} must be illegal");
            assert!(!can_transition(to, from), "{to} -> {from} must be illegal");
        }
    }
}

#[test]
fn self_managed_statuses_move_freely() {
    let statuses = [
        RiskStatus::Open,
        RiskStatus::InProgress,
        RiskStatus::Resolved,
        RiskStatus::Closed,
    ];
    for from in statuses {
        for to in statuses {
            assert!(ensure_status_change(from, to).is_ok());
        }
    }
}

#[test]
fn status_endpoint_refuses_evaluation_statuses() {
    let err = ensure_status_change(RiskStatus::Submitted, RiskStatus::InReview).unwrap_err();
    assert!(matches!(err, RiskError::Validation(_)));
}

#[test]
fn full_evaluation_pass_computes_score() {
    let outcome = validate_evaluation(
        RiskStatus::InReview,
        RiskCategory::Environmental,
        &environmental_evaluation(),
    )
    .unwrap();
    assert_eq!(outcome.score.rounded(), BigDecimal::from_str("0.10").unwrap());
    assert_eq!(outcome.score.level, RiskLevel::Medium);
}

#[test]
fn missing_notes_block_the_transition() {
    let mut req = environmental_evaluation();
    req.assessment_notes = String::new();
    let err = validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req)
        .unwrap_err();
    match err {
        RiskError::Validation(msg) => assert!(msg.contains("assessment_notes")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn submitted_records_must_be_claimed_before_evaluation() {
    let err = validate_evaluation(
        RiskStatus::Submitted,
        RiskCategory::Environmental,
        &environmental_evaluation(),
    )
    .unwrap_err();
    assert!(matches!(err, RiskError::Precondition(_)));
}

#[test]
fn revision_cycle_is_legal() {
    // Mitigated -> In Review (claim) -> Escalated revises an assessment.
    assert!(ensure_claimable(RiskStatus::Mitigated).is_ok());
    let mut req = environmental_evaluation();
    req.outcome = RiskStatus::Escalated;
    assert!(validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req).is_ok());
}

#[test]
fn terminal_outcome_must_be_mitigated_or_escalated() {
    let mut req = environmental_evaluation();
    req.outcome = RiskStatus::Closed;
    let err = validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req)
        .unwrap_err();
    match err {
        RiskError::Validation(msg) => assert!(msg.contains("outcome")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}
