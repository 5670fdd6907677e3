use crate::scoring::{self, ImpactPoint, Likelihood, RiskCategory, RiskScore};

use super::types::{EvaluationRequest, RiskStatus, RiskWorkflow};
use super::RiskError;

/// Central legal-transition table for both status vocabularies.
/// Self-managed statuses move freely among themselves; the evaluation
/// pipeline is strict, with re-entry into review allowed for revisions.
/// Cross-workflow moves are never legal.
pub fn can_transition(from: RiskStatus, to: RiskStatus) -> bool {
    if from.workflow() != to.workflow() {
        return false;
    }
    match from.workflow() {
        RiskWorkflow::SelfManaged => true,
        RiskWorkflow::Evaluation => matches!(
            (from, to),
            (RiskStatus::Submitted, RiskStatus::InReview)
                | (RiskStatus::InReview, RiskStatus::Mitigated)
                | (RiskStatus::InReview, RiskStatus::Escalated)
                | (RiskStatus::Mitigated, RiskStatus::InReview)
                | (RiskStatus::Escalated, RiskStatus::InReview)
        ),
    }
}

/// Guard for the plain status endpoint (self-managed moves only; the
/// evaluation pipeline goes through claim/evaluate so its field
/// requirements cannot be bypassed).
pub fn ensure_status_change(from: RiskStatus, to: RiskStatus) -> Result<(), RiskError> {
    if to.workflow() != RiskWorkflow::SelfManaged {
        return Err(RiskError::Validation(format!(
            "status: {to} belongs to the evaluation pipeline; use claim/evaluate"
        )));
    }
    if !can_transition(from, to) {
        return Err(RiskError::Validation(format!(
            "status: transition {from} -> {to} is not allowed"
        )));
    }
    Ok(())
}

/// Guard for `claim`: an evaluator opens a submitted report, or reopens
/// a finished one to revise the assessment.
pub fn ensure_claimable(current: RiskStatus) -> Result<(), RiskError> {
    match current {
        RiskStatus::Submitted | RiskStatus::Mitigated | RiskStatus::Escalated => Ok(()),
        RiskStatus::InReview => Err(RiskError::Precondition(
            "risk is already in review".to_string(),
        )),
        other => Err(RiskError::Precondition(format!(
            "risk in status {other} cannot be claimed for evaluation"
        ))),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationOutcome {
    pub likelihood: Likelihood,
    pub impact: &'static ImpactPoint,
    pub score: RiskScore,
}

/// Validates the evaluation form against the record's current state and
/// category, and computes the derived score. Nothing is persisted here;
/// a failed validation must leave the record untouched.
pub fn validate_evaluation(
    current: RiskStatus,
    category: RiskCategory,
    req: &EvaluationRequest,
) -> Result<EvaluationOutcome, RiskError> {
    if !matches!(req.outcome, RiskStatus::Mitigated | RiskStatus::Escalated) {
        return Err(RiskError::Validation(format!(
            "outcome: must be mitigated or escalated, got {}",
            req.outcome
        )));
    }
    if current != RiskStatus::InReview {
        return Err(RiskError::Precondition(format!(
            "risk must be in_review to evaluate, currently {current}"
        )));
    }
    if req.assessment_notes.trim().is_empty() {
        return Err(RiskError::Validation(
            "assessment_notes: must not be empty".to_string(),
        ));
    }

    let likelihood = scoring::resolve_likelihood(req.likelihood)
        .map_err(|e| RiskError::Validation(format!("likelihood: {e}")))?;
    let impact = scoring::resolve_impact(category, req.impact)
        .map_err(|e| RiskError::Validation(format!("impact: {e}")))?;
    let score = scoring::score(category, likelihood, impact.value)
        .map_err(|e| RiskError::Validation(e.to_string()))?;

    Ok(EvaluationOutcome {
        likelihood,
        impact,
        score,
    })
}

pub fn require_text(field: &str, value: &str) -> Result<(), RiskError> {
    if value.trim().is_empty() {
        return Err(RiskError::Validation(format!("{field}: must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::RiskLevel;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn evaluation(outcome: RiskStatus, notes: &str) -> EvaluationRequest {
        EvaluationRequest {
            outcome,
            likelihood: 0.2,
            impact: 0.5,
            severity: crate::risks::types::Severity::Medium,
            assessment_notes: notes.to_string(),
            treatment_plan: None,
            review_date: None,
        }
    }

    #[test]
    fn self_managed_moves_are_free() {
        assert!(can_transition(RiskStatus::Open, RiskStatus::Closed));
        assert!(can_transition(RiskStatus::Closed, RiskStatus::InProgress));
        assert!(can_transition(RiskStatus::Resolved, RiskStatus::Open));
    }

    #[test]
    fn cross_workflow_moves_are_illegal() {
        assert!(!can_transition(RiskStatus::Open, RiskStatus::InReview));
        assert!(!can_transition(RiskStatus::Mitigated, RiskStatus::Closed));
        assert!(ensure_status_change(RiskStatus::Open, RiskStatus::Submitted).is_err());
    }

    #[test]
    fn evaluation_pipeline_is_strict() {
        assert!(can_transition(RiskStatus::Submitted, RiskStatus::InReview));
        assert!(can_transition(RiskStatus::InReview, RiskStatus::Mitigated));
        assert!(can_transition(RiskStatus::InReview, RiskStatus::Escalated));
        assert!(!can_transition(RiskStatus::Submitted, RiskStatus::Mitigated));
        assert!(!can_transition(RiskStatus::Mitigated, RiskStatus::Escalated));
    }

    #[test]
    fn finished_evaluations_can_reenter_review() {
        assert!(can_transition(RiskStatus::Mitigated, RiskStatus::InReview));
        assert!(can_transition(RiskStatus::Escalated, RiskStatus::InReview));
        assert!(ensure_claimable(RiskStatus::Escalated).is_ok());
    }

    #[test]
    fn claim_rejects_active_review() {
        let err = ensure_claimable(RiskStatus::InReview).unwrap_err();
        assert!(matches!(err, RiskError::Precondition(_)));
    }

    #[test]
    fn evaluation_without_notes_is_rejected() {
        let req = evaluation(RiskStatus::Mitigated, "   ");
        let err =
            validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req)
                .unwrap_err();
        match err {
            RiskError::Validation(msg) => assert!(msg.contains("assessment_notes")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn evaluation_from_wrong_state_is_a_precondition_failure() {
        let req = evaluation(RiskStatus::Mitigated, "reviewed");
        let err =
            validate_evaluation(RiskStatus::Submitted, RiskCategory::Environmental, &req)
                .unwrap_err();
        assert!(matches!(err, RiskError::Precondition(_)));
    }

    #[test]
    fn evaluation_computes_the_derived_score() {
        let req = evaluation(RiskStatus::Mitigated, "reviewed");
        let outcome =
            validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req).unwrap();
        assert_eq!(outcome.likelihood, Likelihood::Possible);
        assert_eq!(outcome.score.level, RiskLevel::Medium);
        assert_eq!(
            outcome.score.rounded(),
            BigDecimal::from_str("0.10").unwrap()
        );
    }

    #[test]
    fn evaluation_rejects_impact_from_another_scale() {
        let mut req = evaluation(RiskStatus::Mitigated, "reviewed");
        req.impact = 0.05; // generic-scale value, not environmental
        let err =
            validate_evaluation(RiskStatus::InReview, RiskCategory::Environmental, &req)
                .unwrap_err();
        match err {
            RiskError::Validation(msg) => assert!(msg.contains("impact")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
