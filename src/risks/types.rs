use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{RiskCategory, RiskLevel};

/// One status vocabulary covering both workflows. The self-managed
/// statuses move freely among themselves; the evaluation statuses follow
/// the reporter -> risk-owner pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Submitted,
    InReview,
    Mitigated,
    Escalated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskWorkflow {
    SelfManaged,
    Evaluation,
}

impl RiskStatus {
    pub fn workflow(&self) -> RiskWorkflow {
        match self {
            Self::Open | Self::InProgress | Self::Resolved | Self::Closed => {
                RiskWorkflow::SelfManaged
            }
            Self::Submitted | Self::InReview | Self::Mitigated | Self::Escalated => {
                RiskWorkflow::Evaluation
            }
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Submitted => "submitted",
            Self::InReview => "in_review",
            Self::Mitigated => "mitigated",
            Self::Escalated => "escalated",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for RiskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "submitted" => Ok(Self::Submitted),
            "in_review" => Ok(Self::InReview),
            "mitigated" => Ok(Self::Mitigated),
            "escalated" => Ok(Self::Escalated),
            _ => Err(format!("Unknown status: {s}")),
        }
    }
}

/// Manual severity classification supplied by the evaluator, distinct
/// from the derived risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskRecord {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: RiskCategory,
    pub status: RiskStatus,
    pub workflow: RiskWorkflow,
    pub likelihood: Option<BigDecimal>,
    pub impact: Option<BigDecimal>,
    pub score: Option<BigDecimal>,
    pub risk_level: Option<RiskLevel>,
    pub severity: Option<Severity>,
    pub assessment_notes: Option<String>,
    pub treatment_plan: Option<String>,
    pub review_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub reporter_id: Option<Uuid>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRiskRequest {
    pub title: String,
    pub description: String,
    pub category: RiskCategory,
    pub treatment_plan: Option<String>,
    pub review_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRiskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<RiskCategory>,
    pub treatment_plan: Option<String>,
    pub review_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: RiskStatus,
}

/// Evaluation form for the `in_review -> mitigated | escalated`
/// transition. Likelihood and impact arrive as the numeric weights the
/// selection UI presents.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    pub outcome: RiskStatus,
    pub likelihood: f64,
    pub impact: f64,
    pub severity: Severity,
    pub assessment_notes: String,
    pub treatment_plan: Option<String>,
    pub review_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewScoreRequest {
    pub category: RiskCategory,
    pub likelihood: f64,
    pub impact: f64,
}

#[derive(Debug, Serialize)]
pub struct PreviewScoreResponse {
    pub score: BigDecimal,
    pub level: RiskLevel,
}

#[derive(Debug, Deserialize)]
pub struct ListRisksQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RiskSummary {
    pub total_risks: i64,
    pub by_status: Vec<StatusCount>,
    pub by_level: Vec<LevelCount>,
    pub by_category: Vec<CategoryCount>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct LevelCount {
    pub level: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ScaleEntry {
    pub category: RiskCategory,
    pub points: Vec<ScalePoint>,
}

#[derive(Debug, Serialize)]
pub struct ScalePoint {
    pub value: f64,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LikelihoodOption {
    pub value: f64,
    pub label: &'static str,
}
