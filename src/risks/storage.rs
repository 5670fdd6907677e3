use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{RiskCategory, RiskLevel};
use crate::shared::schema::risks;

use super::types::{RiskRecord, RiskStatus, Severity};

// treat_none_as_null: a full-row update must clear assessment columns
// when a category switch reset them.
#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = risks, treat_none_as_null = true)]
pub struct DbRisk {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub likelihood: Option<BigDecimal>,
    pub impact: Option<BigDecimal>,
    pub score: Option<BigDecimal>,
    pub risk_level: Option<String>,
    pub severity: Option<String>,
    pub assessment_notes: Option<String>,
    pub treatment_plan: Option<String>,
    pub review_date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub reporter_id: Option<Uuid>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn db_risk_to_record(db: DbRisk) -> RiskRecord {
    let category: RiskCategory = db.category.parse().unwrap_or(RiskCategory::Other);
    let status: RiskStatus = db.status.parse().unwrap_or(RiskStatus::Open);
    let risk_level: Option<RiskLevel> = db.risk_level.as_deref().and_then(|s| s.parse().ok());
    let severity: Option<Severity> = db.severity.as_deref().and_then(|s| s.parse().ok());

    RiskRecord {
        id: db.id,
        code: db.code,
        title: db.title,
        description: db.description,
        category,
        status,
        workflow: status.workflow(),
        likelihood: db.likelihood,
        impact: db.impact,
        score: db.score,
        risk_level,
        severity,
        assessment_notes: db.assessment_notes,
        treatment_plan: db.treatment_plan,
        review_date: db.review_date,
        owner_id: db.owner_id,
        reporter_id: db.reporter_id,
        evaluated_at: db.evaluated_at,
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

pub fn generate_risk_code(conn: &mut PgConnection) -> String {
    let count: i64 = risks::table.count().get_result(conn).unwrap_or(0);
    format!("RSK-{:06}", count + 1)
}

/// Applies a category change. A switch invalidates the stored impact
/// selection, so likelihood/impact/score/level reset with it. Returns
/// whether anything changed.
pub fn change_category(risk: &mut DbRisk, category: RiskCategory) -> bool {
    if risk.category == category.to_string() {
        return false;
    }
    risk.category = category.to_string();
    risk.likelihood = None;
    risk.impact = None;
    risk.score = None;
    risk.risk_level = None;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risks::types::RiskStatus;
    use std::str::FromStr;

    fn assessed_risk() -> DbRisk {
        let now = Utc::now();
        DbRisk {
            id: Uuid::new_v4(),
            code: "RSK-000001".to_string(),
            title: "Supplier insolvency".to_string(),
            description: "Key supplier at risk of insolvency".to_string(),
            category: RiskCategory::Financial.to_string(),
            status: RiskStatus::Mitigated.to_string(),
            likelihood: Some(BigDecimal::from_str("0.40").unwrap()),
            impact: Some(BigDecimal::from_str("0.40").unwrap()),
            score: Some(BigDecimal::from_str("0.16").unwrap()),
            risk_level: Some("high".to_string()),
            severity: Some("medium".to_string()),
            assessment_notes: Some("reviewed".to_string()),
            treatment_plan: None,
            review_date: None,
            owner_id: None,
            reporter_id: None,
            evaluated_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn category_switch_clears_the_assessment() {
        let mut risk = assessed_risk();
        assert!(change_category(&mut risk, RiskCategory::Reputation));
        assert_eq!(risk.category, "reputation");
        assert!(risk.likelihood.is_none());
        assert!(risk.impact.is_none());
        assert!(risk.score.is_none());
        assert!(risk.risk_level.is_none());
    }

    #[test]
    fn same_category_is_a_no_op() {
        let mut risk = assessed_risk();
        assert!(!change_category(&mut risk, RiskCategory::Financial));
        assert!(risk.score.is_some());
    }
}
