use axum::{
    extract::{Path, Query, State},
    Json,
};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::access::gate::require_section;
use crate::access::roles::sections;
use crate::scoring::{self, Likelihood, RiskCategory};
use crate::security::AuthClaims;
use crate::shared::schema::risks;
use crate::shared::state::AppState;

use super::lifecycle;
use super::storage::{db_risk_to_record, generate_risk_code, DbRisk};
use super::types::{
    CategoryCount, ChangeStatusRequest, CreateRiskRequest, EvaluationRequest, LevelCount,
    LikelihoodOption, ListRisksQuery, PreviewScoreRequest, PreviewScoreResponse, RiskRecord,
    RiskStatus, RiskSummary, RiskWorkflow, ScaleEntry, ScalePoint, StatusCount, UpdateRiskRequest,
};
use super::RiskError;

fn actor_id(claims: &AuthClaims) -> Result<Uuid, RiskError> {
    claims
        .0
        .account_id()
        .map_err(|e| RiskError::Unauthorized(e.to_string()))
}

fn two_places(value: f64) -> BigDecimal {
    BigDecimal::try_from(value)
        .unwrap_or_default()
        .with_scale_round(2, RoundingMode::HalfUp)
}

fn load_risk(conn: &mut PgConnection, id: Uuid) -> Result<DbRisk, RiskError> {
    risks::table
        .find(id)
        .first(conn)
        .optional()
        .map_err(|e| RiskError::Database(e.to_string()))?
        .ok_or_else(|| RiskError::NotFound(format!("risk {id} not found")))
}

fn insert_risk(
    conn: &mut PgConnection,
    req: CreateRiskRequest,
    status: RiskStatus,
    owner_id: Option<Uuid>,
    reporter_id: Option<Uuid>,
) -> Result<RiskRecord, RiskError> {
    lifecycle::require_text("title", &req.title)?;
    lifecycle::require_text("description", &req.description)?;

    let now = Utc::now();
    let risk = DbRisk {
        id: Uuid::new_v4(),
        code: generate_risk_code(conn),
        title: req.title,
        description: req.description,
        category: req.category.to_string(),
        status: status.to_string(),
        likelihood: None,
        impact: None,
        score: None,
        risk_level: None,
        severity: None,
        assessment_notes: None,
        treatment_plan: req.treatment_plan,
        review_date: req.review_date,
        owner_id,
        reporter_id,
        evaluated_at: None,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(risks::table)
        .values(&risk)
        .execute(conn)
        .map_err(|e| RiskError::Database(e.to_string()))?;

    log::info!("Created risk {} ({})", risk.code, risk.status);
    Ok(db_risk_to_record(risk))
}

pub async fn handle_create_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Json(req): Json<CreateRiskRequest>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        let account = require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;
        insert_risk(&mut conn, req, RiskStatus::Open, Some(account.id), None)
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_report_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Json(req): Json<CreateRiskRequest>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        let account = require_section(&mut conn, actor, sections::REPORT_RISK)?;
        insert_risk(
            &mut conn,
            req,
            RiskStatus::Submitted,
            None,
            Some(account.id),
        )
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_list_risks(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Query(query): Query<ListRisksQuery>,
) -> Result<Json<Vec<RiskRecord>>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let limit = query.limit.unwrap_or(50);
        let offset = query.offset.unwrap_or(0);

        let mut q = risks::table.into_boxed();

        if let Some(status) = query.status {
            q = q.filter(risks::status.eq(status));
        }

        if let Some(category) = query.category {
            q = q.filter(risks::category.eq(category));
        }

        if let Some(owner_id) = query.owner_id {
            q = q.filter(risks::owner_id.eq(owner_id));
        }

        if let Some(search) = query.search {
            let pattern = format!("%{search}%");
            q = q.filter(
                risks::title
                    .ilike(pattern.clone())
                    .or(risks::description.ilike(pattern.clone()))
                    .or(risks::code.ilike(pattern)),
            );
        }

        let rows: Vec<DbRisk> = q
            .order(risks::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        Ok::<_, RiskError>(rows.into_iter().map(db_risk_to_record).collect())
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_get_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;
        let risk = load_risk(&mut conn, id)?;
        Ok::<_, RiskError>(db_risk_to_record(risk))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_update_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRiskRequest>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let mut risk = load_risk(&mut conn, id)?;

        if let Some(title) = req.title {
            lifecycle::require_text("title", &title)?;
            risk.title = title;
        }
        if let Some(description) = req.description {
            lifecycle::require_text("description", &description)?;
            risk.description = description;
        }
        if let Some(category) = req.category {
            super::storage::change_category(&mut risk, category);
        }
        if let Some(plan) = req.treatment_plan {
            risk.treatment_plan = Some(plan);
        }
        if let Some(review_date) = req.review_date {
            risk.review_date = Some(review_date);
        }
        if let Some(owner_id) = req.owner_id {
            risk.owner_id = Some(owner_id);
        }
        risk.updated_at = Utc::now();

        diesel::update(risks::table.find(id))
            .set(&risk)
            .execute(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        Ok::<_, RiskError>(db_risk_to_record(risk))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_change_status(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let risk = load_risk(&mut conn, id)?;
        let current: RiskStatus = risk
            .status
            .parse()
            .map_err(|e: String| RiskError::Internal(e))?;
        lifecycle::ensure_status_change(current, req.status)?;

        let updated = diesel::update(
            risks::table
                .find(id)
                .filter(risks::status.eq(current.to_string())),
        )
        .set((
            risks::status.eq(req.status.to_string()),
            risks::updated_at.eq(Utc::now()),
        ))
        .get_result::<DbRisk>(&mut conn)
        .optional()
        .map_err(|e| RiskError::Database(e.to_string()))?
        .ok_or_else(|| {
            RiskError::Precondition("risk status changed concurrently".to_string())
        })?;

        Ok::<_, RiskError>(db_risk_to_record(updated))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

/// `submitted -> in_review` (or re-entry from a finished evaluation);
/// records the evaluator as owner.
pub async fn handle_claim_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        let account = require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let risk = load_risk(&mut conn, id)?;
        let current: RiskStatus = risk
            .status
            .parse()
            .map_err(|e: String| RiskError::Internal(e))?;
        lifecycle::ensure_claimable(current)?;

        let updated = diesel::update(
            risks::table
                .find(id)
                .filter(risks::status.eq(current.to_string())),
        )
        .set((
            risks::status.eq(RiskStatus::InReview.to_string()),
            risks::owner_id.eq(account.id),
            risks::updated_at.eq(Utc::now()),
        ))
        .get_result::<DbRisk>(&mut conn)
        .optional()
        .map_err(|e| RiskError::Database(e.to_string()))?
        .ok_or_else(|| {
            RiskError::Precondition("risk was claimed concurrently".to_string())
        })?;

        log::info!("Risk {} claimed by {}", updated.code, account.id);
        Ok::<_, RiskError>(db_risk_to_record(updated))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

/// The evaluation transition: validate the form, compute the derived
/// score, then persist status and assessment fields in one
/// compare-and-set write keyed on the in_review status.
pub async fn handle_evaluate_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<RiskRecord>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        let account = require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let risk = load_risk(&mut conn, id)?;
        let current: RiskStatus = risk
            .status
            .parse()
            .map_err(|e: String| RiskError::Internal(e))?;
        let category: RiskCategory = risk
            .category
            .parse()
            .map_err(|e: String| RiskError::Internal(e))?;

        let outcome = lifecycle::validate_evaluation(current, category, &req)?;
        let now = Utc::now();

        let updated = diesel::update(
            risks::table
                .find(id)
                .filter(risks::status.eq(RiskStatus::InReview.to_string())),
        )
        .set((
            risks::status.eq(req.outcome.to_string()),
            risks::likelihood.eq(two_places(outcome.likelihood.weight())),
            risks::impact.eq(two_places(outcome.impact.value)),
            risks::score.eq(outcome.score.rounded()),
            risks::risk_level.eq(outcome.score.level.to_string()),
            risks::severity.eq(req.severity.to_string()),
            risks::assessment_notes.eq(req.assessment_notes.clone()),
            risks::treatment_plan.eq(req.treatment_plan.clone().or(risk.treatment_plan)),
            risks::review_date.eq(req.review_date.or(risk.review_date)),
            risks::owner_id.eq(account.id),
            risks::evaluated_at.eq(now),
            risks::updated_at.eq(now),
        ))
        .get_result::<DbRisk>(&mut conn)
        .optional()
        .map_err(|e| RiskError::Database(e.to_string()))?
        .ok_or_else(|| {
            RiskError::Precondition("risk left review before the evaluation landed".to_string())
        })?;

        log::info!(
            "Risk {} evaluated to {} (score {}, level {})",
            updated.code,
            updated.status,
            outcome.score.rounded(),
            outcome.score.level
        );
        Ok::<_, RiskError>(db_risk_to_record(updated))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_delete_risk(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::RISK_MANAGEMENT)?;

        let risk = load_risk(&mut conn, id)?;
        let status: RiskStatus = risk
            .status
            .parse()
            .map_err(|e: String| RiskError::Internal(e))?;

        let deletable = status.workflow() == RiskWorkflow::SelfManaged
            || status == RiskStatus::Submitted;
        if !deletable {
            return Err(RiskError::Precondition(format!(
                "risk in status {status} is never hard-deleted"
            )));
        }

        diesel::delete(risks::table.find(id))
            .execute(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        log::info!("Deleted risk {}", risk.code);
        Ok::<_, RiskError>(serde_json::json!({ "deleted": risk.code }))
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

pub async fn handle_risk_summary(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
) -> Result<Json<RiskSummary>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::REPORTS)?;

        let total_risks: i64 = risks::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        let by_status: Vec<(String, i64)> = risks::table
            .group_by(risks::status)
            .select((risks::status, count_star()))
            .load(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        let by_level: Vec<(Option<String>, i64)> = risks::table
            .group_by(risks::risk_level)
            .select((risks::risk_level, count_star()))
            .load(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        let by_category: Vec<(String, i64)> = risks::table
            .group_by(risks::category)
            .select((risks::category, count_star()))
            .load(&mut conn)
            .map_err(|e| RiskError::Database(e.to_string()))?;

        Ok::<_, RiskError>(RiskSummary {
            total_risks,
            by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_level: by_level
                .into_iter()
                .filter_map(|(level, count)| level.map(|level| LevelCount { level, count }))
                .collect(),
            by_category: by_category
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect(),
            generated_at: Utc::now(),
        })
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    Ok(Json(result))
}

/// Reference data for selection UIs: likelihood options plus the impact
/// scale registered for each category.
pub async fn handle_scales(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
) -> Result<Json<serde_json::Value>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::OVERVIEW)?;
        Ok::<_, RiskError>(())
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    let likelihoods: Vec<LikelihoodOption> = Likelihood::ALL
        .into_iter()
        .map(|l| LikelihoodOption {
            value: l.weight(),
            label: l.label(),
        })
        .collect();

    let scales: Vec<ScaleEntry> = RiskCategory::ALL
        .into_iter()
        .map(|category| ScaleEntry {
            category,
            points: scoring::impact_scale(category)
                .iter()
                .map(|p| ScalePoint {
                    value: p.value,
                    label: p.label,
                })
                .collect(),
        })
        .collect();

    Ok(Json(serde_json::json!({
        "likelihoods": likelihoods,
        "scales": scales,
    })))
}

pub async fn handle_preview_score(
    State(state): State<Arc<AppState>>,
    claims: AuthClaims,
    Json(req): Json<PreviewScoreRequest>,
) -> Result<Json<PreviewScoreResponse>, RiskError> {
    let actor = actor_id(&claims)?;
    let pool = state.conn.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| RiskError::Database(e.to_string()))?;
        require_section(&mut conn, actor, sections::OVERVIEW)?;
        Ok::<_, RiskError>(())
    })
    .await
    .map_err(|e| RiskError::Internal(e.to_string()))??;

    let likelihood = scoring::resolve_likelihood(req.likelihood)
        .map_err(|e| RiskError::Validation(format!("likelihood: {e}")))?;
    let score = scoring::score(req.category, likelihood, req.impact)
        .map_err(|e| RiskError::Validation(e.to_string()))?;

    Ok(Json(PreviewScoreResponse {
        score: score.rounded(),
        level: score.level,
    }))
}
