//! Budget handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use super::caller;
use crate::{get_user_email, parse_json, AppError, AppState};
use nestegg_core::budget::{self, BudgetEvaluation};
use nestegg_core::insights::Insight;
use nestegg_core::models::{Budget, BudgetCategory, SavedBudget};
use nestegg_core::AdviceSource;

/// Request body for budget recommendations
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsRequest {
    pub monthly_income: f64,
}

/// Response for budget insights
#[derive(Debug, Serialize)]
pub struct BudgetInsightsResponse {
    pub insights: Vec<Insight>,
    pub source: AdviceSource,
}

/// GET /api/budget/categories - The standard categories with recommended percentages
pub async fn list_budget_categories(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BudgetCategory>>, AppError> {
    let user_email = get_user_email(&headers);
    let categories = Budget::standard(0.0).categories;

    state
        .db
        .log_audit(&user_email, "list", Some("budget_category"), None, None)?;

    Ok(Json(categories))
}

/// GET /api/budget - The caller's saved budget (all zeros before the first save)
pub async fn get_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SavedBudget>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;
    let saved = state.db.get_budget(user_id)?;

    state
        .db
        .log_audit(&user_email, "view", Some("budget"), Some(user_id), None)?;

    Ok(Json(saved))
}

/// PUT /api/budget - Save (overwrite) the caller's budget
pub async fn save_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SavedBudget>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;
    let saved: SavedBudget = parse_json(&body)?;
    saved.to_budget().validate()?;

    state.db.upsert_budget(user_id, &saved)?;
    let stored = state.db.get_budget(user_id)?;

    state.db.log_audit(
        &user_email,
        "update",
        Some("budget"),
        Some(user_id),
        Some(&format!("monthly_income={:.2}", stored.monthly_income)),
    )?;

    Ok(Json(stored))
}

/// POST /api/budget/evaluate - Totals, breakdown, variances and health metrics
pub async fn evaluate_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BudgetEvaluation>, AppError> {
    let user_email = get_user_email(&headers);
    let budget: Budget = parse_json(&body)?;
    budget.validate()?;

    let evaluation = budget::evaluate(&budget);

    state.db.log_audit(
        &user_email,
        "evaluate",
        Some("budget"),
        None,
        Some(&format!(
            "categories={}, significant_variances={}",
            budget.categories.len(),
            evaluation.report.significant().count()
        )),
    )?;

    Ok(Json(evaluation))
}

/// POST /api/budget/recommendations - The standard budget at recommended amounts
pub async fn recommend_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Budget>, AppError> {
    let user_email = get_user_email(&headers);
    let req: RecommendationsRequest = parse_json(&body)?;

    let mut budget = Budget::standard(req.monthly_income);
    budget.validate()?;
    budget::apply_recommendations(&mut budget);

    state.db.log_audit(
        &user_email,
        "recommend",
        Some("budget"),
        None,
        Some(&format!("monthly_income={:.2}", req.monthly_income)),
    )?;

    Ok(Json(budget))
}

/// POST /api/budget/insights - AI insights with heuristic fallback
pub async fn budget_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BudgetInsightsResponse>, AppError> {
    let user_email = get_user_email(&headers);
    let budget: Budget = parse_json(&body)?;

    let advice = state.advisor.budget_insights(&budget).await?;

    state.db.log_audit(
        &user_email,
        "analyze",
        Some("budget"),
        None,
        Some(&format!(
            "source={}, count={}",
            advice.source,
            advice.value.len()
        )),
    )?;

    Ok(Json(BudgetInsightsResponse {
        insights: advice.value,
        source: advice.source,
    }))
}
