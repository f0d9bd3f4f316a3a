//! Retirement projection handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, parse_json, AppError, AppState};
use nestegg_core::growth::{simulate, ScenarioProjector};
use nestegg_core::insights::SavingTip;
use nestegg_core::models::{GrowthResult, InvestmentParameters, Scenario};
use nestegg_core::{Advice, AdviceSource};

/// Request body for what-if scenarios
#[derive(Debug, Deserialize)]
pub struct ScenariosRequest {
    #[serde(flatten)]
    pub params: InvestmentParameters,
    /// Ask the advisor for scenarios instead of the presets
    #[serde(default)]
    pub ai: bool,
}

#[derive(Debug, Serialize)]
pub struct ScenariosResponse {
    pub scenarios: Vec<Scenario>,
    pub source: AdviceSource,
}

#[derive(Debug, Serialize)]
pub struct TipsResponse {
    pub tips: Vec<SavingTip>,
    pub source: AdviceSource,
}

fn describe(params: &InvestmentParameters) -> String {
    format!(
        "age={}..{}, monthly={:.2}, return={}%",
        params.current_age,
        params.retirement_age,
        params.monthly_contribution,
        params.annual_return_percent
    )
}

/// POST /api/investment/project - Year-by-year growth projection
pub async fn project_growth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GrowthResult>, AppError> {
    let user_email = get_user_email(&headers);
    let params: InvestmentParameters = parse_json(&body)?;

    let result = simulate(&params)?;

    state.db.log_audit(
        &user_email,
        "project",
        Some("investment"),
        None,
        Some(&describe(&params)),
    )?;

    Ok(Json(result))
}

/// POST /api/investment/scenarios - Preset or AI what-if scenarios
pub async fn investment_scenarios(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScenariosResponse>, AppError> {
    let user_email = get_user_email(&headers);
    let req: ScenariosRequest = parse_json(&body)?;

    let base = simulate(&req.params)?;
    let advice = if req.ai {
        state.advisor.scenarios(&req.params, &base).await?
    } else {
        Advice::heuristic(ScenarioProjector::new(&req.params, &base).presets()?)
    };

    state.db.log_audit(
        &user_email,
        "scenarios",
        Some("investment"),
        None,
        Some(&format!("{}, source={}", describe(&req.params), advice.source)),
    )?;

    Ok(Json(ScenariosResponse {
        scenarios: advice.value,
        source: advice.source,
    }))
}

/// POST /api/investment/tips - Money-saving tips for the plan (at most six)
pub async fn saving_tips(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TipsResponse>, AppError> {
    let user_email = get_user_email(&headers);
    let params: InvestmentParameters = parse_json(&body)?;

    let projection = simulate(&params)?;
    let advice = state.advisor.saving_tips(&params, Some(&projection)).await?;

    state.db.log_audit(
        &user_email,
        "tips",
        Some("investment"),
        None,
        Some(&format!("{}, source={}", describe(&params), advice.source)),
    )?;

    Ok(Json(TipsResponse {
        tips: advice.value,
        source: advice.source,
    }))
}
