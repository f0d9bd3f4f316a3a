//! Expense record handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::caller;
use crate::{parse_json, AppError, AppState, MAX_PAGE_LIMIT};
use nestegg_core::budget::{summarize_records, CategoryBreakdown};
use nestegg_core::import::parse_csv;
use nestegg_core::insights::SpendingInsight;
use nestegg_core::models::{ExpenseRecord, NewExpenseRecord};
use nestegg_core::{AdviceSource, ImportSummary};

/// Most recent records sent along with an advice request
pub const ADVICE_RECORD_LIMIT: i64 = 200;

/// Query parameters for listing records
#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub limit: Option<i64>,
}

/// Request body for adding a record
#[derive(Debug, Deserialize)]
pub struct AddRecordRequest {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    /// Suggested by the advisor when omitted
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecordResponse {
    pub record: ExpenseRecord,
    /// Who chose the category (`ai` or `heuristic`); absent when the caller supplied it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_source: Option<AdviceSource>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub source: AdviceSource,
}

#[derive(Debug, Serialize)]
pub struct RecordInsightsResponse {
    pub insights: Vec<SpendingInsight>,
    pub source: AdviceSource,
}

/// GET /api/records - The caller's records, newest first
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RecordQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<ExpenseRecord>>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;
    let limit = params.limit.map(|l| l.clamp(1, MAX_PAGE_LIMIT));

    let records = state.db.list_expense_records(user_id, limit)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("expense_record"),
        None,
        Some(&format!("count={}", records.len())),
    )?;

    Ok(Json(records))
}

/// GET /api/records/:id - One of the caller's records
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<ExpenseRecord>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;

    let record = state
        .db
        .get_expense_record(user_id, id)?
        .ok_or_else(|| AppError::not_found("Expense record not found"))?;

    state
        .db
        .log_audit(&user_email, "view", Some("expense_record"), Some(id), None)?;

    Ok(Json(record))
}

/// POST /api/records - Add a record, asking the advisor for a category when none is given
pub async fn add_record(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AddRecordResponse>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;
    let req: AddRecordRequest = parse_json(&body)?;

    let description = req.description.trim();
    if description.is_empty() {
        return Err(AppError::bad_request("Description cannot be empty"));
    }
    if !req.amount.is_finite() {
        return Err(AppError::bad_request("Amount must be a finite number"));
    }

    let supplied = req
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let (category, category_source) = match supplied {
        Some(category) => (category, None),
        None => {
            let advice = state.advisor.categorize_expense(description).await?;
            (advice.value, Some(advice.source))
        }
    };

    let new_record = NewExpenseRecord::new(req.date, description, req.amount, Some(category));
    let id = state.db.add_expense_record(user_id, &new_record)?;
    let record = state
        .db
        .get_expense_record(user_id, id)?
        .ok_or_else(|| AppError::not_found("Expense record not found"))?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("expense_record"),
        Some(id),
        Some(&format!(
            "category={}, source={}",
            record.category.as_deref().unwrap_or_default(),
            category_source.map(|s| s.as_str()).unwrap_or("user")
        )),
    )?;

    Ok(Json(AddRecordResponse {
        record,
        category_source,
    }))
}

/// POST /api/records/import - Import a CSV body, skipping records already stored
pub async fn import_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportSummary>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;

    let records = parse_csv(&body[..])?;
    let summary = state.db.import_expense_records(user_id, &records)?;

    state.db.log_audit(
        &user_email,
        "import",
        Some("expense_record"),
        None,
        Some(&format!(
            "imported={}, skipped={}",
            summary.imported, summary.skipped
        )),
    )?;

    Ok(Json(summary))
}

/// GET /api/records/summary - Category breakdown of the caller's records
pub async fn records_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CategoryBreakdown>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;

    let records = state.db.list_expense_records(user_id, None)?;
    let breakdown = summarize_records(&records);

    state.db.log_audit(
        &user_email,
        "summarize",
        Some("expense_record"),
        None,
        Some(&format!("transactions={}", breakdown.total_transactions)),
    )?;

    Ok(Json(breakdown))
}

/// POST /api/records/insights - Structured spending insights
pub async fn records_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RecordInsightsResponse>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;

    let records = state
        .db
        .list_expense_records(user_id, Some(ADVICE_RECORD_LIMIT))?;
    let advice = state.advisor.expense_insights(&records).await?;

    state.db.log_audit(
        &user_email,
        "analyze",
        Some("expense_record"),
        None,
        Some(&format!(
            "source={}, records={}",
            advice.source,
            records.len()
        )),
    )?;

    Ok(Json(RecordInsightsResponse {
        insights: advice.value,
        source: advice.source,
    }))
}

/// POST /api/records/ask - Answer a question about the caller's records
pub async fn ask_about_records(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AskResponse>, AppError> {
    let (user_email, user_id) = caller(&state, &headers)?;
    let req: AskRequest = parse_json(&body)?;

    let records = state
        .db
        .list_expense_records(user_id, Some(ADVICE_RECORD_LIMIT))?;
    let advice = state.advisor.answer_question(&req.question, &records).await?;

    state.db.log_audit(
        &user_email,
        "ask",
        Some("expense_record"),
        None,
        Some(&format!("source={}", advice.source)),
    )?;

    Ok(Json(AskResponse {
        answer: advice.value,
        source: advice.source,
    }))
}
