//! Integration tests for nestegg-core
//!
//! These tests exercise the import → store → summarize → advise workflow
//! and the budget save → load → evaluate workflow.

use nestegg_core::{
    advisor::{AdviceSource, Advisor},
    ai::{AIClient, MockBackend},
    budget::{self, summarize_records, NO_DATA},
    config::AdvisorConfig,
    db::Database,
    growth::{simulate, ScenarioProjector},
    import::parse_csv,
    insights::{BudgetInsightEngine, MAX_BUDGET_INSIGHTS},
    models::{Budget, CategoryKind, InvestmentParameters, SavedBudget},
    prompts::PromptLibrary,
};

fn expenses_csv() -> &'static str {
    "Date,Description,Amount,Category
2024-03-01,Groceries,120.00,Food
2024-03-02,Bus pass,45.00,Transportation
2024-03-03,Dinner out,60.00,Food
2024-03-05,Electric bill,80.00,Bills
2024-03-06,Mystery charge,15.00,
"
}

fn mock_advisor(mock: MockBackend) -> Advisor {
    Advisor::new(
        Some(AIClient::Mock(mock)),
        AdvisorConfig::embedded().expect("embedded config parses"),
    )
    .with_prompts(PromptLibrary::embedded_only())
}

// =============================================================================
// Expense records
// =============================================================================

#[test]
fn test_import_and_summarize_records() {
    let db = Database::in_memory().expect("Failed to create database");
    let user = db.ensure_user("alice@example.com").unwrap();

    let records = parse_csv(expenses_csv().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(records.len(), 5);

    let summary = db.import_expense_records(user, &records).unwrap();
    assert_eq!(summary.imported, 5);

    // Re-importing the same file adds nothing
    let again = db.import_expense_records(user, &records).unwrap();
    assert_eq!(again.skipped, 5);

    let stored = db.list_expense_records(user, None).unwrap();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[0].description, "Mystery charge");

    let breakdown = summarize_records(&stored);
    assert_eq!(breakdown.total_spent, 320.0);
    assert_eq!(breakdown.top_category, "Food");
    assert_eq!(breakdown.total_transactions, 5);

    let food = &breakdown.categories_data[0];
    assert_eq!(food.count, 2);
    assert!((food.percentage - 56.25).abs() < 1e-9);
    assert!(breakdown
        .categories_data
        .iter()
        .any(|c| c.category == "Other" && c.amount == 15.0));
}

#[test]
fn test_summary_of_no_records() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("bob@example.com").unwrap();

    let breakdown = summarize_records(&db.list_expense_records(user, None).unwrap());
    assert_eq!(breakdown.top_category, NO_DATA);
    assert!(breakdown.categories_data.is_empty());
}

#[tokio::test]
async fn test_records_advice_with_and_without_backend() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice@example.com").unwrap();
    let records = parse_csv(expenses_csv().as_bytes()).unwrap();
    db.import_expense_records(user, &records).unwrap();
    let stored = db.list_expense_records(user, None).unwrap();

    let advisor = mock_advisor(MockBackend::new());
    let insights = advisor.expense_insights(&stored).await.unwrap();
    assert_eq!(insights.source, AdviceSource::Ai);
    assert!(!insights.value.is_empty());

    let answer = advisor
        .answer_question("Where does my money go?", &stored)
        .await
        .unwrap();
    assert!(answer.value.contains("food"));

    let down = mock_advisor(MockBackend::unhealthy());
    let insights = down.expense_insights(&stored).await.unwrap();
    assert_eq!(insights.source, AdviceSource::Heuristic);
    assert_eq!(insights.value[0].title, "AI Analysis Unavailable");
}

// =============================================================================
// Budgets
// =============================================================================

#[tokio::test]
async fn test_budget_save_load_evaluate() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("alice@example.com").unwrap();

    let mut budget = Budget::standard(5000.0);
    budget::apply_recommendations(&mut budget);
    assert_eq!(budget.amount_of(CategoryKind::Housing), 1400.0);

    db.upsert_budget(user, &SavedBudget::from_budget(&budget))
        .unwrap();
    let loaded = db.get_budget(user).unwrap().to_budget();
    assert_eq!(loaded.amount_of(CategoryKind::Housing), 1400.0);

    let evaluation = budget::evaluate(&loaded);
    assert_eq!(evaluation.summary.monthly_income, 5000.0);
    assert!(evaluation
        .report
        .variances
        .iter()
        .all(|v| v.variance.abs() < 1e-9));

    let advisor = Advisor::heuristic_only();
    let insights = advisor.budget_insights(&loaded).await.unwrap();
    assert_eq!(insights.source, AdviceSource::Heuristic);
    assert!(insights.value.len() <= MAX_BUDGET_INSIGHTS);
    assert_eq!(insights.value, BudgetInsightEngine::new().generate(&loaded));
}

#[tokio::test]
async fn test_empty_budget_never_divides_by_zero() {
    let db = Database::in_memory().unwrap();
    let user = db.ensure_user("new-user").unwrap();

    let budget = db.get_budget(user).unwrap().to_budget();
    let evaluation = budget::evaluate(&budget);
    assert_eq!(evaluation.report.metrics.budget_utilization, 0.0);
    assert_eq!(evaluation.summary.breakdown.top_category, NO_DATA);

    let insights = Advisor::heuristic_only()
        .budget_insights(&budget)
        .await
        .unwrap();
    assert!(!insights.value.is_empty());
    assert!(insights.value.iter().all(|i| !i.message.contains("NaN")));
}

// =============================================================================
// Investment
// =============================================================================

#[tokio::test]
async fn test_projection_and_ai_scenarios() {
    let params = InvestmentParameters {
        current_age: 30,
        retirement_age: 65,
        current_investment: 10_000.0,
        monthly_contribution: 500.0,
        annual_return_percent: 7.0,
    };
    let base = simulate(&params).unwrap();
    assert_eq!(base.total_years, 35);

    let advice = mock_advisor(MockBackend::new())
        .scenarios(&params, &base)
        .await
        .unwrap();
    assert_eq!(advice.source, AdviceSource::Ai);

    let projector = ScenarioProjector::new(&params, &base);
    for scenario in &advice.value {
        let expected = projector
            .project(&scenario.title, scenario.additional_contribution)
            .unwrap();
        assert_eq!(*scenario, expected);
    }

    let tips = mock_advisor(MockBackend::fixed("not json"))
        .saving_tips(&params, Some(&base))
        .await
        .unwrap();
    assert_eq!(tips.source, AdviceSource::Heuristic);
    assert_eq!(tips.value.len(), 6);
}
