//! Advice with heuristic fallback
//!
//! The [`Advisor`] renders a prompt for each advice task, asks the configured
//! backend once (bounded by the task's timeout), and parses the reply with the
//! strict helpers in [`crate::ai::parsing`]. When no backend is configured,
//! the backend is unreachable, the call times out, or the reply is malformed,
//! the deterministic heuristic answer is returned instead. Every result says
//! which of the two it is.
//!
//! ```rust,ignore
//! let advisor = Advisor::from_env()?;
//! let advice = advisor.budget_insights(&budget).await?;
//! println!("{} insights from {}", advice.value.len(), advice.source);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ai::parsing::{
    parse_answer, parse_budget_insight_lines, parse_category, parse_saving_tips,
    parse_scenario_suggestions, parse_spending_insights, MAX_AI_INSIGHT_LINES,
};
use crate::ai::{AIBackend, AIClient, AdviceTask, BackendInfo};
use crate::budget::{self, UNCATEGORIZED};
use crate::config::AdvisorConfig;
use crate::error::{Error, Result};
use crate::growth::ScenarioProjector;
use crate::insights::{
    fallback_tips, BudgetInsightEngine, Insight, InsightKind, SavingTip, SpendingInsight,
};
use crate::models::{Budget, ExpenseRecord, GrowthResult, InvestmentParameters, Scenario};
use crate::prompts::{PromptId, PromptLibrary};

/// Below this many usable AI lines the heuristic insights are appended
const MIN_AI_INSIGHT_LINES: usize = 3;

/// Returned when a question cannot be answered by the collaborator
pub const ANSWER_UNAVAILABLE: &str = "I'm unable to provide a detailed answer at the moment. Please try refreshing the insights or check your connection.";

/// Where a piece of advice came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Ai,
    Heuristic,
}

impl AdviceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceSource::Ai => "ai",
            AdviceSource::Heuristic => "heuristic",
        }
    }
}

impl fmt::Display for AdviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advice plus its source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice<T> {
    pub value: T,
    pub source: AdviceSource,
}

impl<T> Advice<T> {
    pub fn ai(value: T) -> Self {
        Self {
            value,
            source: AdviceSource::Ai,
        }
    }

    pub fn heuristic(value: T) -> Self {
        Self {
            value,
            source: AdviceSource::Heuristic,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.source == AdviceSource::Ai
    }
}

/// Expense fields sent to the collaborator
#[derive(Serialize)]
struct ExpenseSummary<'a> {
    amount: f64,
    category: Option<&'a str>,
    description: &'a str,
    date: String,
}

/// Front door for every advice task
pub struct Advisor {
    client: Option<AIClient>,
    prompts: Arc<RwLock<PromptLibrary>>,
    config: AdvisorConfig,
    engine: BudgetInsightEngine,
}

impl Advisor {
    /// Create an advisor; `None` means heuristic answers only
    pub fn new(client: Option<AIClient>, config: AdvisorConfig) -> Self {
        Self {
            client,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            config,
            engine: BudgetInsightEngine::new(),
        }
    }

    /// Backend from `AI_BACKEND` and friends, config from the override file or defaults
    pub fn from_env() -> Result<Self> {
        let client = AIClient::from_env();
        match &client {
            Some(c) => tracing::info!(
                backend = c.kind(),
                model = c.model(),
                host = c.host(),
                "Advice collaborator configured"
            ),
            None => tracing::info!("No advice collaborator configured, using heuristics only"),
        }
        Ok(Self::new(client, AdvisorConfig::load()?))
    }

    /// An advisor that never calls a backend
    pub fn heuristic_only() -> Self {
        Self::new(None, AdvisorConfig::default())
    }

    /// Use a specific prompt library (e.g. embedded-only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn backend_info(&self) -> Option<BackendInfo> {
        self.client.as_ref().map(AIClient::info)
    }

    /// Whether the configured backend answers its health probe
    pub async fn health_check(&self) -> bool {
        match &self.client {
            Some(client) => client.health_check().await,
            None => false,
        }
    }

    /// Render the prompt for `task` into (system, user)
    fn render(&self, task: AdviceTask, vars: &HashMap<&str, &str>) -> Result<(String, String)> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let prompt = prompts.get(PromptId::for_task(task))?;
        Ok((prompt.system(), prompt.render_user(vars)))
    }

    /// Ask the backend once and parse the reply.
    ///
    /// `Ok(None)` means "use the fallback": no backend, a timeout, an upstream
    /// failure or a reply `parse` rejected.
    async fn consult<T>(
        &self,
        task: AdviceTask,
        vars: &HashMap<&str, &str>,
        parse: impl FnOnce(&str) -> Result<T>,
    ) -> Result<Option<T>> {
        let Some(client) = &self.client else {
            return Ok(None);
        };

        let (system, user) = self.render(task, vars)?;
        let request = self.config.request(task, system, user);
        let timeout = self.config.for_task(task).timeout;

        let reply = match tokio::time::timeout(timeout, client.complete(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) if e.is_upstream() => {
                warn!(task = %task, error = %e, "Advice collaborator failed, using fallback");
                return Ok(None);
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!(
                    task = %task,
                    timeout_ms = timeout.as_millis() as u64,
                    "Advice collaborator timed out, using fallback"
                );
                return Ok(None);
            }
        };

        debug!(task = %task, reply = %reply, "Advice collaborator reply");

        match parse(&reply) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(task = %task, error = %e, "Malformed advice reply, using fallback");
                Ok(None)
            }
        }
    }

    /// Insights about a budget.
    ///
    /// AI lines are kept when at least one passes the filter; fewer than
    /// three are topped up with heuristic insights to at most six.
    pub async fn budget_insights(&self, budget: &Budget) -> Result<Advice<Vec<Insight>>> {
        budget.validate()?;
        let heuristic = self.engine.generate(budget);

        let evaluation = budget::evaluate(budget);
        let summary = &evaluation.summary;
        let metrics = &evaluation.report.metrics;

        let category_lines = evaluation
            .report
            .variances
            .iter()
            .map(|v| {
                format!(
                    "- {}: ${:.2} ({:.1}% vs recommended {}%, variance: {:+.1}%)",
                    v.name, v.amount, v.actual_percentage, v.recommended_percentage, v.variance
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let monthly_income = format!("{:.2}", summary.monthly_income);
        let total_budgeted = format!("{:.2}", summary.total_budgeted);
        let remaining_income = format!("{:.2}", summary.remaining_income);
        let utilization = format!("{:.1}", metrics.budget_utilization);
        let emergency_months = format!("{:.1}", metrics.emergency_fund_months);
        let debt_ratio = format!("{:.1}", metrics.debt_to_income_ratio);

        let vars = HashMap::from([
            ("monthly_income", monthly_income.as_str()),
            ("total_budgeted", total_budgeted.as_str()),
            ("remaining_income", remaining_income.as_str()),
            ("category_lines", category_lines.as_str()),
            ("utilization", utilization.as_str()),
            ("emergency_months", emergency_months.as_str()),
            ("debt_ratio", debt_ratio.as_str()),
        ]);

        let lines = self
            .consult(AdviceTask::BudgetInsights, &vars, parse_budget_insight_lines)
            .await?
            .unwrap_or_default();

        if lines.is_empty() {
            return Ok(Advice::heuristic(heuristic));
        }

        let mut insights: Vec<Insight> = lines
            .into_iter()
            .map(|line| Insight::new(kind_for_line(&line), line))
            .collect();
        if insights.len() < MIN_AI_INSIGHT_LINES {
            let room = MAX_AI_INSIGHT_LINES - insights.len();
            insights.extend(heuristic.into_iter().take(room));
        }
        Ok(Advice::ai(insights))
    }

    /// Money-saving tips for a retirement plan (at most six)
    pub async fn saving_tips(
        &self,
        params: &InvestmentParameters,
        projection: Option<&GrowthResult>,
    ) -> Result<Advice<Vec<SavingTip>>> {
        params.validate()?;

        let current_age = params.current_age.to_string();
        let retirement_age = params.retirement_age.to_string();
        let current_investment = format!("{:.2}", params.current_investment);
        let monthly_contribution = format!("{:.2}", params.monthly_contribution);
        let annual_return = params.annual_return_percent.to_string();
        let years = params.horizon_years().to_string();
        let final_amount = projection.map(|p| format!("{:.2}", p.final_amount));

        let mut vars = HashMap::from([
            ("current_age", current_age.as_str()),
            ("retirement_age", retirement_age.as_str()),
            ("current_investment", current_investment.as_str()),
            ("monthly_contribution", monthly_contribution.as_str()),
            ("annual_return", annual_return.as_str()),
            ("years_to_retirement", years.as_str()),
        ]);
        if let Some(final_amount) = &final_amount {
            vars.insert("final_amount", final_amount.as_str());
        }

        Ok(
            match self
                .consult(AdviceTask::SavingTips, &vars, parse_saving_tips)
                .await?
            {
                Some(tips) => Advice::ai(tips),
                None => Advice::heuristic(fallback_tips()),
            },
        )
    }

    /// What-if scenarios against `base`.
    ///
    /// The model only proposes titles and monthly amounts; every projection is
    /// computed here. Presets are used when no suggestion is usable.
    pub async fn scenarios(
        &self,
        params: &InvestmentParameters,
        base: &GrowthResult,
    ) -> Result<Advice<Vec<Scenario>>> {
        params.validate()?;
        let projector = ScenarioProjector::new(params, base);

        let current_age = params.current_age.to_string();
        let retirement_age = params.retirement_age.to_string();
        let current_investment = format!("{:.2}", params.current_investment);
        let monthly_contribution = format!("{:.2}", params.monthly_contribution);
        let annual_return = params.annual_return_percent.to_string();
        let years = params.horizon_years().to_string();
        let final_amount = format!("{:.2}", base.final_amount);
        let total_years = base.total_years.to_string();

        let vars = HashMap::from([
            ("current_age", current_age.as_str()),
            ("retirement_age", retirement_age.as_str()),
            ("current_investment", current_investment.as_str()),
            ("monthly_contribution", monthly_contribution.as_str()),
            ("annual_return", annual_return.as_str()),
            ("years_to_retirement", years.as_str()),
            ("final_amount", final_amount.as_str()),
            ("total_years", total_years.as_str()),
        ]);

        let suggestions = self
            .consult(
                AdviceTask::InvestmentScenarios,
                &vars,
                parse_scenario_suggestions,
            )
            .await?;

        match suggestions {
            Some(suggestions) => {
                let scenarios = suggestions
                    .iter()
                    .map(|s| projector.project(&s.title, s.additional_contribution))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Advice::ai(scenarios))
            }
            None => Ok(Advice::heuristic(projector.presets()?)),
        }
    }

    /// One of the fixed expense categories for a description
    pub async fn categorize_expense(&self, description: &str) -> Result<Advice<String>> {
        let description = description.trim();
        if description.is_empty() {
            return Ok(Advice::heuristic(UNCATEGORIZED.to_string()));
        }

        let vars = HashMap::from([("description", description)]);
        Ok(
            match self
                .consult(AdviceTask::CategorizeExpense, &vars, |reply| {
                    Ok(parse_category(reply))
                })
                .await?
            {
                Some(category) => Advice::ai(category),
                None => Advice::heuristic(UNCATEGORIZED.to_string()),
            },
        )
    }

    /// Structured observations about recorded spending
    pub async fn expense_insights(
        &self,
        records: &[ExpenseRecord],
    ) -> Result<Advice<Vec<SpendingInsight>>> {
        if records.is_empty() {
            return Ok(Advice::heuristic(vec![SpendingInsight::unavailable()]));
        }

        let expenses = expenses_json(records)?;
        let vars = HashMap::from([("expenses", expenses.as_str())]);

        Ok(
            match self
                .consult(AdviceTask::ExpenseInsights, &vars, parse_spending_insights)
                .await?
            {
                Some(insights) => Advice::ai(insights),
                None => Advice::heuristic(vec![SpendingInsight::unavailable()]),
            },
        )
    }

    /// A short answer to a question about recorded spending
    pub async fn answer_question(
        &self,
        question: &str,
        records: &[ExpenseRecord],
    ) -> Result<Advice<String>> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidParameters("Question cannot be empty".into()));
        }

        let expenses = expenses_json(records)?;
        let vars = HashMap::from([("question", question), ("expenses", expenses.as_str())]);

        Ok(
            match self
                .consult(AdviceTask::AnswerQuestion, &vars, parse_answer)
                .await?
            {
                Some(answer) => Advice::ai(answer),
                None => Advice::heuristic(ANSWER_UNAVAILABLE.to_string()),
            },
        )
    }
}

/// Insight kind implied by the marker a line carries
fn kind_for_line(line: &str) -> InsightKind {
    if line.contains('⚠') || line.contains('🚨') || line.contains('📉') {
        InsightKind::Warning
    } else if line.contains('✅') || line.contains('🏆') || line.contains('🎉') {
        InsightKind::Success
    } else if line.contains('💡') || line.contains('💰') || line.contains('🎯') {
        InsightKind::Tip
    } else {
        InsightKind::Info
    }
}

fn expenses_json(records: &[ExpenseRecord]) -> Result<String> {
    let summary: Vec<ExpenseSummary<'_>> = records
        .iter()
        .map(|r| ExpenseSummary {
            amount: r.amount,
            category: r.category.as_deref(),
            description: &r.description,
            date: r.date.to_string(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&summary)?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::ai::MockBackend;
    use crate::growth::simulate;
    use crate::insights::MAX_SAVING_TIPS;
    use crate::models::CategoryKind;

    fn advisor_with(mock: MockBackend) -> Advisor {
        Advisor::new(
            Some(AIClient::Mock(mock)),
            AdvisorConfig::embedded().unwrap(),
        )
        .with_prompts(PromptLibrary::embedded_only())
    }

    fn budget() -> Budget {
        let mut budget = Budget::standard(5000.0);
        budget.set_amount(CategoryKind::Housing, 2000.0);
        budget.set_amount(CategoryKind::Food, 800.0);
        budget.set_amount(CategoryKind::Savings, 300.0);
        budget
    }

    fn params() -> InvestmentParameters {
        InvestmentParameters {
            current_age: 30,
            retirement_age: 65,
            current_investment: 10_000.0,
            monthly_contribution: 500.0,
            annual_return_percent: 7.0,
        }
    }

    fn records() -> Vec<ExpenseRecord> {
        vec![ExpenseRecord {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Groceries".into(),
            amount: 82.5,
            category: Some("Food".into()),
            created_at: Utc::now(),
        }]
    }

    #[tokio::test]
    async fn test_heuristic_only_never_calls_out() {
        let advisor = Advisor::heuristic_only();
        assert!(!advisor.is_ai_enabled());
        assert!(!advisor.health_check().await);

        let insights = advisor.budget_insights(&budget()).await.unwrap();
        assert_eq!(insights.source, AdviceSource::Heuristic);
        assert_eq!(insights.value, BudgetInsightEngine::new().generate(&budget()));

        let tips = advisor.saving_tips(&params(), None).await.unwrap();
        assert_eq!(tips.value, fallback_tips());
    }

    #[tokio::test]
    async fn test_budget_insights_ai_lines_topped_up() {
        let mock = MockBackend::new();
        let advisor = advisor_with(mock.clone());

        let advice = advisor.budget_insights(&budget()).await.unwrap();
        assert!(advice.is_ai());
        // Canned reply has three usable lines: nothing to top up
        assert_eq!(advice.value.len(), 3);
        assert_eq!(advice.value[0].kind, InsightKind::Tip);
        assert_eq!(mock.calls(), 1);

        let single = advisor_with(MockBackend::fixed(
            "⚠️ Housing takes 40% of your income, well above the 25% guideline.",
        ));
        let advice = single.budget_insights(&budget()).await.unwrap();
        assert!(advice.is_ai());
        assert_eq!(advice.value[0].kind, InsightKind::Warning);
        assert!(advice.value.len() > 1 && advice.value.len() <= MAX_AI_INSIGHT_LINES);
    }

    #[tokio::test]
    async fn test_budget_insights_without_markers_fall_back() {
        let advisor = advisor_with(MockBackend::fixed("Your budget looks fine overall, keep it up."));
        let advice = advisor.budget_insights(&budget()).await.unwrap();
        assert_eq!(advice.source, AdviceSource::Heuristic);
    }

    #[tokio::test]
    async fn test_budget_insights_rejects_invalid_budget() {
        let mut bad = budget();
        bad.monthly_income = -1.0;
        let advisor = advisor_with(MockBackend::new());
        assert!(matches!(
            advisor.budget_insights(&bad).await,
            Err(Error::InvalidParameters(_))
        ));
    }

    #[tokio::test]
    async fn test_saving_tips_from_ai() {
        let advisor = advisor_with(MockBackend::new());
        let base = simulate(&params()).unwrap();
        let advice = advisor.saving_tips(&params(), Some(&base)).await.unwrap();

        assert!(advice.is_ai());
        assert_eq!(advice.value[0].title, "Brew Coffee at Home");
        assert_eq!(advice.value[1].potential_savings, "$100+ annually");
        assert!(advice.value.len() <= MAX_SAVING_TIPS);
    }

    #[tokio::test]
    async fn test_saving_tips_fallback_on_failure_and_garbage() {
        for mock in [MockBackend::unhealthy(), MockBackend::fixed("no json here")] {
            let advice = advisor_with(mock).saving_tips(&params(), None).await.unwrap();
            assert_eq!(advice.source, AdviceSource::Heuristic);
            assert_eq!(advice.value.len(), 6);
        }
    }

    #[tokio::test]
    async fn test_saving_tips_invalid_params() {
        let mut p = params();
        p.annual_return_percent = 25.0;
        let result = advisor_with(MockBackend::new()).saving_tips(&p, None).await;
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_scenarios_recomputed_from_contribution() {
        let base = simulate(&params()).unwrap();
        let advice = advisor_with(MockBackend::new())
            .scenarios(&params(), &base)
            .await
            .unwrap();

        assert!(advice.is_ai());
        let p = params();
        let projector = ScenarioProjector::new(&p, &base);
        let expected = projector.project("Packed lunch three days a week", 90.0).unwrap();
        assert_eq!(advice.value[0], expected);
        assert!(advice.value[0].final_amount > base.final_amount);
    }

    #[tokio::test]
    async fn test_scenarios_fallback_to_presets() {
        let base = simulate(&params()).unwrap();
        let advice = advisor_with(MockBackend::unhealthy())
            .scenarios(&params(), &base)
            .await
            .unwrap();

        assert_eq!(advice.source, AdviceSource::Heuristic);
        let presets = ScenarioProjector::new(&params(), &base).presets().unwrap();
        assert_eq!(advice.value, presets);
    }

    #[tokio::test]
    async fn test_categorize_expense() {
        let advisor = advisor_with(MockBackend::new());
        let advice = advisor.categorize_expense("Uber to airport").await.unwrap();
        assert_eq!(advice.value, "Transportation");
        assert!(advice.is_ai());

        let blank = advisor.categorize_expense("   ").await.unwrap();
        assert_eq!(blank.value, "Other");
        assert_eq!(blank.source, AdviceSource::Heuristic);

        let odd = advisor_with(MockBackend::fixed("Groceries"));
        assert_eq!(odd.categorize_expense("milk").await.unwrap().value, "Other");

        let down = advisor_with(MockBackend::unhealthy());
        let advice = down.categorize_expense("milk").await.unwrap();
        assert_eq!(advice.value, "Other");
        assert_eq!(advice.source, AdviceSource::Heuristic);
    }

    #[tokio::test]
    async fn test_expense_insights() {
        let advice = advisor_with(MockBackend::new())
            .expense_insights(&records())
            .await
            .unwrap();
        assert!(advice.is_ai());
        assert_eq!(advice.value[0].id, "ai-1");
        assert_eq!(advice.value[1].title, "AI Insight");

        let fallback = advisor_with(MockBackend::fixed("{}"))
            .expense_insights(&records())
            .await
            .unwrap();
        assert_eq!(fallback.value, vec![SpendingInsight::unavailable()]);
    }

    #[tokio::test]
    async fn test_expense_insights_without_records_skip_backend() {
        let mock = MockBackend::new();
        let advice = advisor_with(mock.clone()).expense_insights(&[]).await.unwrap();
        assert_eq!(advice.source, AdviceSource::Heuristic);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_question() {
        let advice = advisor_with(MockBackend::fixed("  Eat out less.  "))
            .answer_question("How can I save?", &records())
            .await
            .unwrap();
        assert_eq!(advice.value, "Eat out less.");

        let fallback = advisor_with(MockBackend::unhealthy())
            .answer_question("How can I save?", &records())
            .await
            .unwrap();
        assert_eq!(fallback.value, ANSWER_UNAVAILABLE);

        let empty = advisor_with(MockBackend::new())
            .answer_question(" ", &records())
            .await;
        assert!(matches!(empty, Err(Error::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let mock = MockBackend::new().with_delay(Duration::from_millis(500));
        let advisor = Advisor::new(
            Some(AIClient::Mock(mock)),
            AdvisorConfig::embedded()
                .unwrap()
                .with_timeout(Duration::from_millis(20)),
        )
        .with_prompts(PromptLibrary::embedded_only());

        let advice = advisor.answer_question("Anything?", &records()).await.unwrap();
        assert_eq!(advice.source, AdviceSource::Heuristic);
        assert_eq!(advice.value, ANSWER_UNAVAILABLE);
    }

    #[test]
    fn test_kind_for_line() {
        assert_eq!(kind_for_line("🚨 Overspending"), InsightKind::Warning);
        assert_eq!(kind_for_line("✅ Debt is low"), InsightKind::Success);
        assert_eq!(kind_for_line("💡 Try this"), InsightKind::Tip);
        assert_eq!(kind_for_line("📊 Numbers"), InsightKind::Info);
    }

    #[test]
    fn test_advice_source_serializes_lowercase() {
        let advice = Advice::ai(1);
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["source"], "ai");
        assert_eq!(AdviceSource::Heuristic.to_string(), "heuristic");
    }
}
