//! Heuristic insight engine - runs the budget rules in a fixed order

use crate::budget::{analyze, summarize_budget, BudgetSummary, VarianceReport};
use crate::models::Budget;

use super::rules::{BalanceRule, DebtRule, EmergencyFundRule, OpportunityRule, VarianceRule};
use super::types::Insight;

/// Most insights returned for one budget
pub const MAX_BUDGET_INSIGHTS: usize = 5;

/// Everything a rule may look at
pub struct BudgetContext<'a> {
    pub budget: &'a Budget,
    pub summary: &'a BudgetSummary,
    pub report: &'a VarianceReport,
}

/// A deterministic budget rule
pub trait InsightRule: Send + Sync {
    /// Short identifier for logging
    fn name(&self) -> &'static str;

    /// Insights for this budget, in the order they should be shown
    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight>;
}

/// Runs registered rules in registration order and caps the result
pub struct BudgetInsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
    limit: usize,
}

impl Default for BudgetInsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetInsightEngine {
    /// Engine with the built-in rules: balance, variance, emergency fund,
    /// debt, opportunity
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register(Box::new(BalanceRule));
        engine.register(Box::new(VarianceRule));
        engine.register(Box::new(EmergencyFundRule));
        engine.register(Box::new(DebtRule));
        engine.register(Box::new(OpportunityRule));

        engine
    }

    /// Engine with no rules
    pub fn empty() -> Self {
        Self {
            rules: vec![],
            limit: MAX_BUDGET_INSIGHTS,
        }
    }

    /// Register a rule; it runs after every rule already registered
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Change the cap
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every rule and keep the first `limit` insights
    pub fn generate(&self, budget: &Budget) -> Vec<Insight> {
        let summary = summarize_budget(budget);
        let report = analyze(budget);
        let ctx = BudgetContext {
            budget,
            summary: &summary,
            report: &report,
        };

        let mut insights = Vec::new();
        for rule in &self.rules {
            if insights.len() >= self.limit {
                break;
            }
            let produced = rule.evaluate(&ctx);
            tracing::debug!(rule = rule.name(), count = produced.len(), "Rule evaluated");
            insights.extend(produced);
        }

        insights.truncate(self.limit);
        insights
    }

    /// Names of registered rules, in run order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::InsightKind;
    use crate::models::CategoryKind;

    #[test]
    fn test_engine_rule_order() {
        let engine = BudgetInsightEngine::new();
        assert_eq!(
            engine.rule_names(),
            vec!["balance", "variance", "emergency_fund", "debt", "opportunity"]
        );
    }

    #[test]
    fn test_balance_comes_first() {
        let mut b = Budget::standard(4000.0);
        b.set_amount(CategoryKind::Housing, 1000.0);
        let insights = BudgetInsightEngine::new().generate(&b);

        assert!(insights[0].message.starts_with("💡 You have $3000.00"));
    }

    #[test]
    fn test_cap_holds() {
        // Every category wildly off target
        let mut b = Budget::standard(1000.0);
        for kind in CategoryKind::all() {
            b.set_amount(*kind, 300.0);
        }
        let insights = BudgetInsightEngine::new().generate(&b);

        assert_eq!(insights.len(), MAX_BUDGET_INSIGHTS);
        assert_eq!(insights[0].kind, InsightKind::Warning);
        assert!(insights[0].message.starts_with("⚠️"));
        assert!(insights[1..].iter().all(|i| i.message.starts_with("📈")));
    }

    #[test]
    fn test_zero_income_is_safe() {
        let mut b = Budget::standard(0.0);
        b.set_amount(CategoryKind::Debt, 100.0);
        let insights = BudgetInsightEngine::new().generate(&b);

        assert!(!insights.is_empty());
        assert!(insights.iter().all(|i| !i.message.contains("NaN")));
        assert!(insights.iter().all(|i| !i.message.contains("of income")));
        assert!(insights
            .iter()
            .any(|i| i.message.starts_with("⚠️ Your budget exceeds your income by $100.00.")));
    }

    #[test]
    fn test_exactly_balanced_budget() {
        let mut b = Budget::standard(1000.0);
        b.set_amount(CategoryKind::Housing, 280.0);
        b.set_amount(CategoryKind::Savings, 200.0);
        b.set_amount(CategoryKind::Retirement, 150.0);
        b.set_amount(CategoryKind::Food, 120.0);
        b.set_amount(CategoryKind::Transportation, 60.0);
        b.set_amount(CategoryKind::Utilities, 60.0);
        b.set_amount(CategoryKind::Insurance, 50.0);
        b.set_amount(CategoryKind::PersonalEntertainment, 40.0);
        b.set_amount(CategoryKind::HouseholdItems, 20.0);
        b.set_amount(CategoryKind::Other, 20.0);
        let insights = BudgetInsightEngine::new().generate(&b);

        let balanced: Vec<_> = insights
            .iter()
            .filter(|i| i.message.starts_with("✅ Perfect budget allocation!"))
            .collect();
        assert_eq!(balanced.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Success);
    }

    #[test]
    fn test_custom_limit() {
        let b = Budget::standard(1000.0);
        let insights = BudgetInsightEngine::new().with_limit(1).generate(&b);
        assert_eq!(insights.len(), 1);
    }

    #[test]
    fn test_repeatable() {
        let mut b = Budget::standard(2500.0);
        b.set_amount(CategoryKind::Food, 900.0);
        b.set_amount(CategoryKind::Savings, 100.0);
        let engine = BudgetInsightEngine::new();
        assert_eq!(engine.generate(&b), engine.generate(&b));
    }
}
