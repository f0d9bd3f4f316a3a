//! Built-in budget insight rules
//!
//! Each rule looks at one aspect of a budget and emits zero or more
//! sentences. Amounts are printed with two decimals, percentages with one.

use crate::budget::{DebtLevel, EmergencyFundLevel, VarianceStatus, SEVERE_VARIANCE};
use crate::models::CategoryKind;

use super::engine::{BudgetContext, InsightRule};
use super::types::{Insight, InsightKind};

/// Surplus, deficit or perfectly balanced. Always exactly one.
pub struct BalanceRule;

impl InsightRule for BalanceRule {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight> {
        let remaining = ctx.summary.remaining_income;

        let insight = if remaining > 0.0 {
            Insight::new(
                InsightKind::Tip,
                format!(
                    "💡 You have ${:.2} remaining to allocate. Consider increasing your emergency fund or retirement contributions for better long-term financial security.",
                    remaining
                ),
            )
        } else if remaining < 0.0 {
            Insight::new(
                InsightKind::Warning,
                format!(
                    "⚠️ Your budget exceeds your income by ${:.2}. This creates a deficit that could lead to debt accumulation - review your categories to reduce expenses.",
                    remaining.abs()
                ),
            )
        } else {
            Insight::new(
                InsightKind::Success,
                "✅ Perfect budget allocation! Your income and expenses are perfectly balanced, giving you a solid foundation for financial success.",
            )
        };

        vec![insight]
    }
}

/// One insight per funded category that is far from its recommendation.
/// Silent without income, where every share reads as zero.
pub struct VarianceRule;

impl InsightRule for VarianceRule {
    fn name(&self) -> &'static str {
        "variance"
    }

    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight> {
        if ctx.summary.monthly_income <= 0.0 {
            return vec![];
        }
        ctx.report
            .significant()
            .filter_map(|v| match v.status {
                VarianceStatus::Over => {
                    let severity = if v.variance > SEVERE_VARIANCE {
                        "significant"
                    } else {
                        "moderate"
                    };
                    Some(Insight::new(
                        InsightKind::Warning,
                        format!(
                            "📈 {} {}: You're allocating {:.1}% vs recommended {}%. This {} overspending could impact your savings goals.",
                            v.icon, v.name, v.actual_percentage, v.recommended_percentage, severity
                        ),
                    ))
                }
                VarianceStatus::Under => Some(Insight::new(
                    InsightKind::Info,
                    format!(
                        "📉 {} {}: You're under the recommended {}% allocation by {:.1}%. Consider if this aligns with your financial priorities.",
                        v.icon,
                        v.name,
                        v.recommended_percentage,
                        v.variance.abs()
                    ),
                )),
                VarianceStatus::OnTarget => None,
            })
            .collect()
    }
}

/// Emergency fund coverage, only when something is saved
pub struct EmergencyFundRule;

impl InsightRule for EmergencyFundRule {
    fn name(&self) -> &'static str {
        "emergency_fund"
    }

    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight> {
        let metrics = &ctx.report.metrics;
        let savings = ctx.budget.amount_of(CategoryKind::Savings);
        let monthly_expenses = ctx.summary.total_budgeted - savings;

        match metrics.emergency_fund_level {
            EmergencyFundLevel::Urgent => vec![Insight::new(
                InsightKind::Warning,
                format!(
                    "🚨 Your emergency fund covers {:.1} months of expenses. Aim for 3-6 months (${:.2} - ${:.2}) for financial security.",
                    metrics.emergency_fund_months,
                    monthly_expenses * 3.0,
                    monthly_expenses * 6.0
                ),
            )],
            EmergencyFundLevel::Excellent => vec![Insight::new(
                InsightKind::Success,
                format!(
                    "🏆 Excellent emergency fund! You have {:.1} months covered, which exceeds the recommended 3-6 months. Consider redirecting some savings to investments.",
                    metrics.emergency_fund_months
                ),
            )],
            EmergencyFundLevel::Adequate | EmergencyFundLevel::None => vec![],
        }
    }
}

/// Debt-to-income, only when debt and income are both budgeted
pub struct DebtRule;

impl InsightRule for DebtRule {
    fn name(&self) -> &'static str {
        "debt"
    }

    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight> {
        if ctx.summary.monthly_income <= 0.0 {
            return vec![];
        }
        let ratio = ctx.report.metrics.debt_to_income_ratio;

        match ctx.report.metrics.debt_level {
            DebtLevel::High => vec![Insight::new(
                InsightKind::Warning,
                format!(
                    "💳 Your debt payments are {:.1}% of income, above the recommended 20% threshold. Consider debt consolidation or payment strategies to improve your financial health.",
                    ratio
                ),
            )],
            DebtLevel::Healthy => vec![Insight::new(
                InsightKind::Success,
                format!(
                    "✅ Great debt management! Your debt payments are only {:.1}% of income, well below the recommended 20% threshold.",
                    ratio
                ),
            )],
            DebtLevel::Moderate | DebtLevel::None => vec![],
        }
    }
}

/// Large unallocated remainder (more than a tenth of income)
pub struct OpportunityRule;

impl InsightRule for OpportunityRule {
    fn name(&self) -> &'static str {
        "opportunity"
    }

    fn evaluate(&self, ctx: &BudgetContext<'_>) -> Vec<Insight> {
        let remaining = ctx.summary.remaining_income;
        if remaining > ctx.summary.monthly_income * 0.1 {
            vec![Insight::new(
                InsightKind::Tip,
                format!(
                    "💰 With ${:.2} remaining, you have an excellent opportunity to boost your retirement contributions or start investing for long-term wealth building.",
                    remaining
                ),
            )]
        } else {
            vec![]
        }
    }
}
