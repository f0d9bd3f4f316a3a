//! Budget engines: aggregation, variance analysis and budget actions

mod aggregator;
mod recommendations;
mod variance;

pub use aggregator::{
    aggregate, summarize_budget, summarize_records, BudgetSummary, CategoryBreakdown,
    CategoryTotal, NO_DATA, UNCATEGORIZED,
};
pub use recommendations::{apply_recommendations, reset};
pub use variance::{
    analyze, category_variances, classify_debt, classify_emergency_fund, health_metrics,
    CategoryVariance, DebtLevel, EmergencyFundLevel, HealthMetrics, VarianceReport,
    VarianceStatus, DEBT_RATIO_HEALTHY, DEBT_RATIO_HIGH, EMERGENCY_MONTHS_EXCELLENT,
    EMERGENCY_MONTHS_URGENT, SEVERE_VARIANCE, SIGNIFICANT_VARIANCE,
};

use serde::{Deserialize, Serialize};

/// Everything the evaluate endpoint reports for a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEvaluation {
    #[serde(flatten)]
    pub summary: BudgetSummary,
    #[serde(flatten)]
    pub report: VarianceReport,
}

/// Aggregate and analyze in one pass
pub fn evaluate(budget: &crate::models::Budget) -> BudgetEvaluation {
    BudgetEvaluation {
        summary: summarize_budget(budget),
        report: analyze(budget),
    }
}
