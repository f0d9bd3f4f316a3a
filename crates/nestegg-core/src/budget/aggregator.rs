//! Category rollups
//!
//! Turns a list of categorized amounts (budget lines or expense records) into
//! a ranked breakdown. Amounts are taken by magnitude so refunds and
//! negative-signed expenses count the same as positive ones.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Budget, ExpenseRecord};
use crate::ratio::safe_percent;

/// Reported as the top category when nothing was spent
pub const NO_DATA: &str = "No data";

/// Category used for records without one
pub const UNCATEGORIZED: &str = "Other";

/// One category's share of the total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    /// Percent of total spent (not of income)
    pub percentage: f64,
    pub count: usize,
}

/// Ranked category breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub total_spent: f64,
    /// Descending by amount; ties keep first-seen order
    pub categories_data: Vec<CategoryTotal>,
    pub top_category: String,
    pub total_transactions: usize,
}

/// Budget totals plus the ranked breakdown of its categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub monthly_income: f64,
    pub total_budgeted: f64,
    pub remaining_income: f64,
    pub breakdown: CategoryBreakdown,
}

/// Roll up `(category, amount)` pairs.
///
/// Zero-magnitude entries count towards `total_transactions` but never appear
/// in the breakdown, so an all-zero input reports [`NO_DATA`].
pub fn aggregate<'a, I>(entries: I) -> CategoryBreakdown
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut order: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut total_spent = 0.0;
    let mut total_transactions = 0;

    for (category, amount) in entries {
        total_transactions += 1;
        let magnitude = amount.abs();
        if magnitude == 0.0 || !magnitude.is_finite() {
            continue;
        }
        total_spent += magnitude;

        match index.get(category) {
            Some(&i) => {
                order[i].amount += magnitude;
                order[i].count += 1;
            }
            None => {
                index.insert(category, order.len());
                order.push(CategoryTotal {
                    category: category.to_string(),
                    amount: magnitude,
                    percentage: 0.0,
                    count: 1,
                });
            }
        }
    }

    for entry in &mut order {
        entry.percentage = safe_percent(entry.amount, total_spent);
    }

    // sort_by is stable, so equal amounts stay in first-seen order
    order.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let top_category = order
        .first()
        .map(|c| c.category.clone())
        .unwrap_or_else(|| NO_DATA.to_string());

    CategoryBreakdown {
        total_spent,
        categories_data: order,
        top_category,
        total_transactions,
    }
}

/// Totals and breakdown for a budget
pub fn summarize_budget(budget: &Budget) -> BudgetSummary {
    let breakdown = aggregate(
        budget
            .categories
            .iter()
            .map(|c| (c.name.as_str(), c.amount)),
    );

    BudgetSummary {
        monthly_income: budget.monthly_income,
        total_budgeted: budget.total_budgeted(),
        remaining_income: budget.remaining_income(),
        breakdown,
    }
}

/// Breakdown of stored expense records; missing categories count as "Other"
pub fn summarize_records(records: &[ExpenseRecord]) -> CategoryBreakdown {
    aggregate(records.iter().map(|r| {
        (
            r.category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED),
            r.amount,
        )
    }))
}
