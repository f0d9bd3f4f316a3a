//! Budget actions: apply recommended amounts, reset

use crate::models::Budget;

/// Set every category to `round(income * recommended / 100)`.
///
/// A budget with no income is left untouched.
pub fn apply_recommendations(budget: &mut Budget) {
    if budget.monthly_income <= 0.0 {
        return;
    }
    let income = budget.monthly_income;
    for cat in &mut budget.categories {
        cat.amount = (income * cat.reference_percentage() / 100.0).round();
    }
}

/// Zero every category amount, keeping income
pub fn reset(budget: &mut Budget) {
    for cat in &mut budget.categories {
        cat.amount = 0.0;
    }
}
