//! Actual vs recommended allocation
//!
//! Percentages here are percent of monthly income, unlike the aggregator's
//! percent-of-total. Every division goes through [`safe_ratio`] so a budget
//! with zero income evaluates to all zeros.

use serde::{Deserialize, Serialize};

use crate::models::{Budget, CategoryKind};
use crate::ratio::{safe_percent, safe_ratio};

/// Variance beyond this many percentage points is worth mentioning
pub const SIGNIFICANT_VARIANCE: f64 = 5.0;

/// Over-allocation beyond this is called "significant" rather than "moderate"
pub const SEVERE_VARIANCE: f64 = 10.0;

pub const DEBT_RATIO_HIGH: f64 = 20.0;
pub const DEBT_RATIO_HEALTHY: f64 = 10.0;
pub const EMERGENCY_MONTHS_URGENT: f64 = 3.0;
pub const EMERGENCY_MONTHS_EXCELLENT: f64 = 6.0;

/// Where a category sits relative to its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    OnTarget,
    Over,
    Under,
}

impl VarianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTarget => "on_target",
            Self::Over => "over",
            Self::Under => "under",
        }
    }
}

/// One category measured against its recommended share of income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVariance {
    pub name: String,
    pub icon: String,
    pub amount: f64,
    pub actual_percentage: f64,
    pub recommended_percentage: f64,
    /// actual - recommended
    pub variance: f64,
    pub status: VarianceStatus,
}

impl CategoryVariance {
    pub fn is_significant(&self) -> bool {
        self.variance.abs() > SIGNIFICANT_VARIANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtLevel {
    None,
    Healthy,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyFundLevel {
    None,
    Urgent,
    Adequate,
    Excellent,
}

/// Budget-wide health ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// total_budgeted / income * 100
    pub budget_utilization: f64,
    /// savings / (total_budgeted - savings)
    pub emergency_fund_months: f64,
    /// debt / income * 100
    pub debt_to_income_ratio: f64,
    pub debt_level: DebtLevel,
    pub emergency_fund_level: EmergencyFundLevel,
}

/// Full evaluation of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceReport {
    /// In budget category order
    pub variances: Vec<CategoryVariance>,
    pub metrics: HealthMetrics,
}

impl VarianceReport {
    /// Categories with money allocated and a variance worth mentioning
    pub fn significant(&self) -> impl Iterator<Item = &CategoryVariance> {
        self.variances
            .iter()
            .filter(|v| v.amount > 0.0 && v.is_significant())
    }
}

/// Variance for every category of `budget`, in order.
///
/// Standard categories are measured against the catalog recommendation
/// whatever the budget carries.
pub fn category_variances(budget: &Budget) -> Vec<CategoryVariance> {
    budget
        .categories
        .iter()
        .map(|cat| {
            let actual = safe_percent(cat.amount, budget.monthly_income);
            let recommended = cat.reference_percentage();
            let variance = actual - recommended;
            let status = if variance.abs() <= SIGNIFICANT_VARIANCE {
                VarianceStatus::OnTarget
            } else if variance > 0.0 {
                VarianceStatus::Over
            } else {
                VarianceStatus::Under
            };

            CategoryVariance {
                name: cat.name.clone(),
                icon: cat.icon.clone(),
                amount: cat.amount,
                actual_percentage: actual,
                recommended_percentage: recommended,
                variance,
                status,
            }
        })
        .collect()
}

pub fn classify_debt(debt: f64, ratio: f64) -> DebtLevel {
    if debt <= 0.0 {
        DebtLevel::None
    } else if ratio > DEBT_RATIO_HIGH {
        DebtLevel::High
    } else if ratio <= DEBT_RATIO_HEALTHY {
        DebtLevel::Healthy
    } else {
        DebtLevel::Moderate
    }
}

pub fn classify_emergency_fund(savings: f64, months: f64) -> EmergencyFundLevel {
    if savings <= 0.0 {
        EmergencyFundLevel::None
    } else if months < EMERGENCY_MONTHS_URGENT {
        EmergencyFundLevel::Urgent
    } else if months >= EMERGENCY_MONTHS_EXCELLENT {
        EmergencyFundLevel::Excellent
    } else {
        EmergencyFundLevel::Adequate
    }
}

pub fn health_metrics(budget: &Budget) -> HealthMetrics {
    let total = budget.total_budgeted();
    let savings = budget.amount_of(CategoryKind::Savings);
    let debt = budget.amount_of(CategoryKind::Debt);

    let non_savings = total - savings;
    let emergency_fund_months = if non_savings > 0.0 {
        safe_ratio(savings, non_savings)
    } else {
        0.0
    };
    let debt_to_income_ratio = safe_percent(debt, budget.monthly_income);

    HealthMetrics {
        budget_utilization: safe_percent(total, budget.monthly_income),
        emergency_fund_months,
        debt_to_income_ratio,
        debt_level: classify_debt(debt, debt_to_income_ratio),
        emergency_fund_level: classify_emergency_fund(savings, emergency_fund_months),
    }
}

/// Variances plus health metrics
pub fn analyze(budget: &Budget) -> VarianceReport {
    VarianceReport {
        variances: category_variances(budget),
        metrics: health_metrics(budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetCategory;

    fn budget(income: f64, amounts: &[(CategoryKind, f64)]) -> Budget {
        let mut b = Budget::standard(income);
        for (kind, amount) in amounts {
            b.set_amount(*kind, *amount);
        }
        b
    }

    #[test]
    fn test_zero_income_is_all_zero() {
        let b = budget(
            0.0,
            &[(CategoryKind::Housing, 1000.0), (CategoryKind::Debt, 200.0)],
        );
        let report = analyze(&b);

        assert!(report.variances.iter().all(|v| v.actual_percentage == 0.0));
        assert_eq!(report.metrics.budget_utilization, 0.0);
        assert_eq!(report.metrics.debt_to_income_ratio, 0.0);
        assert!(report.metrics.budget_utilization.is_finite());
    }

    #[test]
    fn test_variance_against_recommendation() {
        let b = budget(5000.0, &[(CategoryKind::Housing, 2000.0)]);
        let variances = category_variances(&b);

        let housing = &variances[0];
        assert_eq!(housing.name, "Housing");
        assert_eq!(housing.actual_percentage, 40.0);
        assert_eq!(housing.variance, 12.0);
        assert_eq!(housing.status, VarianceStatus::Over);
        assert!(housing.is_significant());

        let savings = &variances[1];
        assert_eq!(savings.variance, -20.0);
        assert_eq!(savings.status, VarianceStatus::Under);
    }

    #[test]
    fn test_on_target_within_five_points() {
        let b = budget(1000.0, &[(CategoryKind::Food, 150.0)]);
        let food = category_variances(&b)
            .into_iter()
            .find(|v| v.name == "Food")
            .unwrap();

        assert_eq!(food.status, VarianceStatus::OnTarget);
        assert!(!food.is_significant());
    }

    #[test]
    fn test_significant_skips_empty_categories() {
        let b = budget(4000.0, &[(CategoryKind::Housing, 2000.0)]);
        let report = analyze(&b);
        let names: Vec<_> = report.significant().map(|v| v.name.as_str()).collect();

        assert_eq!(names, vec!["Housing"]);
    }

    #[test]
    fn test_catalog_recommendation_wins() {
        let mut b = budget(1000.0, &[(CategoryKind::Housing, 900.0)]);
        b.categories[0].recommended_percentage = 90.0;
        b.categories.push(BudgetCategory {
            name: "Pets".into(),
            amount: 100.0,
            recommended_percentage: 10.0,
            icon: String::new(),
            description: String::new(),
        });

        let variances = category_variances(&b);
        let housing = &variances[0];
        assert_eq!(housing.recommended_percentage, 28.0);
        assert_eq!(housing.variance, 62.0);
        assert_eq!(housing.status, VarianceStatus::Over);

        let pets = variances.last().unwrap();
        assert_eq!(pets.recommended_percentage, 10.0);
        assert_eq!(pets.status, VarianceStatus::OnTarget);
    }

    #[test]
    fn test_analyze_repeatable() {
        let b = budget(
            5200.0,
            &[
                (CategoryKind::Housing, 1900.0),
                (CategoryKind::Savings, 400.0),
                (CategoryKind::Debt, 650.0),
            ],
        );
        assert_eq!(analyze(&b), analyze(&b));
    }

    #[test]
    fn test_emergency_fund_months() {
        let b = budget(
            6000.0,
            &[(CategoryKind::Savings, 3000.0), (CategoryKind::Housing, 1000.0)],
        );
        let m = health_metrics(&b);
        assert_eq!(m.emergency_fund_months, 3.0);
        assert_eq!(m.emergency_fund_level, EmergencyFundLevel::Adequate);

        // Savings only: no other expenses to cover
        let b = budget(6000.0, &[(CategoryKind::Savings, 3000.0)]);
        let m = health_metrics(&b);
        assert_eq!(m.emergency_fund_months, 0.0);
        assert_eq!(m.emergency_fund_level, EmergencyFundLevel::Urgent);
    }

    #[test]
    fn test_debt_classification() {
        assert_eq!(classify_debt(0.0, 0.0), DebtLevel::None);
        assert_eq!(classify_debt(100.0, 25.0), DebtLevel::High);
        assert_eq!(classify_debt(100.0, 20.0), DebtLevel::Moderate);
        assert_eq!(classify_debt(100.0, 10.0), DebtLevel::Healthy);
    }

    #[test]
    fn test_emergency_classification() {
        assert_eq!(classify_emergency_fund(0.0, 0.0), EmergencyFundLevel::None);
        assert_eq!(classify_emergency_fund(10.0, 2.9), EmergencyFundLevel::Urgent);
        assert_eq!(classify_emergency_fund(10.0, 3.0), EmergencyFundLevel::Adequate);
        assert_eq!(classify_emergency_fund(10.0, 6.0), EmergencyFundLevel::Excellent);
    }

    #[test]
    fn test_utilization_and_debt_ratio() {
        let b = budget(
            4000.0,
            &[(CategoryKind::Housing, 1000.0), (CategoryKind::Debt, 1000.0)],
        );
        let m = health_metrics(&b);

        assert_eq!(m.budget_utilization, 50.0);
        assert_eq!(m.debt_to_income_ratio, 25.0);
        assert_eq!(m.debt_level, DebtLevel::High);
    }
}
