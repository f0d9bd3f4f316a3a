//! Domain models for Nestegg

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest annual return the projector accepts, in percent
pub const MAX_ANNUAL_RETURN_PERCENT: f64 = 20.0;

/// Oldest age accepted for either end of a projection
pub const MAX_AGE: u32 = 120;

// ============================================================================
// Investment projection
// ============================================================================

/// Inputs to a retirement growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentParameters {
    pub current_age: u32,
    pub retirement_age: u32,
    /// Starting balance
    pub current_investment: f64,
    pub monthly_contribution: f64,
    /// Nominal annual return in percent (7.0 means 7%)
    #[serde(rename = "annualReturn")]
    pub annual_return_percent: f64,
}

impl InvestmentParameters {
    /// Years between now and retirement
    pub fn horizon_years(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    /// Reject anything the simulator cannot project
    pub fn validate(&self) -> Result<()> {
        if self.current_age >= self.retirement_age {
            return Err(Error::InvalidParameters(
                "Retirement age must be greater than current age".into(),
            ));
        }
        if self.retirement_age > MAX_AGE {
            return Err(Error::InvalidParameters(format!(
                "Ages above {} are not supported",
                MAX_AGE
            )));
        }
        for (name, value) in [
            ("currentInvestment", self.current_investment),
            ("monthlyContribution", self.monthly_contribution),
            ("annualReturn", self.annual_return_percent),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidParameters(format!(
                    "{} must be a finite number",
                    name
                )));
            }
            if value < 0.0 {
                return Err(Error::InvalidParameters(format!(
                    "{} cannot be negative",
                    name
                )));
            }
        }
        if self.annual_return_percent > MAX_ANNUAL_RETURN_PERCENT {
            return Err(Error::InvalidParameters(format!(
                "Annual return above {}% is unrealistic",
                MAX_ANNUAL_RETURN_PERCENT
            )));
        }
        Ok(())
    }
}

/// Ledger entry for one simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    /// Age at the end of this year
    pub year: u32,
    /// Ending balance
    pub balance: f64,
    /// Contributions made during the year
    pub contributions: f64,
    /// ending - starting - contributions
    pub growth: f64,
}

/// Result of a growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub total_years: u32,
    pub final_amount: f64,
    pub initial_balance: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub yearly_data: Vec<YearSnapshot>,
}

/// A "what if" variant of a projection with a larger monthly contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub title: String,
    pub additional_contribution: f64,
    pub final_amount: f64,
    pub additional_growth: f64,
}

// ============================================================================
// Budget
// ============================================================================

/// The fixed set of budget categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryKind {
    Housing,
    Savings,
    Retirement,
    Food,
    Transportation,
    Utilities,
    Insurance,
    PersonalEntertainment,
    Debt,
    HouseholdItems,
    Giving,
    Other,
}

impl CategoryKind {
    /// All categories in display order
    pub fn all() -> &'static [CategoryKind] {
        &[
            Self::Housing,
            Self::Savings,
            Self::Retirement,
            Self::Food,
            Self::Transportation,
            Self::Utilities,
            Self::Insurance,
            Self::PersonalEntertainment,
            Self::Debt,
            Self::HouseholdItems,
            Self::Giving,
            Self::Other,
        ]
    }

    /// Display name, also the category key inside a [`Budget`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Housing => "Housing",
            Self::Savings => "Savings",
            Self::Retirement => "Retirement",
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Utilities => "Utilities",
            Self::Insurance => "Insurance",
            Self::PersonalEntertainment => "Personal and Entertainment",
            Self::Debt => "Debt",
            Self::HouseholdItems => "Household Items",
            Self::Giving => "Giving",
            Self::Other => "Other",
        }
    }

    /// Recommended share of monthly income, in percent
    pub fn recommended_percentage(&self) -> f64 {
        match self {
            Self::Housing => 28.0,
            Self::Savings => 20.0,
            Self::Retirement => 15.0,
            Self::Food => 12.0,
            Self::Transportation => 6.0,
            Self::Utilities => 6.0,
            Self::Insurance => 5.0,
            Self::PersonalEntertainment => 4.0,
            Self::Debt => 0.0,
            Self::HouseholdItems => 2.0,
            Self::Giving => 0.0,
            Self::Other => 2.0,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Housing => "🏠",
            Self::Savings => "💰",
            Self::Retirement => "🏖️",
            Self::Food => "🍽️",
            Self::Transportation => "🚗",
            Self::Utilities => "⚡",
            Self::Insurance => "🛡️",
            Self::PersonalEntertainment => "🎮",
            Self::Debt => "💳",
            Self::HouseholdItems => "🧽",
            Self::Giving => "🤲",
            Self::Other => "📦",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Housing => "Rent/mortgage and housing costs",
            Self::Savings => "Emergency fund and general savings",
            Self::Retirement => "401k, IRA contributions",
            Self::Food => "Groceries and dining out",
            Self::Transportation => "Car payments, gas, public transit",
            Self::Utilities => "Electric, phone, water, internet",
            Self::Insurance => "Health, auto, life insurance",
            Self::PersonalEntertainment => "Hobbies, entertainment, personal care",
            Self::Debt => "Credit cards, loans (if any)",
            Self::HouseholdItems => "Cleaning supplies, maintenance",
            Self::Giving => {
                "Charitable donations and giving (Recommended 5-10% if the household is financially stable)"
            }
            Self::Other => "Miscellaneous expenses",
        }
    }

    /// A zero-amount category carrying this kind's reference data
    pub fn to_category(&self, amount: f64) -> BudgetCategory {
        BudgetCategory {
            name: self.as_str().to_string(),
            amount,
            recommended_percentage: self.recommended_percentage(),
            icon: self.icon().to_string(),
            description: self.description().to_string(),
        }
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "housing" => Ok(Self::Housing),
            "savings" => Ok(Self::Savings),
            "retirement" => Ok(Self::Retirement),
            "food" => Ok(Self::Food),
            "transportation" => Ok(Self::Transportation),
            "utilities" => Ok(Self::Utilities),
            "insurance" => Ok(Self::Insurance),
            "personalandentertainment" | "personalentertainment" => {
                Ok(Self::PersonalEntertainment)
            }
            "debt" => Ok(Self::Debt),
            "householditems" => Ok(Self::HouseholdItems),
            "giving" => Ok(Self::Giving),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown budget category: {}", s)),
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    /// Unique within a budget
    pub name: String,
    pub amount: f64,
    /// Reference share of income, in percent (not user-editable)
    pub recommended_percentage: f64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

impl BudgetCategory {
    /// Catalog recommendation for a standard category, the carried value for a
    /// custom one
    pub fn reference_percentage(&self) -> f64 {
        self.name
            .parse::<CategoryKind>()
            .map(|kind| kind.recommended_percentage())
            .unwrap_or(self.recommended_percentage)
    }
}

/// A monthly budget: income plus an ordered list of categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub monthly_income: f64,
    pub categories: Vec<BudgetCategory>,
}

impl Budget {
    /// The standard twelve-category budget with every amount at zero
    pub fn standard(monthly_income: f64) -> Self {
        Self {
            monthly_income,
            categories: CategoryKind::all()
                .iter()
                .map(|k| k.to_category(0.0))
                .collect(),
        }
    }

    pub fn total_budgeted(&self) -> f64 {
        self.categories.iter().map(|c| c.amount).sum()
    }

    pub fn remaining_income(&self) -> f64 {
        self.monthly_income - self.total_budgeted()
    }

    pub fn category(&self, kind: CategoryKind) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.name == kind.as_str())
    }

    /// Amount allocated to a category, 0 if the budget does not carry it
    pub fn amount_of(&self, kind: CategoryKind) -> f64 {
        self.category(kind).map(|c| c.amount).unwrap_or(0.0)
    }

    /// Set a category amount, adding the category if it is missing
    pub fn set_amount(&mut self, kind: CategoryKind, amount: f64) {
        match self.categories.iter_mut().find(|c| c.name == kind.as_str()) {
            Some(cat) => cat.amount = amount,
            None => self.categories.push(kind.to_category(amount)),
        }
    }

    /// Reject budgets the engines should never see
    pub fn validate(&self) -> Result<()> {
        if !self.monthly_income.is_finite() || self.monthly_income < 0.0 {
            return Err(Error::InvalidParameters(
                "Monthly income must be a non-negative number".into(),
            ));
        }

        let mut seen = HashSet::new();
        for cat in &self.categories {
            if !seen.insert(cat.name.as_str()) {
                return Err(Error::InvalidParameters(format!(
                    "Duplicate budget category: {}",
                    cat.name
                )));
            }
            if !cat.amount.is_finite() || cat.amount < 0.0 {
                return Err(Error::InvalidParameters(format!(
                    "Amount for {} must be a non-negative number",
                    cat.name
                )));
            }
            if !(0.0..=100.0).contains(&cat.recommended_percentage) {
                return Err(Error::InvalidParameters(format!(
                    "Recommended percentage for {} must be between 0 and 100",
                    cat.name
                )));
            }
        }
        Ok(())
    }
}

/// Persisted per-user budget: income plus the twelve fixed category amounts.
///
/// Missing fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedBudget {
    pub monthly_income: f64,
    pub housing: f64,
    pub savings: f64,
    pub retirement: f64,
    pub food: f64,
    pub transportation: f64,
    pub utilities: f64,
    pub insurance: f64,
    pub personal_entertainment: f64,
    pub debt: f64,
    pub household_items: f64,
    pub giving: f64,
    pub other: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SavedBudget {
    pub fn amount(&self, kind: CategoryKind) -> f64 {
        match kind {
            CategoryKind::Housing => self.housing,
            CategoryKind::Savings => self.savings,
            CategoryKind::Retirement => self.retirement,
            CategoryKind::Food => self.food,
            CategoryKind::Transportation => self.transportation,
            CategoryKind::Utilities => self.utilities,
            CategoryKind::Insurance => self.insurance,
            CategoryKind::PersonalEntertainment => self.personal_entertainment,
            CategoryKind::Debt => self.debt,
            CategoryKind::HouseholdItems => self.household_items,
            CategoryKind::Giving => self.giving,
            CategoryKind::Other => self.other,
        }
    }

    fn amount_mut(&mut self, kind: CategoryKind) -> &mut f64 {
        match kind {
            CategoryKind::Housing => &mut self.housing,
            CategoryKind::Savings => &mut self.savings,
            CategoryKind::Retirement => &mut self.retirement,
            CategoryKind::Food => &mut self.food,
            CategoryKind::Transportation => &mut self.transportation,
            CategoryKind::Utilities => &mut self.utilities,
            CategoryKind::Insurance => &mut self.insurance,
            CategoryKind::PersonalEntertainment => &mut self.personal_entertainment,
            CategoryKind::Debt => &mut self.debt,
            CategoryKind::HouseholdItems => &mut self.household_items,
            CategoryKind::Giving => &mut self.giving,
            CategoryKind::Other => &mut self.other,
        }
    }

    /// Expand into a full [`Budget`] in display order
    pub fn to_budget(&self) -> Budget {
        Budget {
            monthly_income: self.monthly_income,
            categories: CategoryKind::all()
                .iter()
                .map(|k| k.to_category(self.amount(*k)))
                .collect(),
        }
    }

    /// Collapse a [`Budget`] into the fixed fields.
    ///
    /// Categories outside the standard twelve are folded into `other`.
    pub fn from_budget(budget: &Budget) -> Self {
        let mut saved = SavedBudget {
            monthly_income: budget.monthly_income,
            ..Default::default()
        };
        for cat in &budget.categories {
            let kind = cat.name.parse().unwrap_or(CategoryKind::Other);
            *saved.amount_mut(kind) += cat.amount;
        }
        saved
    }
}

// ============================================================================
// Expense records
// ============================================================================

/// Categories the advice collaborator may assign to an expense
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Other",
];

/// A stored expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    /// Stored as entered; any sign convention is accepted
    pub amount: f64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A new expense record for insertion
#[derive(Debug, Clone)]
pub struct NewExpenseRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    /// SHA-256 over date, description and amount
    pub import_hash: String,
}

impl NewExpenseRecord {
    pub fn new(date: NaiveDate, description: &str, amount: f64, category: Option<String>) -> Self {
        let import_hash = crate::import::record_hash(date, description, amount);
        Self {
            date,
            description: description.to_string(),
            amount,
            category,
            import_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> InvestmentParameters {
        InvestmentParameters {
            current_age: 30,
            retirement_age: 65,
            current_investment: 10_000.0,
            monthly_contribution: 500.0,
            annual_return_percent: 7.0,
        }
    }

    #[test]
    fn test_params_validate_ok() {
        assert!(params().validate().is_ok());
        assert_eq!(params().horizon_years(), 35);
    }

    #[test]
    fn test_params_reject_bad_ages() {
        let mut p = params();
        p.retirement_age = 30;
        assert!(matches!(p.validate(), Err(Error::InvalidParameters(_))));
        p.retirement_age = 25;
        assert!(matches!(p.validate(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_params_reject_bad_numbers() {
        let mut p = params();
        p.current_investment = -1.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.monthly_contribution = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = params();
        p.annual_return_percent = 25.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.annual_return_percent = -3.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_params_zero_rate_is_valid() {
        let mut p = params();
        p.annual_return_percent = 0.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_params_serde_names() {
        let json = serde_json::to_value(params()).unwrap();
        assert_eq!(json["currentAge"], 30);
        assert_eq!(json["annualReturn"], 7.0);
    }

    #[test]
    fn test_standard_catalog() {
        let budget = Budget::standard(5000.0);
        assert_eq!(budget.categories.len(), 12);
        assert_eq!(budget.categories[0].name, "Housing");
        assert_eq!(budget.categories[0].recommended_percentage, 28.0);
        assert_eq!(budget.categories[11].name, "Other");

        let total: f64 = budget
            .categories
            .iter()
            .map(|c| c.recommended_percentage)
            .sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_budget_totals() {
        let mut budget = Budget::standard(4000.0);
        budget.set_amount(CategoryKind::Housing, 1200.0);
        budget.set_amount(CategoryKind::Food, 400.0);

        assert_eq!(budget.total_budgeted(), 1600.0);
        assert_eq!(budget.remaining_income(), 2400.0);
        assert_eq!(budget.amount_of(CategoryKind::Food), 400.0);
        assert_eq!(budget.amount_of(CategoryKind::Debt), 0.0);
    }

    #[test]
    fn test_budget_validate() {
        let mut budget = Budget::standard(4000.0);
        assert!(budget.validate().is_ok());

        budget.set_amount(CategoryKind::Food, -5.0);
        assert!(budget.validate().is_err());

        let mut budget = Budget::standard(4000.0);
        budget.categories.push(CategoryKind::Food.to_category(10.0));
        assert!(budget.validate().is_err());

        let budget = Budget::standard(f64::INFINITY);
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_category_kind_parse() {
        assert_eq!(
            "Personal and Entertainment".parse::<CategoryKind>().unwrap(),
            CategoryKind::PersonalEntertainment
        );
        assert_eq!(
            "householdItems".parse::<CategoryKind>().unwrap(),
            CategoryKind::HouseholdItems
        );
        assert!("Pets".parse::<CategoryKind>().is_err());
    }

    #[test]
    fn test_saved_budget_round_trip() {
        let mut budget = Budget::standard(6000.0);
        budget.set_amount(CategoryKind::Housing, 1800.0);
        budget.set_amount(CategoryKind::PersonalEntertainment, 150.0);

        let saved = SavedBudget::from_budget(&budget);
        assert_eq!(saved.housing, 1800.0);
        assert_eq!(saved.personal_entertainment, 150.0);
        assert_eq!(saved.to_budget(), budget);
    }

    #[test]
    fn test_saved_budget_folds_unknown_into_other() {
        let mut budget = Budget::standard(3000.0);
        budget.set_amount(CategoryKind::Other, 20.0);
        budget.categories.push(BudgetCategory {
            name: "Pets".to_string(),
            amount: 80.0,
            recommended_percentage: 0.0,
            icon: String::new(),
            description: String::new(),
        });

        let saved = SavedBudget::from_budget(&budget);
        assert_eq!(saved.other, 100.0);
    }
}
