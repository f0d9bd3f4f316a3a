//! AI backend request and response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The advice tasks the collaborator is asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTask {
    /// Emoji-prefixed sentences about a budget
    BudgetInsights,
    /// JSON array of money-saving tips
    SavingTips,
    /// JSON array of "what if" scenarios
    InvestmentScenarios,
    /// One category name for an expense description
    CategorizeExpense,
    /// JSON array of spending observations
    ExpenseInsights,
    /// Short free-text answer about recorded expenses
    AnswerQuestion,
}

impl AdviceTask {
    pub fn all() -> &'static [AdviceTask] {
        &[
            AdviceTask::BudgetInsights,
            AdviceTask::SavingTips,
            AdviceTask::InvestmentScenarios,
            AdviceTask::CategorizeExpense,
            AdviceTask::ExpenseInsights,
            AdviceTask::AnswerQuestion,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceTask::BudgetInsights => "budget_insights",
            AdviceTask::SavingTips => "saving_tips",
            AdviceTask::InvestmentScenarios => "investment_scenarios",
            AdviceTask::CategorizeExpense => "categorize_expense",
            AdviceTask::ExpenseInsights => "expense_insights",
            AdviceTask::AnswerQuestion => "answer_question",
        }
    }
}

impl fmt::Display for AdviceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdviceTask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_insights" => Ok(AdviceTask::BudgetInsights),
            "saving_tips" => Ok(AdviceTask::SavingTips),
            "investment_scenarios" => Ok(AdviceTask::InvestmentScenarios),
            "categorize_expense" => Ok(AdviceTask::CategorizeExpense),
            "expense_insights" => Ok(AdviceTask::ExpenseInsights),
            "answer_question" => Ok(AdviceTask::AnswerQuestion),
            _ => Err(format!("Unknown advice task: {}", s)),
        }
    }
}

/// One chat completion request: a system message plus a user prompt
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub task: AdviceTask,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Overrides the backend's model for this request
    pub model: Option<String>,
}

impl ChatRequest {
    pub fn new(task: AdviceTask, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            task,
            system: system.into(),
            user: user.into(),
            temperature: 0.7,
            max_tokens: 800,
            model: None,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Backend details for display
#[derive(Debug, Clone, Serialize)]
pub struct BackendInfo {
    pub backend: String,
    pub model: String,
    pub host: String,
}
