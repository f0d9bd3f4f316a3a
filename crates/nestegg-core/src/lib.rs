//! Nestegg Core Library
//!
//! Shared functionality for the Nestegg budget and retirement planner:
//! - Growth simulation and "what if" scenarios
//! - Budget aggregation, variance analysis and recommendations
//! - Rule-based budget insights and saving tips
//! - Pluggable advice backends (OpenRouter and other OpenAI-compatible servers, Ollama)
//! - Advisor that falls back to the heuristics when the backend fails
//! - Prompt library and advisor configuration with local overrides
//! - Database access (budgets, expense records, audit log) and CSV import

pub mod advisor;
pub mod ai;
pub mod budget;
pub mod config;
pub mod db;
pub mod error;
pub mod growth;
pub mod import;
pub mod insights;
pub mod models;
pub mod prompts;
pub mod ratio;

/// Test utilities including a mock chat completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{Advice, AdviceSource, Advisor, ANSWER_UNAVAILABLE};
pub use ai::{AIBackend, AIClient, AdviceTask, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use budget::{evaluate, BudgetEvaluation, CategoryBreakdown};
pub use config::{AdvisorConfig, TaskSettings};
pub use db::{AuditEntry, Database, ImportSummary};
pub use error::{Error, Result};
pub use growth::{simulate, ScenarioProjector};
pub use insights::{BudgetInsightEngine, Insight, InsightKind, SavingTip, SpendingInsight};
pub use prompts::{Prompt, PromptId, PromptLibrary};
