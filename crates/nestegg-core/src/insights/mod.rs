//! Heuristic insights
//!
//! Deterministic, rule-based advice. It is what users see whenever the AI
//! collaborator is not configured, times out, or answers with something
//! unusable, so every output here is complete on its own.
//!
//! ## Budget rules (in order)
//!
//! - **Balance** - surplus, deficit or perfectly balanced (always one)
//! - **Variance** - categories more than 5 points off their recommendation
//! - **Emergency fund** - months of expenses covered by savings
//! - **Debt** - debt-to-income ratio
//! - **Opportunity** - unallocated income above 10%
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nestegg_core::insights::BudgetInsightEngine;
//!
//! let engine = BudgetInsightEngine::new();
//! let insights = engine.generate(&budget);
//! ```

pub mod engine;
pub mod rules;
pub mod tips;
pub mod types;

pub use engine::{BudgetContext, BudgetInsightEngine, InsightRule, MAX_BUDGET_INSIGHTS};
pub use tips::{fallback_tips, MAX_SAVING_TIPS};
pub use types::{Insight, InsightKind, SavingTip, SpendingInsight};
