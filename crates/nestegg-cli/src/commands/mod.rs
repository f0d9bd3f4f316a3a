//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `audit` - Audit log listing
//! - `budget` - Budget commands (show, save, evaluate, recommend, insights)
//! - `core` - Init and shared utilities (open_db, open_advisor, resolve_user)
//! - `investment` - Retirement projection, scenarios and tips
//! - `records` - Expense record commands (add, list, import, summary, insights, ask)
//! - `serve` - Web server command

pub mod audit;
pub mod budget;
pub mod core;
pub mod investment;
pub mod records;
pub mod serve;

// Re-export command functions for main.rs
pub use audit::*;
pub use budget::*;
pub use core::*;
pub use investment::*;
pub use records::*;
pub use serve::*;

use nestegg_core::{Advice, Advisor};

/// Warn when a configured AI backend did not produce `advice`
pub fn warn_on_fallback<T>(advisor: &Advisor, advice: &Advice<T>, what: &str) {
    if advisor.is_ai_enabled() && !advice.is_ai() {
        tracing::warn!("AI backend did not answer; {} come from built-in heuristics", what);
    }
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a dollar amount with thousands separators
pub fn money(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{}", if negative { "-" } else { "" }, grouped, frac)
}
