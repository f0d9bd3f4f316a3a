//! Parsing helpers for AI backend responses
//!
//! Replies are shape-checked and nothing more: JSON replies must be an array
//! of objects, missing fields get fixed placeholders, and anything else is an
//! `InvalidData` error the advisor turns into a fallback.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::insights::{InsightKind, SavingTip, SpendingInsight, MAX_SAVING_TIPS};
use crate::models::EXPENSE_CATEGORIES;

/// Markers a budget insight line must carry
pub const INSIGHT_MARKERS: &str = "[💡🎯✅⚠📈📉🚨💳🏆💰🔍📊🎉]";

/// Shorter lines are filler, not insights
const MIN_INSIGHT_CHARS: usize = 20;

/// Most AI budget insight lines kept
pub const MAX_AI_INSIGHT_LINES: usize = 6;

/// Most AI scenario suggestions projected
pub const MAX_AI_SCENARIOS: usize = 3;

/// Default monthly amount for a scenario the model left blank
pub const DEFAULT_SCENARIO_CONTRIBUTION: f64 = 100.0;

fn truncate(raw: &str) -> String {
    if raw.chars().count() > 200 {
        format!("{}...", raw.chars().take(200).collect::<String>())
    } else {
        raw.to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Remove a surrounding Markdown code fence (```json or ```)
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let body = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a reply that must be a JSON array of objects
pub fn parse_json_array<T: DeserializeOwned>(response: &str) -> Result<Vec<T>> {
    let cleaned = strip_code_fences(response);

    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from AI: {} | Raw: {}",
            e,
            truncate(cleaned)
        ))
    })?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(Error::InvalidData(format!(
                "Expected a JSON array from AI | Raw: {}",
                truncate(cleaned)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            if !item.is_object() {
                return Err(Error::InvalidData(format!(
                    "Expected an object in AI array, got: {}",
                    truncate(&item.to_string())
                )));
            }
            serde_json::from_value(item)
                .map_err(|e| Error::InvalidData(format!("Unexpected field type from AI: {}", e)))
        })
        .collect()
}

/// Keep marker-bearing lines longer than 20 characters, at most six
pub fn parse_budget_insight_lines(response: &str) -> Result<Vec<String>> {
    let marker = Regex::new(INSIGHT_MARKERS)?;

    Ok(response
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_INSIGHT_CHARS && marker.is_match(line))
        .take(MAX_AI_INSIGHT_LINES)
        .map(String::from)
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTip {
    title: Option<String>,
    description: Option<String>,
    potential_savings: Option<String>,
    category: Option<String>,
}

/// Saving tips with placeholders for missing fields, at most six
pub fn parse_saving_tips(response: &str) -> Result<Vec<SavingTip>> {
    let raw: Vec<RawTip> = parse_json_array(response)?;
    if raw.is_empty() {
        return Err(Error::InvalidData("AI returned no saving tips".into()));
    }

    Ok(raw
        .into_iter()
        .take(MAX_SAVING_TIPS)
        .map(|t| SavingTip {
            title: non_empty(t.title).unwrap_or_else(|| "Saving Tip".into()),
            description: non_empty(t.description)
                .unwrap_or_else(|| "Implement this strategy to save money.".into()),
            potential_savings: non_empty(t.potential_savings)
                .unwrap_or_else(|| "$100+ annually".into()),
            category: non_empty(t.category).unwrap_or_else(|| "General".into()),
        })
        .collect())
}

/// A scenario idea from the model: only the title and amount are kept
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSuggestion {
    pub title: String,
    pub additional_contribution: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScenario {
    title: Option<String>,
    additional_contribution: Option<f64>,
}

/// Scenario suggestions; any amounts the model computed are discarded
pub fn parse_scenario_suggestions(response: &str) -> Result<Vec<ScenarioSuggestion>> {
    let raw: Vec<RawScenario> = parse_json_array(response)?;
    if raw.is_empty() {
        return Err(Error::InvalidData("AI returned no scenarios".into()));
    }

    Ok(raw
        .into_iter()
        .take(MAX_AI_SCENARIOS)
        .map(|s| ScenarioSuggestion {
            title: non_empty(s.title).unwrap_or_else(|| "Lifestyle Change".into()),
            additional_contribution: s
                .additional_contribution
                .filter(|c| c.is_finite() && *c > 0.0)
                .unwrap_or(DEFAULT_SCENARIO_CONTRIBUTION),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RawSpendingInsight {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    message: Option<String>,
    action: Option<String>,
    confidence: Option<f64>,
}

/// Spending insights with defaults; unknown types become `info`
pub fn parse_spending_insights(response: &str) -> Result<Vec<SpendingInsight>> {
    let raw: Vec<RawSpendingInsight> = parse_json_array(response)?;
    if raw.is_empty() {
        return Err(Error::InvalidData("AI returned no insights".into()));
    }

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| SpendingInsight {
            id: format!("ai-{}", i + 1),
            kind: r
                .kind
                .and_then(|k| k.parse().ok())
                .unwrap_or(InsightKind::Info),
            title: non_empty(r.title).unwrap_or_else(|| "AI Insight".into()),
            message: non_empty(r.message).unwrap_or_else(|| "Analysis complete".into()),
            action: non_empty(r.action),
            confidence: r
                .confidence
                .filter(|c| c.is_finite() && *c > 0.0)
                .map(|c| c.min(1.0))
                .unwrap_or(0.8),
        })
        .collect())
}

/// Map a reply onto a known expense category, "Other" when it is not one
pub fn parse_category(response: &str) -> String {
    let cleaned = response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace());

    EXPENSE_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(cleaned))
        .map(|c| c.to_string())
        .unwrap_or_else(|| "Other".to_string())
}

/// A free-text answer; empty replies are an error
pub fn parse_answer(response: &str) -> Result<String> {
    let answer = response.trim();
    if answer.is_empty() {
        return Err(Error::InvalidData("Empty answer from AI".into()));
    }
    Ok(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[2]\n```  "), "[2]");
        assert_eq!(strip_code_fences("  [3] "), "[3]");
    }

    #[test]
    fn test_parse_json_array_rejects_non_arrays() {
        assert!(matches!(
            parse_json_array::<serde_json::Value>(r#"{"title": "x"}"#),
            Err(Error::InvalidData(_))
        ));
        assert!(parse_json_array::<serde_json::Value>("not json at all").is_err());
        assert!(parse_json_array::<RawTip>("[1, 2]").is_err());
    }

    #[test]
    fn test_budget_insight_lines() {
        let reply = "Here you go:\n\
            💡 You have $500.00 left - put it toward your emergency fund.\n\
            🎯 short\n\
            A plain sentence without any marker that is long enough.\n\
            ⚠️ Your dining budget is well above the recommended share of income.";
        let lines = parse_budget_insight_lines(reply).unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("💡"));
        assert!(lines[1].starts_with("⚠️"));
    }

    #[test]
    fn test_budget_insight_lines_cap() {
        let reply = (0..10)
            .map(|i| format!("📊 Insight number {} with enough characters", i))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(parse_budget_insight_lines(&reply).unwrap().len(), 6);
    }

    #[test]
    fn test_saving_tips_defaults() {
        let reply = r#"```json
[{"title": "Cook at home"}, {"description": "", "category": "Food"}]
```"#;
        let tips = parse_saving_tips(reply).unwrap();

        assert_eq!(tips[0].title, "Cook at home");
        assert_eq!(tips[0].description, "Implement this strategy to save money.");
        assert_eq!(tips[0].potential_savings, "$100+ annually");
        assert_eq!(tips[0].category, "General");
        assert_eq!(tips[1].title, "Saving Tip");
        assert_eq!(tips[1].category, "Food");
    }

    #[test]
    fn test_saving_tips_cap_and_empty() {
        let reply = format!("[{}]", vec![r#"{"title": "t"}"#; 9].join(","));
        assert_eq!(parse_saving_tips(&reply).unwrap().len(), MAX_SAVING_TIPS);
        assert!(parse_saving_tips("[]").is_err());
    }

    #[test]
    fn test_scenario_suggestions_drop_model_math() {
        let reply = r#"[
            {"title": "Skip takeout", "additionalContribution": 75, "finalAmount": 99999999},
            {"additionalContribution": -5},
            {"title": "  "}
        ]"#;
        let suggestions = parse_scenario_suggestions(reply).unwrap();

        assert_eq!(suggestions[0].title, "Skip takeout");
        assert_eq!(suggestions[0].additional_contribution, 75.0);
        assert_eq!(suggestions[1].title, "Lifestyle Change");
        assert_eq!(suggestions[1].additional_contribution, 100.0);
        assert_eq!(suggestions[2].additional_contribution, 100.0);
    }

    #[test]
    fn test_scenario_suggestions_capped() {
        let reply = format!(
            "[{}]",
            vec![r#"{"title": "More", "additionalContribution": 10}"#; 8].join(",")
        );
        let suggestions = parse_scenario_suggestions(&reply).unwrap();
        assert_eq!(suggestions.len(), MAX_AI_SCENARIOS);
    }

    #[test]
    fn test_scenario_wrong_type_is_error() {
        assert!(parse_scenario_suggestions(r#"[{"additionalContribution": "lots"}]"#).is_err());
    }

    #[test]
    fn test_spending_insights_defaults() {
        let reply = r#"[{"type": "tip", "title": "Batch errands"}, {"type": "alarm", "confidence": 3}]"#;
        let insights = parse_spending_insights(reply).unwrap();

        assert_eq!(insights[0].id, "ai-1");
        assert_eq!(insights[0].kind, InsightKind::Tip);
        assert_eq!(insights[0].message, "Analysis complete");
        assert_eq!(insights[0].confidence, 0.8);
        assert!(insights[0].action.is_none());
        assert_eq!(insights[1].kind, InsightKind::Info);
        assert_eq!(insights[1].title, "AI Insight");
        assert_eq!(insights[1].confidence, 1.0);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("Food"), "Food");
        assert_eq!(parse_category("  transportation.\n"), "Transportation");
        assert_eq!(parse_category("\"Bills\""), "Bills");
        assert_eq!(parse_category("Groceries"), "Other");
        assert_eq!(parse_category(""), "Other");
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("  Spend less.  ").unwrap(), "Spend less.");
        assert!(parse_answer("   ").is_err());
    }
}
