//! Core types for insights and saving tips

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tag on an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Something that needs fixing
    Warning,
    Info,
    /// Positive reinforcement
    Success,
    /// A suggestion to act on
    Tip,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Info => "info",
            InsightKind::Success => "success",
            InsightKind::Tip => "tip",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            InsightKind::Success => 1,
            InsightKind::Info => 2,
            InsightKind::Tip => 3,
            InsightKind::Warning => 4,
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warning" => Ok(InsightKind::Warning),
            "info" => Ok(InsightKind::Info),
            "success" => Ok(InsightKind::Success),
            "tip" => Ok(InsightKind::Tip),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// One piece of budget advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub kind: InsightKind,
    /// A single sentence, starting with its marker emoji
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Suggested savings, free text (e.g. "$300-600 annually")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
}

impl Insight {
    pub fn new(kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            title: None,
            savings: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_savings(mut self, savings: impl Into<String>) -> Self {
        self.savings = Some(savings.into());
        self
    }
}

/// A money-saving tip shown next to an investment projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingTip {
    pub title: String,
    pub description: String,
    pub potential_savings: String,
    pub category: String,
}

impl SavingTip {
    pub fn new(title: &str, description: &str, potential_savings: &str, category: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            potential_savings: potential_savings.to_string(),
            category: category.to_string(),
        }
    }

    /// The tip as a generic insight
    pub fn to_insight(&self) -> Insight {
        Insight::new(
            InsightKind::Tip,
            format!("💡 {}: {}", self.title, self.description),
        )
        .with_title(&self.title)
        .with_savings(&self.potential_savings)
    }
}

/// A structured observation about recorded spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// 0.0 to 1.0
    pub confidence: f64,
}

impl SpendingInsight {
    /// Shown when no spending analysis could be produced
    pub fn unavailable() -> Self {
        Self {
            id: "fallback-1".to_string(),
            kind: InsightKind::Info,
            title: "AI Analysis Unavailable".to_string(),
            message: "Unable to generate personalized insights at this time. Please try again later."
                .to_string(),
            action: Some("Refresh insights".to_string()),
            confidence: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            InsightKind::Warning,
            InsightKind::Info,
            InsightKind::Success,
            InsightKind::Tip,
        ] {
            assert_eq!(InsightKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert_eq!(InsightKind::from_str(" Warning ").unwrap(), InsightKind::Warning);
        assert!(InsightKind::from_str("alert").is_err());
    }

    #[test]
    fn test_kind_priority() {
        assert!(InsightKind::Warning.priority() > InsightKind::Tip.priority());
        assert!(InsightKind::Info.priority() > InsightKind::Success.priority());
    }

    #[test]
    fn test_insight_builder() {
        let insight = Insight::new(InsightKind::Tip, "💡 Save more")
            .with_title("Save")
            .with_savings("$10 monthly");

        assert_eq!(insight.title.as_deref(), Some("Save"));
        assert_eq!(insight.savings.as_deref(), Some("$10 monthly"));
    }

    #[test]
    fn test_spending_insight_serializes_type() {
        let json = serde_json::to_value(SpendingInsight::unavailable()).unwrap();
        assert_eq!(json["type"], "info");
        assert_eq!(json["title"], "AI Analysis Unavailable");
        assert_eq!(json["confidence"], 0.5);
    }
}
