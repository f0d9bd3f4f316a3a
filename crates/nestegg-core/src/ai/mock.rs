//! Mock backend for testing
//!
//! Returns predictable replies for every advice task. Useful for unit tests
//! and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{AdviceTask, ChatRequest};
use super::AIBackend;

/// What the mock says
#[derive(Clone, Debug, Default)]
pub enum MockReply {
    /// A well-formed reply for each task
    #[default]
    Canned,
    /// The same text for every request
    Fixed(String),
    /// Every request fails as if the service were down
    Fail,
}

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: MockReply,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned replies)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend whose requests fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            reply: MockReply::Fail,
            ..Default::default()
        }
    }

    /// Reply with `text` to every request
    pub fn fixed(text: &str) -> Self {
        Self {
            healthy: true,
            reply: MockReply::Fixed(text.to_string()),
            ..Default::default()
        }
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }

    /// Number of completion requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned(request: &ChatRequest) -> String {
        match request.task {
            AdviceTask::BudgetInsights => [
                "Here are your insights:",
                "💡 Direct part of your remaining income to an emergency fund until it covers three months of expenses.",
                "🎯 Keep housing close to 28% of income so that saving stays comfortable.",
                "📊 Review your largest category each month and trim one recurring cost.",
            ]
            .join("\n"),
            AdviceTask::SavingTips => r#"```json
[
  {"title": "Brew Coffee at Home", "description": "Make coffee at home on weekdays.", "potentialSavings": "$80 monthly", "category": "Food"},
  {"title": "Round-Up Investing", "description": "Invest spare change from card purchases.", "category": "Automation"}
]
```"#
                .to_string(),
            AdviceTask::InvestmentScenarios => r#"[
  {"title": "Packed lunch three days a week", "additionalContribution": 90, "finalAmount": 1, "additionalGrowth": 1},
  {"title": "Cancelled two streaming services", "additionalContribution": 30}
]"#
                .to_string(),
            AdviceTask::CategorizeExpense => {
                let text = request.user.to_lowercase();
                let category = if ["coffee", "grocer", "restaurant", "lunch"]
                    .iter()
                    .any(|k| text.contains(k))
                {
                    "Food"
                } else if ["uber", "fuel", "gas", "bus", "train"]
                    .iter()
                    .any(|k| text.contains(k))
                {
                    "Transportation"
                } else {
                    "Shopping"
                };
                category.to_string()
            }
            AdviceTask::ExpenseInsights => r#"[
  {"type": "warning", "title": "Dining Out Adds Up", "message": "Food is your largest category this month.", "action": "Set a weekly dining budget", "confidence": 0.9},
  {"type": "success", "message": "No spending on entertainment this week."}
]"#
                .to_string(),
            AdviceTask::AnswerQuestion => {
                "Most of your spending goes to food. Setting a weekly grocery limit would have the biggest effect."
                    .to_string()
            }
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            MockReply::Canned => Ok(Self::canned(request)),
            MockReply::Fixed(text) => Ok(text.clone()),
            MockReply::Fail => Err(Error::UpstreamUnavailable("mock backend is down".into())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
