//! Prompt library for the advice collaborator
//!
//! A prompt file in `~/.local/share/nestegg/prompts/<id>.md` replaces the
//! built-in prompt of the same id; otherwise the copy compiled into the
//! binary is used.
//!
//! Each prompt is Markdown with YAML frontmatter and two sections,
//! `# System` and `# User`. The user section is a template: `{{var}}` is
//! replaced and `{{#if var}}...{{/if}}` blocks are dropped when `var` is
//! missing or empty.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ai::AdviceTask;
use crate::error::{Error, Result};

/// Built-in prompts
mod defaults {
    pub const BUDGET_INSIGHTS: &str = include_str!("../../../prompts/budget_insights.md");
    pub const SAVING_TIPS: &str = include_str!("../../../prompts/saving_tips.md");
    pub const INVESTMENT_SCENARIOS: &str =
        include_str!("../../../prompts/investment_scenarios.md");
    pub const CATEGORIZE_EXPENSE: &str = include_str!("../../../prompts/categorize_expense.md");
    pub const EXPENSE_INSIGHTS: &str = include_str!("../../../prompts/expense_insights.md");
    pub const ANSWER_QUESTION: &str = include_str!("../../../prompts/answer_question.md");
}

/// Known prompt IDs, one per advice task
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PromptId {
    BudgetInsights,
    SavingTips,
    InvestmentScenarios,
    CategorizeExpense,
    ExpenseInsights,
    AnswerQuestion,
}

impl PromptId {
    /// File stem and frontmatter id
    pub fn as_str(&self) -> &'static str {
        self.task().as_str()
    }

    /// Every prompt, one per advice task
    pub fn all() -> &'static [PromptId] {
        &[
            Self::BudgetInsights,
            Self::SavingTips,
            Self::InvestmentScenarios,
            Self::CategorizeExpense,
            Self::ExpenseInsights,
            Self::AnswerQuestion,
        ]
    }

    /// The advice task this prompt drives
    pub fn task(&self) -> AdviceTask {
        match self {
            Self::BudgetInsights => AdviceTask::BudgetInsights,
            Self::SavingTips => AdviceTask::SavingTips,
            Self::InvestmentScenarios => AdviceTask::InvestmentScenarios,
            Self::CategorizeExpense => AdviceTask::CategorizeExpense,
            Self::ExpenseInsights => AdviceTask::ExpenseInsights,
            Self::AnswerQuestion => AdviceTask::AnswerQuestion,
        }
    }

    pub fn for_task(task: AdviceTask) -> Self {
        match task {
            AdviceTask::BudgetInsights => Self::BudgetInsights,
            AdviceTask::SavingTips => Self::SavingTips,
            AdviceTask::InvestmentScenarios => Self::InvestmentScenarios,
            AdviceTask::CategorizeExpense => Self::CategorizeExpense,
            AdviceTask::ExpenseInsights => Self::ExpenseInsights,
            AdviceTask::AnswerQuestion => Self::AnswerQuestion,
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            Self::BudgetInsights => defaults::BUDGET_INSIGHTS,
            Self::SavingTips => defaults::SAVING_TIPS,
            Self::InvestmentScenarios => defaults::INVESTMENT_SCENARIOS,
            Self::CategorizeExpense => defaults::CATEGORIZE_EXPENSE,
            Self::ExpenseInsights => defaults::EXPENSE_INSIGHTS,
            Self::AnswerQuestion => defaults::ANSWER_QUESTION,
        }
    }
}

/// YAML frontmatter of a prompt file
#[derive(Deserialize, Debug, Clone)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the wording changes
    pub version: u32,
    /// Advice task the prompt belongs to
    pub task_type: String,
}

/// A parsed prompt
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// Body after the frontmatter
    pub content: String,
    pub is_override: bool,
    /// File the override was read from
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        section(&self.content, "# User")
    }

    /// The system section, or empty when the prompt has none
    pub fn system(&self) -> String {
        self.system_section().unwrap_or_default().to_string()
    }

    /// Render the user section (or the whole prompt) with variables replaced
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        let template = self.user_section().unwrap_or(&self.content);
        let rendered = vars.iter().fold(template.to_string(), |text, (name, value)| {
            text.replace(&["{{", *name, "}}"].concat(), value)
        });
        resolve_conditionals(&rendered, vars)
    }
}

/// Loads prompts on first use and keeps them
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    loaded: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Overrides from the platform data directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            loaded: HashMap::new(),
        }
    }

    /// Overrides from `path`
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            loaded: HashMap::new(),
        }
    }

    /// Built-in prompts only
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let prompt = match self.loaded.entry(id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let loaded = load(self.override_dir.as_ref(), id)?;
                entry.insert(loaded)
            }
        };
        Ok(prompt)
    }

    /// Whether an override file exists for `id`
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_dir
            .as_ref()
            .is_some_and(|d| d.join(format!("{}.md", id.as_str())).exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Forget loaded prompts so edited override files are picked up
    pub fn reload(&mut self) {
        self.loaded.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the override for `id` if there is one, else the built-in prompt
fn load(override_dir: Option<&PathBuf>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(format!("{}.md", id.as_str()));
        if override_path.is_file() {
            let text = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Cannot read {}: {}", override_path.display(), e))
            })?;
            let (metadata, body) = parse_prompt(&text)?;
            tracing::debug!(
                prompt = id.as_str(),
                path = %override_path.display(),
                "Using prompt override"
            );
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.builtin())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// `<data_local_dir>/nestegg/prompts`
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("nestegg").join("prompts"))
}

/// Split a prompt file into frontmatter and body
fn parse_prompt(text: &str) -> Result<(PromptMetadata, String)> {
    let rest = text
        .trim()
        .strip_prefix("---")
        .ok_or_else(|| Error::InvalidData("Prompt has no frontmatter".into()))?;
    let (frontmatter, body) = rest
        .split_once("---")
        .ok_or_else(|| Error::InvalidData("Prompt frontmatter is not terminated".into()))?;

    let metadata = serde_yaml::from_str::<PromptMetadata>(frontmatter.trim())
        .map_err(|e| Error::InvalidData(format!("Bad prompt frontmatter: {}", e)))?;
    Ok((metadata, body.trim().to_string()))
}

/// Text under `header`, up to the next top-level header
fn section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let (_, tail) = content.split_once(header)?;
    let body = match tail.find("\n# ") {
        Some(next) => &tail[..next],
        None => tail,
    };
    Some(body.trim())
}

/// Resolve `{{#if var}}...{{/if}}` blocks against `vars`
fn resolve_conditionals(text: &str, vars: &HashMap<&str, &str>) -> String {
    const OPEN: &str = "{{#if ";
    const CLOSE: &str = "{{/if}}";

    let mut out = text.to_string();
    while let Some(open) = out.find(OPEN) {
        let name_start = open + OPEN.len();
        let Some(name_len) = out[name_start..].find("}}") else {
            break;
        };
        let inner_start = name_start + name_len + 2;
        let Some(inner_len) = out[inner_start..].find(CLOSE) else {
            break;
        };

        let name = &out[name_start..name_start + name_len];
        let inner = if vars.get(name).is_some_and(|v| !v.is_empty()) {
            &out[inner_start..inner_start + inner_len]
        } else {
            ""
        };
        out = [&out[..open], inner, &out[inner_start + inner_len + CLOSE.len()..]].concat();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
task_type: categorize_expense
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert_eq!(metadata.task_type, "categorize_expense");
        assert!(body.starts_with("# System"));
        assert!(body.ends_with("{{variable}}."));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("# System\nno frontmatter").is_err());
        assert!(parse_prompt("---\nid: x\n# System").is_err());
    }

    #[test]
    fn test_sections() {
        let content = "# System\nBe brief.\n\n# User\nHow much?";

        assert_eq!(section(content, "# System"), Some("Be brief."));
        assert_eq!(section(content, "# User"), Some("How much?"));
        assert_eq!(section(content, "# Assistant"), None);
    }

    #[test]
    fn test_render_user() {
        let prompt = Prompt {
            metadata: PromptMetadata {
                id: "t".into(),
                version: 1,
                task_type: "answer_question".into(),
            },
            content: "# System\nBe nice.\n\n# User\nHello {{name}}.{{#if extra}} Also {{extra}}.{{/if}}"
                .into(),
            is_override: false,
            override_path: None,
        };

        let mut vars = HashMap::new();
        vars.insert("name", "World");
        assert_eq!(prompt.render_user(&vars), "Hello World.");

        vars.insert("extra", "this");
        assert_eq!(prompt.render_user(&vars), "Hello World. Also this.");
        assert_eq!(prompt.system(), "Be nice.");
    }

    #[test]
    fn test_conditionals_follow_vars() {
        let text = "Spending{{#if month}} in {{month}}{{/if}}:";

        let vars = HashMap::from([("month", "March")]);
        assert_eq!(resolve_conditionals(text, &vars), "Spending in {{month}}:");

        let vars = HashMap::from([("month", "")]);
        assert_eq!(resolve_conditionals(text, &vars), "Spending:");
        assert_eq!(resolve_conditionals(text, &HashMap::new()), "Spending:");
    }

    #[test]
    fn test_prompt_library_embedded() {
        let mut library = PromptLibrary::embedded_only();
        for id in PromptId::all() {
            let prompt = library.get(*id).unwrap();
            assert!(!prompt.is_override, "{} came from disk", id.as_str());
            assert!(prompt.system_section().is_some());
            assert!(prompt.user_section().is_some());
        }
    }

    #[test]
    fn test_builtin_prompts_match_their_task() {
        for id in PromptId::all() {
            let (metadata, _) = parse_prompt(id.builtin()).unwrap();
            assert_eq!(metadata.id, id.as_str(), "Prompt ID mismatch for {}", id.as_str());
            assert_eq!(metadata.task_type, id.task().as_str());
            assert_eq!(PromptId::for_task(id.task()), *id);
        }
    }

    #[test]
    fn test_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("answer_question.md"),
            "---\nid: answer_question\nversion: 9\ntask_type: answer_question\n---\n# System\nCustom.\n\n# User\n{{question}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        assert!(lib.has_override(PromptId::AnswerQuestion));
        assert!(!lib.has_override(PromptId::SavingTips));

        let prompt = lib.get(PromptId::AnswerQuestion).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(prompt.system(), "Custom.");
    }
}
