//! Advisor configuration
//!
//! Per-task sampling and timeout settings for the advice collaborator.
//!
//! `~/.local/share/nestegg/config/advisor.toml` replaces the built-in
//! `config/advisor.toml` when present. Tasks missing from the file inherit
//! `[defaults]`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::ai::{AdviceTask, ChatRequest};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// Settings for one advice task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSettings {
    /// How long to wait for the collaborator before falling back
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Model override; the backend's own model when unset
    pub model: Option<String>,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 800,
            model: None,
        }
    }
}

/// Advisor configuration
#[derive(Debug, Clone, Default)]
pub struct AdvisorConfig {
    /// Used for tasks without their own entry
    pub defaults: TaskSettings,
    /// Per-task configurations
    pub tasks: HashMap<AdviceTask, TaskSettings>,
}

impl AdvisorConfig {
    /// Load the override file if present, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, falling back to the embedded defaults when it does not exist
    pub fn from_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// The embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Settings for a task
    pub fn for_task(&self, task: AdviceTask) -> &TaskSettings {
        self.tasks.get(&task).unwrap_or(&self.defaults)
    }

    /// Build a chat request for a task with its sampling settings applied
    pub fn request(
        &self,
        task: AdviceTask,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> ChatRequest {
        let settings = self.for_task(task);
        ChatRequest::new(task, system, user)
            .with_sampling(settings.temperature, settings.max_tokens)
            .with_model(settings.model.clone())
    }

    /// Replace every task timeout (used by tests and `--timeout` style flags)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.defaults.timeout = timeout;
        for settings in self.tasks.values_mut() {
            settings.timeout = timeout;
        }
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("nestegg").join("config").join("advisor.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AdvisorConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading advisor config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::InvalidData(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawTaskSettings>,
    tasks: Option<HashMap<String, RawTaskSettings>>,
}

#[derive(Debug, Deserialize)]
struct RawTaskSettings {
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    model: Option<String>,
}

impl RawTaskSettings {
    fn apply_over(self, base: &TaskSettings) -> TaskSettings {
        TaskSettings {
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.timeout),
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            model: self.model.or_else(|| base.model.clone()),
        }
    }
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AdvisorConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid config TOML: {}", e)))?;

    let mut config = AdvisorConfig::default();

    if let Some(defaults) = raw.defaults {
        config.defaults = defaults.apply_over(&config.defaults);
    }

    if let Some(tasks) = raw.tasks {
        for (name, settings) in tasks {
            let task: AdviceTask = match name.parse() {
                Ok(task) => task,
                Err(_) => {
                    tracing::warn!(task = %name, "Skipping unknown task in advisor config");
                    continue;
                }
            };
            config
                .tasks
                .insert(task, settings.apply_over(&config.defaults));
        }
    }

    if !(0.0..=2.0).contains(&config.defaults.temperature) {
        return Err(Error::InvalidData(format!(
            "Temperature must be between 0 and 2, got {}",
            config.defaults.temperature
        )));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.defaults.timeout, Duration::from_secs(30));

        let categorize = config.for_task(AdviceTask::CategorizeExpense);
        assert_eq!(categorize.temperature, 0.1);
        assert_eq!(categorize.max_tokens, 20);
        assert_eq!(categorize.timeout, Duration::from_secs(10));

        let tips = config.for_task(AdviceTask::SavingTips);
        assert_eq!(tips.temperature, 0.8);
        assert_eq!(tips.max_tokens, 1200);
        assert_eq!(tips.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_every_task_configured() {
        let config = AdvisorConfig::embedded().unwrap();
        for task in AdviceTask::all() {
            assert!(config.tasks.contains_key(task), "missing {}", task);
        }
    }

    #[test]
    fn test_missing_task_uses_defaults() {
        let config = parse_config(
            r#"
[defaults]
timeout_secs = 5
model = "gemma3"

[tasks.answer_question]
max_tokens = 50

[tasks.not_a_task]
max_tokens = 1
"#,
        )
        .unwrap();

        let answer = config.for_task(AdviceTask::AnswerQuestion);
        assert_eq!(answer.max_tokens, 50);
        assert_eq!(answer.timeout, Duration::from_secs(5));
        assert_eq!(answer.model.as_deref(), Some("gemma3"));

        let tips = config.for_task(AdviceTask::SavingTips);
        assert_eq!(tips.max_tokens, 800);
        assert_eq!(config.tasks.len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(parse_config("defaults = 3").is_err());
        assert!(parse_config("[defaults]\ntemperature = 9.0").is_err());
    }

    #[test]
    fn test_request_applies_sampling() {
        let config = AdvisorConfig::embedded().unwrap();
        let request = config.request(AdviceTask::BudgetInsights, "sys", "user");
        assert_eq!(request.temperature, 0.3);
        assert_eq!(request.max_tokens, 800);
        assert_eq!(request.system, "sys");
        assert!(request.model.is_none());
    }

    #[test]
    fn test_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("advisor.toml");
        fs::write(&path, "[tasks.saving_tips]\nmax_tokens = 64\n").unwrap();

        let config = AdvisorConfig::from_path(&path).unwrap();
        assert_eq!(config.for_task(AdviceTask::SavingTips).max_tokens, 64);

        let missing = AdvisorConfig::from_path(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing.for_task(AdviceTask::SavingTips).max_tokens, 1200);
    }

    #[test]
    fn test_with_timeout() {
        let config = AdvisorConfig::embedded()
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        assert_eq!(
            config.for_task(AdviceTask::CategorizeExpense).timeout,
            Duration::from_millis(50)
        );
    }
}
