//! Configuration loading, validation, and management for RecallKit.
//!
//! Loads configuration from `~/.recallkit/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.recallkit/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model profile used when no model is given on the command line
    #[serde(default = "default_model")]
    pub default_model: String,

    /// How the token budget is planned
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Candidate scoring
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Final ordering of the window
    #[serde(default)]
    pub window: WindowConfig,

    /// Text rendering of the window
    #[serde(default)]
    pub format: FormatConfig,

    /// Session bootstrap digest
    #[serde(default)]
    pub digest: DigestConfig,
}

fn default_model() -> String {
    "default".into()
}
fn default_true() -> bool {
    true
}

/// Which budget planner strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStrategy {
    /// Look the model up in the named profile table
    #[default]
    Profile,
    /// Split `total` by the configured ratios
    Fixed,
    /// Split `total` in proportion to candidate counts
    Adaptive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default)]
    pub strategy: BudgetStrategy,

    #[serde(default = "default_total")]
    pub total: usize,

    #[serde(default = "default_system_prompt_reserve")]
    pub system_prompt_reserve: usize,

    #[serde(default = "default_response_reserve")]
    pub response_reserve: usize,

    #[serde(default)]
    pub ratios: RatioConfig,
}

fn default_total() -> usize {
    128_000
}
fn default_system_prompt_reserve() -> usize {
    2_000
}
fn default_response_reserve() -> usize {
    4_000
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            strategy: BudgetStrategy::default(),
            total: default_total(),
            system_prompt_reserve: default_system_prompt_reserve(),
            response_reserve: default_response_reserve(),
            ratios: RatioConfig::default(),
        }
    }
}

/// Share of the available budget per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioConfig {
    #[serde(default = "default_conversation_ratio")]
    pub conversation: f64,
    #[serde(default = "default_memory_ratio")]
    pub memory: f64,
    #[serde(default = "default_lesson_ratio")]
    pub lesson: f64,
    #[serde(default = "default_entity_ratio")]
    pub entity: f64,
}

fn default_conversation_ratio() -> f64 {
    0.4
}
fn default_memory_ratio() -> f64 {
    0.3
}
fn default_lesson_ratio() -> f64 {
    0.2
}
fn default_entity_ratio() -> f64 {
    0.1
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            conversation: default_conversation_ratio(),
            memory: default_memory_ratio(),
            lesson: default_lesson_ratio(),
            entity: default_entity_ratio(),
        }
    }
}

impl RatioConfig {
    pub fn sum(&self) -> f64 {
        self.conversation + self.memory + self.lesson + self.entity
    }

    fn values(&self) -> [(&'static str, f64); 4] {
        [
            ("conversation", self.conversation),
            ("memory", self.memory),
            ("lesson", self.lesson),
            ("entity", self.entity),
        ]
    }
}

/// Which token estimator to use when a record has no token count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// ~4 characters per token
    #[default]
    Chars,
    /// ~0.75 words per token
    Words,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_importance_weight")]
    pub importance_weight: f64,

    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    #[serde(default)]
    pub estimator: EstimatorKind,
}

fn default_importance_weight() -> f64 {
    0.7
}
fn default_recency_weight() -> f64 {
    0.3
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            importance_weight: default_importance_weight(),
            recency_weight: default_recency_weight(),
            estimator: EstimatorKind::default(),
        }
    }
}

/// Final ordering of the selected items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangementKind {
    /// Important items at both ends, the rest in the middle
    #[default]
    LostInMiddle,
    /// Oldest first
    Chronological,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default)]
    pub arrangement: ArrangementKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    #[serde(default = "default_true")]
    pub group_by_category: bool,

    #[serde(default)]
    pub include_metadata: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            group_by_category: true,
            include_metadata: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Budget in tokens; the digest works in characters (×4)
    #[serde(default = "default_digest_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_true")]
    pub include_last_session: bool,

    #[serde(default = "default_top_memories")]
    pub top_memories: usize,

    /// Memories carrying any of these tags are always listed first
    #[serde(default = "default_always_include_tags")]
    pub always_include_tags: Vec<String>,

    #[serde(default = "default_recency_bias")]
    pub recency_bias: f64,
}

fn default_digest_max_tokens() -> usize {
    2_000
}
fn default_top_memories() -> usize {
    10
}
fn default_always_include_tags() -> Vec<String> {
    vec!["core".into(), "preference".into()]
}
fn default_recency_bias() -> f64 {
    0.3
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_digest_max_tokens(),
            include_last_session: true,
            top_memories: default_top_memories(),
            always_include_tags: default_always_include_tags(),
            recency_bias: default_recency_bias(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.recallkit/config.toml).
    ///
    /// Environment overrides:
    /// - `RECALLKIT_MODEL` replaces `default_model`
    /// - `RECALLKIT_TOTAL_TOKENS` replaces `budget.total`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("RECALLKIT_MODEL") {
            config.default_model = model;
        }

        if let Ok(total) = std::env::var("RECALLKIT_TOTAL_TOKENS") {
            config.budget.total = total.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "RECALLKIT_TOTAL_TOKENS must be a non-negative integer, got {total:?}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".recallkit")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, ratio) in self.budget.ratios.values() {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "budget.ratios.{name} must be a non-negative number"
                )));
            }
        }

        if self.budget.ratios.sum() > 1.0 + 1e-9 {
            return Err(ConfigError::ValidationError(
                "budget.ratios must sum to at most 1.0".into(),
            ));
        }

        let weights = [
            ("importance_weight", self.selection.importance_weight),
            ("recency_weight", self.selection.recency_weight),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "selection.{name} must be a non-negative number"
                )));
            }
        }

        let bias = self.digest.recency_bias;
        if !(0.0..=1.0).contains(&bias) {
            return Err(ConfigError::ValidationError(
                "digest.recency_bias must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            budget: BudgetConfig::default(),
            selection: SelectionConfig::default(),
            window: WindowConfig::default(),
            format: FormatConfig::default(),
            digest: DigestConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_model, "default");
        assert_eq!(config.budget.total, 128_000);
        assert_eq!(config.budget.strategy, BudgetStrategy::Profile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.digest.always_include_tags, config.digest.always_include_tags);
    }

    #[test]
    fn ratios_above_one_rejected() {
        let mut config = AppConfig::default();
        config.budget.ratios.conversation = 0.9;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 1.0"));
    }

    #[test]
    fn negative_weight_rejected() {
        let mut config = AppConfig::default();
        config.selection.recency_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn recency_bias_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.digest.recency_bias = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.selection.estimator, EstimatorKind::Chars);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "gpt-4"

[budget]
strategy = "adaptive"

[window]
arrangement = "chronological"

[digest]
always_include_tags = ["pinned"]
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "gpt-4");
        assert_eq!(config.budget.strategy, BudgetStrategy::Adaptive);
        assert_eq!(config.budget.response_reserve, 4_000);
        assert_eq!(config.window.arrangement, ArrangementKind::Chronological);
        assert_eq!(config.digest.always_include_tags, vec!["pinned".to_string()]);
        assert_eq!(config.digest.top_memories, 10);
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[budget\ntotal = ").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("lost_in_middle"));
        assert!(toml_str.contains("128000"));
    }
}
