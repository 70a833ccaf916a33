use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::column::TargetColumn;

pub const DEFAULT_THRESHOLD: u8 = 75;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u8),
    #[error("Target column listed more than once: {0}")]
    DuplicateTarget(TargetColumn),
    #[error("Target column not configured: {0}")]
    MissingTarget(TargetColumn),
}

/// A canonical column together with the extra header names it is scored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub column: TargetColumn,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl TargetSpec {
    pub fn new(column: TargetColumn, aliases: &[&str]) -> Self {
        TargetSpec {
            column,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.column.canonical_name()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Column-matching settings. Targets are matched in the order listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default = "default_targets")]
    pub targets: Vec<TargetSpec>,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_targets() -> Vec<TargetSpec> {
    vec![
        TargetSpec::new(
            TargetColumn::Date,
            &[
                "trans date",
                "transaction date",
                "posted date",
                "posting date",
                "post date",
            ],
        ),
        TargetSpec::new(TargetColumn::Amount, &["amt", "transaction amount"]),
        TargetSpec::new(TargetColumn::Category, &["cat"]),
        TargetSpec::new(
            TargetColumn::Description,
            &["desc", "memo", "details", "payee", "narrative"],
        ),
    ]
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            targets: default_targets(),
        }
    }
}

impl MatcherConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: MatcherConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every target must be listed exactly once and the threshold must be a percentage.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold > 100 {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold));
        }
        let mut seen = HashSet::new();
        for spec in &self.targets {
            if !seen.insert(spec.column) {
                return Err(ConfigError::DuplicateTarget(spec.column));
            }
        }
        for column in TargetColumn::ALL {
            if !seen.contains(&column) {
                return Err(ConfigError::MissingTarget(column));
            }
        }
        Ok(())
    }
}
