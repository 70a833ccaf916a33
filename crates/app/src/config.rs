use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::MatcherConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            matcher: MatcherConfig::default(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "tally", "Tally")
}

fn default_ledger_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("ledger.json"))
        .unwrap_or_else(|| PathBuf::from("ledger.json"))
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(s).context("parse config.toml")?;
    cfg.matcher.validate().context("invalid [matcher] section")?;
    Ok(cfg)
}

/// An explicitly requested file must exist; the default location falls back
/// to built-in settings when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(AppConfig::default()),
        },
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("load {}", p.display()))
}
