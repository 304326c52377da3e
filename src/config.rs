//! Configuration management for cardfill
//!
//! Handles prompt limits and persistence of user preferences.

use crate::batching::OversizePolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default prompt budget in characters
pub const DEFAULT_MAX_PROMPT_SIZE: usize = 100_000;
/// Default number of example notes per prompt
pub const DEFAULT_MAX_EXAMPLES: usize = 3;

/// cardfill configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Maximum prompt size in characters
    pub max_prompt_size: usize,
    /// Maximum number of example notes included in a prompt
    pub max_examples: usize,
    /// What to do with a note that does not fit a prompt on its own
    pub oversize_policy: OversizePolicy,
    /// Per-field instructions (field name -> instruction)
    pub field_instructions: BTreeMap<String, String>,
    /// Version of config schema (for future migrations)
    pub version: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_prompt_size: DEFAULT_MAX_PROMPT_SIZE,
            max_examples: DEFAULT_MAX_EXAMPLES,
            oversize_policy: OversizePolicy::default(),
            field_instructions: BTreeMap::new(),
            version: 1,
        }
    }
}

impl Config {
    /// Get the config file path (~/.cardfill/config.toml)
    pub fn path() -> Result<PathBuf> {
        Ok(cardfill_dir()?.join("config.toml"))
    }

    /// Check if config exists (i.e., not first run)
    pub fn exists() -> bool {
        Self::path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load config from disk, or return None if it doesn't exist
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    /// Load config from disk, falling back to defaults
    pub fn load_or_default() -> Result<Self> {
        Ok(Self::load()?.unwrap_or_default())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        if config.max_prompt_size == 0 {
            warn!("max_prompt_size is 0; every note will be reported as too large");
        }
        Ok(Some(config))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// Get the base cardfill directory path (~/.cardfill)
pub fn cardfill_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".cardfill"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_prompt_size, 100_000);
        assert_eq!(config.max_examples, 3);
        assert_eq!(config.oversize_policy, OversizePolicy::StopRun);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.oversize_policy = OversizePolicy::SkipNote;
        config
            .field_instructions
            .insert("Back".to_string(), "Translate to English".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("oversize_policy = \"skip-note\""));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("max_prompt_size = 5000").unwrap();
        assert_eq!(parsed.max_prompt_size, 5000);
        assert_eq!(parsed.max_examples, DEFAULT_MAX_EXAMPLES);
        assert_eq!(parsed.version, 1);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::load_from(&path).unwrap().is_none());

        let config = Config {
            max_prompt_size: 9_500,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_prompt_size = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
