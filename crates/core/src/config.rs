//! Configuration file parsing for .structlens.toml

use crate::resolve::{IgnoreSet, ResolutionMode, DEFAULT_IGNORED_CALLEES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up from the working directory upward
pub const CONFIG_FILE_NAME: &str = ".structlens.toml";

/// Environment variable that forces light call-graph mode when `1` or `true`
pub const LIGHT_MODE_ENV: &str = "CALL_GRAPH_LIGHT_MODE";

/// Main configuration structure for .structlens.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructlensConfig {
    #[serde(default)]
    pub callgraph: CallgraphConfig,

    #[serde(default)]
    pub diff: DiffConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallgraphConfig {
    /// Use syntactic resolution only
    #[serde(default)]
    pub light_mode: bool,

    /// Replaces the built-in ignore list when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_callees: Option<Vec<String>>,

    /// Appended to the ignore list
    #[serde(default)]
    pub extra_ignored_callees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Default output format
    #[serde(default)]
    pub format: DiffFormat,
}

/// Output format of the diff tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffFormat {
    #[default]
    Json,
    Markdown,
}

impl Default for CallgraphConfig {
    fn default() -> Self {
        Self {
            light_mode: false,
            ignored_callees: None,
            extra_ignored_callees: Vec::new(),
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            format: DiffFormat::Json,
        }
    }
}

impl CallgraphConfig {
    /// The ignore set this configuration describes
    pub fn ignore_set(&self) -> IgnoreSet {
        let mut set = match &self.ignored_callees {
            Some(names) => IgnoreSet::new(names.iter().cloned()),
            None => IgnoreSet::new(DEFAULT_IGNORED_CALLEES.iter().copied()),
        };
        set.extend(self.extra_ignored_callees.iter().cloned());
        set
    }

    /// Resolution mode, with the environment switch taking precedence
    pub fn resolution_mode(&self, env_value: Option<&str>) -> ResolutionMode {
        let forced = matches!(env_value.map(str::trim), Some("1") | Some("true"));
        if forced || self.light_mode {
            ResolutionMode::Light
        } else {
            ResolutionMode::Full
        }
    }
}

impl StructlensConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: StructlensConfig = toml::from_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Find and load .structlens.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> Result<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_forces_light_mode() {
        let config = CallgraphConfig::default();
        assert_eq!(config.resolution_mode(None), ResolutionMode::Full);
        assert_eq!(config.resolution_mode(Some("1")), ResolutionMode::Light);
        assert_eq!(config.resolution_mode(Some("true")), ResolutionMode::Light);
        assert_eq!(config.resolution_mode(Some("0")), ResolutionMode::Full);

        let configured = CallgraphConfig {
            light_mode: true,
            ..CallgraphConfig::default()
        };
        assert_eq!(configured.resolution_mode(Some("0")), ResolutionMode::Light);
    }
}
