//! Configuration Management
//!
//! Persistent defaults for iww, read from `<config_dir>/iww/config.json`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment fallback for the default region
pub const REGION_ENV: &str = "IBMCLOUD_REGION";

/// Environment fallback for the default resource group
pub const GROUP_ENV: &str = "IBMCLOUD_RESOURCE_GROUP";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Default region filter
    #[serde(default)]
    pub region: Option<String>,
    /// Default resource group name
    #[serde(default)]
    pub resource_group: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("iww").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Get effective region (CLI > config > environment)
    pub fn effective_region(&self, cli: Option<String>) -> Option<String> {
        non_empty(cli)
            .or_else(|| non_empty(self.region.clone()))
            .or_else(|| non_empty(std::env::var(REGION_ENV).ok()))
    }

    /// Get effective resource group name (CLI > config > environment)
    pub fn effective_group(&self, cli: Option<String>) -> Option<String> {
        non_empty(cli)
            .or_else(|| non_empty(self.resource_group.clone()))
            .or_else(|| non_empty(std::env::var(GROUP_ENV).ok()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
