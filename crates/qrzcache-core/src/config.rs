//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the last used username and optional overrides for the
//! session file, export files, and service endpoint.
//!
//! Configuration is stored at `~/.config/qrzcache/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_ENDPOINT;
use crate::auth::DEFAULT_SESSION_FILE;
use crate::export::{DEFAULT_CSV_FILE, DEFAULT_JSON_FILE};

/// Application name used for the config directory path
const APP_NAME: &str = "qrzcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub last_username: Option<String>,
    pub session_file: Option<PathBuf>,
    pub csv_file: Option<PathBuf>,
    pub json_file: Option<PathBuf>,
    pub endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn session_file(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
    }

    pub fn csv_file(&self) -> PathBuf {
        self.csv_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_FILE))
    }

    pub fn json_file(&self) -> PathBuf {
        self.json_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSON_FILE))
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}
