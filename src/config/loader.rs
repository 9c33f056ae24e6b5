//! Configuration Loader
//!
//! Merges settings from default locations and environment overrides.

use crate::config::settings::{Settings, SettingsOverlay};
use crate::error::{OctowireError, Result};
use crate::graph::ResolutionMode;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "OCTOWIRE_CONFIG_PATH";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const BASE_URL_ENV: &str = "OCTOWIRE_BASE_URL";
pub const RESOLUTION_MODE_ENV: &str = "OCTOWIRE_RESOLUTION_MODE";

/// Configuration loader with support for multiple sources
pub struct ConfigLoader {
    settings: Settings,
}

impl ConfigLoader {
    /// Load defaults, every existing default path, then environment overrides
    pub fn new() -> Result<Self> {
        let mut loader = Self {
            settings: Settings::default(),
        };

        for path in Self::get_config_paths() {
            if path.exists() {
                loader.load_from_file(&path)?;
            }
        }

        loader.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(loader)
    }

    /// Load defaults and one explicit file, without environment overrides
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            settings: Settings::default(),
        };
        loader.load_from_file(path)?;
        Ok(loader)
    }

    /// Get list of config paths to check
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(custom_path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(custom_path));
        }

        paths.push(PathBuf::from("octowire.json"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("octowire").join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".octowire").join("config.json"));
        }

        paths
    }

    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            OctowireError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let overlay: SettingsOverlay = serde_json::from_str(&content).map_err(|e| {
            OctowireError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        self.settings.merge(overlay);
        Ok(())
    }

    /// Apply environment overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.settings.credentials.token = Some(token);
        }

        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            self.settings.base_url = base_url;
        }

        if let Some(mode) = lookup(RESOLUTION_MODE_ENV) {
            self.settings.resolution_mode = parse_resolution_mode(&mode)?;
        }

        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }
}

fn parse_resolution_mode(value: &str) -> Result<ResolutionMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(ResolutionMode::Strict),
        "lenient" => Ok(ResolutionMode::Lenient),
        other => Err(OctowireError::Config(format!(
            "Unknown resolution mode '{}', expected 'strict' or 'lenient'",
            other
        ))),
    }
}
