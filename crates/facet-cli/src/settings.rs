//! `facetsync` settings, stored as TOML.
//!
//! The default location is the platform config directory:
//! - macOS: ~/Library/Application Support/dev.facetsync.facetsync/
//! - Windows: %APPDATA%/facetsync/facetsync/config/
//! - Linux: ~/.config/facetsync/
//!
//! A missing or unreadable file is never fatal: the defaults are used and
//! the problem is logged, the same way a malformed persisted entry falls
//! back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use facet_state::PanelConfig;
use facet_sync::SyncSettings;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "facetsync";
const APP_NAME: &str = "facetsync";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sync: SyncSettings,
    pub storage: StorageSettings,
    /// Extra panels, or replacements for built-in presets of the same name.
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file backing the `local` store. Without it the local store only
    /// lives for one run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_store_path: Option<PathBuf>,
}

impl Settings {
    /// Built-in presets with configured panels layered on top, by name.
    pub fn panels(&self) -> Vec<PanelConfig> {
        let mut panels = PanelConfig::presets();
        for configured in &self.panels {
            match panels.iter_mut().find(|p| p.name == configured.name) {
                Some(existing) => *existing = configured.clone(),
                None => panels.push(configured.clone()),
            }
        }
        panels
    }

    pub fn panel(&self, name: &str) -> Option<PanelConfig> {
        self.panels().into_iter().find(|panel| panel.name == name)
    }
}

/// Default settings file location, if the platform has one.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings from `path`, or from [`settings_path`] when `None`.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let Some(path) = path.map(Path::to_path_buf).or_else(settings_path) else {
        tracing::warn!("could not determine settings path, using defaults");
        return Settings::default();
    };

    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to parse settings, using defaults");
                Settings::default()
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "failed to read settings, using defaults");
            Settings::default()
        }
    }
}

/// Write settings as pretty TOML, creating the parent directory if needed.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write settings to {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}
