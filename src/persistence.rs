use bevy::prelude::{DetectChanges, Res, Resource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_SIMULATED_VEHICLES;
use crate::error::SettingsError;
use crate::panel::BindPolicy;

fn default_auto_scroll() -> bool {
    true
}

fn default_simulated_vehicles() -> Vec<String> {
    DEFAULT_SIMULATED_VEHICLES
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct PanelSettings {
    // What the panel does when the operator picks another vehicle
    #[serde(default)]
    pub bind_policy: BindPolicy,

    #[serde(default = "default_auto_scroll")]
    pub auto_scroll_log: bool,

    // Names of the simulated vehicles registered at startup
    #[serde(default = "default_simulated_vehicles")]
    pub simulated_vehicles: Vec<String>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            bind_policy: BindPolicy::default(),
            auto_scroll_log: default_auto_scroll(),
            simulated_vehicles: default_simulated_vehicles(),
        }
    }
}

impl PanelSettings {
    /// Get the path to the settings file
    fn settings_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("mode_control_panel").join("settings.json")
    }

    /// Load settings from disk, or use defaults if the file is missing or broken
    pub fn load() -> Self {
        let path = Self::settings_path();

        match Self::load_from_file(&path) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no settings file found, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to_file(Self::settings_path())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// True when the settings were edited after being inserted
fn needs_save(settings: &impl DetectChanges) -> bool {
    settings.is_changed() && !settings.is_added()
}

/// System that automatically saves settings when they change
pub fn auto_save_system(settings: Res<PanelSettings>) {
    if needs_save(&settings)
        && let Err(e) = settings.save()
    {
        tracing::warn!(error = %e, "failed to auto-save settings");
    }
}
