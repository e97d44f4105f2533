//! Persisted user settings read from the config directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tracks shorter than this are ignored; 0 disables the filter
    pub min_duration_minutes: u32,
}

impl Settings {
    /// Load `settings.json` from `config_dir`. A missing file means defaults.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn min_duration_sec(&self) -> f64 {
        f64::from(self.min_duration_minutes) * 60.0
    }
}
