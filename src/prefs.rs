//! Persisted user preferences: a small JSON file beside the database. A
//! missing or unreadable file means defaults; toggles write back immediately.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings file name inside the application data directory.
const PREFS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Sort direction of the list screen: latest edit date on top when true.
    pub newest_first: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { newest_first: true }
    }
}

impl Preferences {
    /// Load preferences from the data directory, falling back to defaults
    /// when the file is absent or unreadable.
    pub fn load(dir: &Path) -> Self {
        let path = prefs_path(dir);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "unreadable settings file, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Write the current preferences back to the data directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize preferences")?;
        fs::write(prefs_path(dir), raw).context("failed to write settings file")?;
        Ok(())
    }

    /// Flip the sort direction and persist it, returning the new value.
    pub fn toggle_newest_first(&mut self, dir: &Path) -> Result<bool> {
        self.newest_first = !self.newest_first;
        self.save(dir)?;
        Ok(self.newest_first)
    }
}

fn prefs_path(dir: &Path) -> PathBuf {
    dir.join(PREFS_FILE_NAME)
}
