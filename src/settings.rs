// Persisted settings
//
// Connection parameters, mount mapping, capture-time override, and the
// last-used folder list. Loaded tolerantly at startup: a missing file is the
// expected default, a corrupt file is logged and replaced by defaults.
// Saved by overwriting the whole file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{LEDGER_FILENAME, SETTINGS_FILENAME};
use crate::error::{Result, ThumbError};
use crate::mapping::PathMapping;
use crate::remote::ConnectionParams;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connection: ConnectionParams,
    pub mapping: PathMapping,
    /// Capture time in seconds, kept as entered; blank or non-numeric means
    /// "use the middle of the video" (see extract::select_capture_time).
    pub capture_time: Option<String>,
    /// Last-used folder list.
    pub folders: Vec<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!(
                        "Settings at {} are corrupt ({}), using defaults",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!(
                    "Cannot read settings at {} ({}), using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ThumbError::Settings(format!("{}: {}", parent.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| ThumbError::Settings(e.to_string()))?;
        std::fs::write(path, text)
            .map_err(|e| ThumbError::Settings(format!("{}: {}", path.display(), e)))
    }
}

fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", "synothumb")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join(SETTINGS_FILENAME)
}

pub fn default_ledger_path() -> PathBuf {
    config_dir().join(LEDGER_FILENAME)
}
