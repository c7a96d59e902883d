// Gurukul - School Video Learning Portal
// Copyright (C) 2025 Gurukul contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Host bridge configuration.
//!
//! One explicit struct owns what used to be ambient process state: the
//! user-configurable download directory, the kiosk flag, and whether the
//! shell is running from a portable (removable-media) location. The
//! download path is persisted to `preferences.json` under the app data
//! directory, and the default location moves next to the executable when
//! portable so videos travel with the drive.

use crate::error::{GurukulError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted preferences file name, stored in the app data directory
const PREFERENCES_FILE: &str = "preferences.json";

/// Subdirectory holding downloaded videos
const VIDEOS_DIR: &str = "videos";

/// Persisted shell preferences (`preferences.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "downloadPath")]
    pub download_path: PathBuf,
}

/// Explicit configuration owned by the host bridge.
///
/// Constructed once at startup and shared by the bridge handlers; reads of
/// the download path always reflect the most recently completed write.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// App data directory (preferences live here; default videos dir too)
    app_dir: PathBuf,
    /// User-selected download directory, when one was configured
    download_path: Option<PathBuf>,
    /// TV/kiosk mode: window resize notifications are suppressed
    pub kiosk_mode: bool,
    /// Running from a portable location (e.g. a USB drive)
    pub portable: bool,
}

impl BridgeConfig {
    /// Create a configuration rooted at the platform app data directory,
    /// probing the executable location for portable mode.
    pub fn new(app_name: &str) -> Self {
        let portable = detect_portable_mode();
        let app_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app_name);

        Self {
            app_dir,
            download_path: None,
            kiosk_mode: false,
            portable,
        }
    }

    /// Create a configuration rooted at an explicit directory (tests, or
    /// shells that manage their own data dir)
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            download_path: None,
            kiosk_mode: false,
            portable: false,
        }
    }

    /// Path of the persisted preferences file
    pub fn preferences_path(&self) -> PathBuf {
        self.app_dir.join(PREFERENCES_FILE)
    }

    /// Default download directory: next to the executable when portable,
    /// under the app data directory otherwise
    pub fn default_download_path(&self) -> PathBuf {
        if self.portable {
            if let Ok(exe) = std::env::current_exe() {
                if let Some(dir) = exe.parent() {
                    return dir.join(VIDEOS_DIR);
                }
            }
        }
        self.app_dir.join(VIDEOS_DIR)
    }

    /// Current effective download directory (custom or default)
    pub fn effective_download_path(&self) -> PathBuf {
        self.download_path
            .clone()
            .unwrap_or_else(|| self.default_download_path())
    }

    /// Record a new custom download directory in memory only
    pub fn set_download_path(&mut self, path: PathBuf) {
        self.download_path = Some(path);
    }

    /// Load persisted preferences, falling back to the default location.
    ///
    /// A persisted path that no longer exists is ignored rather than
    /// resurrected. The effective directory is created if missing.
    pub async fn load_preferences(&mut self) -> Result<Preferences> {
        let prefs_path = self.preferences_path();

        if let Ok(data) = tokio::fs::read_to_string(&prefs_path).await {
            match serde_json::from_str::<Preferences>(&data) {
                Ok(prefs) if prefs.download_path.exists() => {
                    self.download_path = Some(prefs.download_path.clone());
                    ensure_dir(&prefs.download_path).await?;
                    return Ok(prefs);
                }
                Ok(_) => {
                    warn!(path = %prefs_path.display(), "persisted download path missing, using default");
                }
                Err(e) => {
                    warn!(path = %prefs_path.display(), error = %e, "unreadable preferences file, using default");
                }
            }
        }

        let default = self.default_download_path();
        ensure_dir(&default).await?;
        Ok(Preferences {
            download_path: default,
        })
    }

    /// Persist the current custom download path to `preferences.json`
    pub async fn persist_preferences(&self) -> Result<()> {
        let prefs = Preferences {
            download_path: self.effective_download_path(),
        };
        ensure_dir(&self.app_dir).await?;
        let json = serde_json::to_string_pretty(&prefs)?;
        tokio::fs::write(self.preferences_path(), json)
            .await
            .map_err(|e| GurukulError::FileIoError(format!("Failed to write preferences: {e}")))?;
        Ok(())
    }
}

/// Create a directory and its parents if missing
pub(crate) async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            GurukulError::FileIoError(format!(
                "Failed to create directory {}: {e}",
                path.display()
            ))
        })?;
    }
    Ok(())
}

/// Heuristic portable-mode detection: the executable lives outside the
/// platform's standard install locations.
fn detect_portable_mode() -> bool {
    let Ok(exe) = std::env::current_exe() else {
        return false;
    };
    let path = exe.to_string_lossy();

    #[cfg(target_os = "windows")]
    {
        !path.contains("Program Files") && !path.contains("AppData")
    }

    #[cfg(not(target_os = "windows"))]
    {
        !path.contains("/Applications") && !path.contains("/usr")
    }
}
