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


//! Host bridge contract and its native implementation.
//!
//! [`HostBridge`] is the full capability surface of the desktop shell.
//! [`NativeHost`] implements the filesystem-facing half directly over
//! `tokio::fs`; interactive pieces (the directory picker) are injected by
//! the shell through [`FolderPicker`], and window notifications reduce to
//! in-process state plus log lines here.
//!
//! On-disk layout inside the download directory:
//!
//! ```text
//! <downloadDir>/<sanitizedTitle>_<videoId>.mp4   content file
//! <downloadDir>/<videoId>.json                   metadata sidecar
//! ```

use crate::bridge::config::{ensure_dir, BridgeConfig, Preferences};
use crate::error::{GurukulError, Result};
use async_trait::async_trait;
use base64::Engine;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Outcome of the native directory picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    Selected(PathBuf),
    Canceled,
}

/// Shell-provided directory picker.
///
/// The core has no UI; shells hand in their dialog implementation. Without
/// one, selection always reports [`FolderSelection::Canceled`].
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn pick_folder(&self) -> Result<FolderSelection>;
}

/// Request to persist a video's binary content on disk.
///
/// `video_data` is base64: the bridge boundary transports strings only.
#[derive(Debug, Clone)]
pub struct SaveVideoRequest {
    pub video_id: String,
    pub title: String,
    /// Base64-encoded binary payload
    pub video_data: String,
    /// Metadata written verbatim to the sidecar file
    pub metadata: serde_json::Value,
}

/// Result of a successful [`HostBridge::save_video_file`]
#[derive(Debug, Clone)]
pub struct SavedVideoFile {
    pub file_path: PathBuf,
    pub filename: String,
}

/// Privileged capability surface exposed by the desktop shell.
///
/// Presence of an implementation selects the filesystem storage backend;
/// callers must hold an `Option<Arc<dyn HostBridge>>` and treat `None` as
/// "browser-style environment", never call-and-catch.
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Current effective download directory (created if missing)
    async fn get_download_path(&self) -> Result<PathBuf>;

    /// Validate writability, persist and switch to a new download directory
    async fn set_download_path(&self, path: &Path) -> Result<PathBuf>;

    /// Open the native directory picker and adopt the chosen directory
    async fn select_download_folder(&self) -> Result<FolderSelection>;

    /// Load persisted configuration, falling back to the platform default
    async fn load_preferences(&self) -> Result<Preferences>;

    /// Write the content file and its metadata sidecar.
    ///
    /// The two writes are not atomic with each other: a crash in between
    /// leaves an orphaned content file with no sidecar.
    async fn save_video_file(&self, request: SaveVideoRequest) -> Result<SavedVideoFile>;

    /// Scan the download directory for the first `.mp4` whose filename
    /// contains the identifier
    async fn get_video_file_path(&self, video_id: &str) -> Result<Option<PathBuf>>;

    /// Reveal the download directory in the OS file browser
    async fn open_download_folder(&self) -> Result<()>;

    /// One-way notification: a video finished downloading (window resize hint)
    fn on_video_downloaded(&self, video_id: &str, title: &str);

    /// One-way notification: the player view was closed (window restore hint)
    fn on_video_player_closed(&self);

    /// Toggle fullscreen/kiosk presentation; returns the new state
    async fn toggle_fullscreen(&self) -> bool;
}

/// Native bridge implementation backed by the local filesystem
pub struct NativeHost {
    config: RwLock<BridgeConfig>,
    picker: Option<Box<dyn FolderPicker>>,
    fullscreen: AtomicBool,
}

impl NativeHost {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config: RwLock::new(config),
            picker: None,
            fullscreen: AtomicBool::new(false),
        }
    }

    /// Attach the shell's directory picker dialog
    pub fn with_picker(mut self, picker: Box<dyn FolderPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Content filename: sanitized title joined with the video id.
    ///
    /// Every character outside `[A-Za-z0-9]` collapses to `_`, so the id
    /// suffix stays scannable regardless of the title.
    pub fn video_filename(title: &str, video_id: &str) -> String {
        static SANITIZER: OnceLock<Regex> = OnceLock::new();
        let sanitizer = SANITIZER.get_or_init(|| Regex::new(r"[^A-Za-z0-9]").unwrap());
        format!("{}_{}.mp4", sanitizer.replace_all(title, "_"), video_id)
    }

    async fn adopt_path(&self, path: PathBuf) -> Result<PathBuf> {
        let mut config = self.config.write().await;
        config.set_download_path(path.clone());
        ensure_dir(&path).await?;
        config.persist_preferences().await?;
        Ok(path)
    }

    /// Writability probe: try to create and remove a marker file
    async fn check_writable(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(GurukulError::InvalidPath(format!(
                "Not a directory: {}",
                path.display()
            )));
        }
        let probe = path.join(".gurukul-write-check");
        tokio::fs::write(&probe, b"")
            .await
            .map_err(|e| GurukulError::InvalidPath(format!("{}: {e}", path.display())))?;
        let _ = tokio::fs::remove_file(&probe).await;
        Ok(())
    }
}

#[async_trait]
impl HostBridge for NativeHost {
    async fn get_download_path(&self) -> Result<PathBuf> {
        let path = self.config.read().await.effective_download_path();
        ensure_dir(&path).await?;
        Ok(path)
    }

    async fn set_download_path(&self, path: &Path) -> Result<PathBuf> {
        Self::check_writable(path).await?;
        self.adopt_path(path.to_path_buf()).await
    }

    async fn select_download_folder(&self) -> Result<FolderSelection> {
        let Some(picker) = &self.picker else {
            return Ok(FolderSelection::Canceled);
        };

        match picker.pick_folder().await? {
            FolderSelection::Selected(path) => {
                let adopted = self.adopt_path(path).await?;
                Ok(FolderSelection::Selected(adopted))
            }
            FolderSelection::Canceled => Ok(FolderSelection::Canceled),
        }
    }

    async fn load_preferences(&self) -> Result<Preferences> {
        self.config.write().await.load_preferences().await
    }

    async fn save_video_file(&self, request: SaveVideoRequest) -> Result<SavedVideoFile> {
        let dir = self.get_download_path().await?;

        let filename = Self::video_filename(&request.title, &request.video_id);
        let file_path = dir.join(&filename);

        let bytes = base64::engine::general_purpose::STANDARD.decode(&request.video_data)?;
        tokio::fs::write(&file_path, &bytes)
            .await
            .map_err(|e| GurukulError::FileIoError(format!("{}: {e}", file_path.display())))?;

        // Sidecar is written second; the pair is not atomic
        let sidecar_path = dir.join(format!("{}.json", request.video_id));
        let json = serde_json::to_string_pretty(&request.metadata)?;
        tokio::fs::write(&sidecar_path, json)
            .await
            .map_err(|e| GurukulError::FileIoError(format!("{}: {e}", sidecar_path.display())))?;

        info!(video_id = %request.video_id, path = %file_path.display(), "video saved to disk");

        Ok(SavedVideoFile {
            file_path,
            filename,
        })
    }

    async fn get_video_file_path(&self, video_id: &str) -> Result<Option<PathBuf>> {
        let dir = self.config.read().await.effective_download_path();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "cannot read download directory");
                return Ok(None);
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| GurukulError::FileIoError(format!("{}: {e}", dir.display())))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.contains(video_id) && name.ends_with(".mp4") {
                return Ok(Some(entry.path()));
            }
        }

        Ok(None)
    }

    async fn open_download_folder(&self) -> Result<()> {
        let dir = self.get_download_path().await?;

        #[cfg(target_os = "macos")]
        let opener = "open";
        #[cfg(target_os = "windows")]
        let opener = "explorer";
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let opener = "xdg-open";

        std::process::Command::new(opener)
            .arg(&dir)
            .spawn()
            .map_err(|e| GurukulError::FileIoError(format!("Failed to open {}: {e}", dir.display())))?;
        Ok(())
    }

    fn on_video_downloaded(&self, video_id: &str, title: &str) {
        debug!(video_id, title, "video downloaded; shell may resize for playback");
    }

    fn on_video_player_closed(&self) {
        debug!("player closed; shell may restore window size");
    }

    async fn toggle_fullscreen(&self) -> bool {
        let was = self.fullscreen.fetch_xor(true, Ordering::SeqCst);
        !was
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn host_in(temp: &TempDir) -> NativeHost {
        NativeHost::new(BridgeConfig::with_app_dir(temp.path()))
    }

    #[test]
    fn test_video_filename_sanitizes_title() {
        assert_eq!(
            NativeHost::video_filename("Algebra: Chapter 1!", "abc123"),
            "Algebra__Chapter_1__abc123.mp4"
        );
        assert_eq!(
            NativeHost::video_filename("Plain", "v9"),
            "Plain_v9.mp4"
        );
    }

    #[tokio::test]
    async fn test_save_writes_content_and_sidecar() {
        let temp = TempDir::new().unwrap();
        let host = host_in(&temp);

        let payload = b"fake mp4 bytes".to_vec();
        let request = SaveVideoRequest {
            video_id: "vid42".to_string(),
            title: "Science Lab".to_string(),
            video_data: base64::engine::general_purpose::STANDARD.encode(&payload),
            metadata: serde_json::json!({ "title": "Science Lab", "videoId": "vid42" }),
        };

        let saved = host.save_video_file(request).await.unwrap();
        assert_eq!(saved.filename, "Science_Lab_vid42.mp4");
        assert_eq!(tokio::fs::read(&saved.file_path).await.unwrap(), payload);

        let sidecar = saved.file_path.parent().unwrap().join("vid42.json");
        let meta: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(sidecar).await.unwrap()).unwrap();
        assert_eq!(meta["videoId"], "vid42");
    }

    #[tokio::test]
    async fn test_file_path_scan_matches_by_id() {
        let temp = TempDir::new().unwrap();
        let host = host_in(&temp);
        let dir = host.get_download_path().await.unwrap();

        tokio::fs::write(dir.join("Maths_Intro_v1.mp4"), b"a").await.unwrap();
        tokio::fs::write(dir.join("v1.json"), b"{}").await.unwrap();
        tokio::fs::write(dir.join("notes_v1.txt"), b"b").await.unwrap();

        let found = host.get_video_file_path("v1").await.unwrap();
        assert_eq!(found, Some(dir.join("Maths_Intro_v1.mp4")));
        assert_eq!(host.get_video_file_path("v2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_download_path_rejects_missing_dir() {
        let temp = TempDir::new().unwrap();
        let host = host_in(&temp);

        let result = host
            .set_download_path(Path::new("/definitely/not/here"))
            .await;
        assert!(matches!(result, Err(GurukulError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_select_folder_without_picker_cancels() {
        let temp = TempDir::new().unwrap();
        let host = host_in(&temp);
        assert_eq!(
            host.select_download_folder().await.unwrap(),
            FolderSelection::Canceled
        );
    }

    #[tokio::test]
    async fn test_toggle_fullscreen_flips_state() {
        let temp = TempDir::new().unwrap();
        let host = host_in(&temp);
        assert!(host.toggle_fullscreen().await);
        assert!(!host.toggle_fullscreen().await);
    }
}
