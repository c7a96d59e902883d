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


//! Filesystem storage backend.
//!
//! Persists each video as a plain `.mp4` next to a `<videoId>.json`
//! metadata sidecar in the user-configurable download directory, reached
//! through the host bridge. Binary content crosses the bridge
//! base64-encoded.
//!
//! Known gaps carried over from the shipped desktop behavior:
//!
//! - `save` is two separate writes (content, then sidecar) with no
//!   atomicity between them.
//! - `delete` removes only the sidecar; the content file stays on disk
//!   and is invisible to `get` afterwards.
//! - `get_all` has no implementation. Library views in bridge
//!   environments list videos from the backend catalog instead.

use crate::bridge::{HostBridge, SaveVideoRequest};
use crate::error::{GurukulError, Result};
use crate::store::record::DownloadedVideoRecord;
use crate::store::{OfflineStore, StorageBackend};
use async_trait::async_trait;
use base64::Engine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Offline store backed by the local filesystem through the host bridge
pub struct FilesystemStore {
    bridge: Arc<dyn HostBridge>,
    initialized: AtomicBool,
}

impl FilesystemStore {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self {
            bridge,
            initialized: AtomicBool::new(false),
        }
    }

    fn require_initialized(&self) -> Result<()> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GurukulError::StorageUnavailable)
        }
    }

    async fn sidecar_path(&self, video_id: &str) -> Result<std::path::PathBuf> {
        let dir = self.bridge.get_download_path().await?;
        Ok(dir.join(format!("{video_id}.json")))
    }
}

#[async_trait]
impl OfflineStore for FilesystemStore {
    async fn initialize(&self) -> Result<()> {
        // Resolves the download directory from persisted preferences and
        // creates it if missing
        self.bridge
            .load_preferences()
            .await
            .map_err(|e| GurukulError::storage("initialize", e))?;
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn save(&self, record: &DownloadedVideoRecord) -> Result<()> {
        self.require_initialized()?;
        let data = record
            .video_data
            .as_deref()
            .ok_or_else(|| GurukulError::storage("save", "record carries no binary content"))?;

        let request = SaveVideoRequest {
            video_id: record.video_id.clone(),
            title: record.title.clone(),
            video_data: base64::engine::general_purpose::STANDARD.encode(data),
            metadata: record.metadata_json(),
        };

        let saved = self
            .bridge
            .save_video_file(request)
            .await
            .map_err(|e| GurukulError::storage("save", e))?;

        debug!(video_id = %record.video_id, filename = %saved.filename, "record saved to filesystem");
        Ok(())
    }

    async fn get(&self, video_id: &str) -> Result<Option<DownloadedVideoRecord>> {
        self.require_initialized()?;
        let sidecar = self.sidecar_path(video_id).await?;

        let json = match tokio::fs::read_to_string(&sidecar).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GurukulError::storage("get", e)),
        };

        let record: DownloadedVideoRecord =
            serde_json::from_str(&json).map_err(|e| GurukulError::storage("get", e))?;

        // Binary content stays on disk; players reach it through
        // resolve_playback_url
        Ok(Some(record))
    }

    async fn get_all(&self) -> Result<Vec<DownloadedVideoRecord>> {
        self.require_initialized()?;
        Err(GurukulError::NotImplemented(
            "getAll is not available on the filesystem backend".to_string(),
        ))
    }

    async fn delete(&self, video_id: &str) -> Result<()> {
        self.require_initialized()?;
        let sidecar = self.sidecar_path(video_id).await?;

        // Only the sidecar is removed. The content file remains on disk
        // but is no longer reported as downloaded.
        match tokio::fs::remove_file(&sidecar).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GurukulError::storage("delete", e)),
        }
    }

    async fn is_downloaded(&self, video_id: &str) -> bool {
        if self.require_initialized().is_err() {
            return false;
        }
        match self.get(video_id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!(video_id, error = %e, "presence check failed, reporting not downloaded");
                false
            }
        }
    }

    async fn resolve_playback_url(&self, video_id: &str) -> Result<Option<String>> {
        self.require_initialized()?;
        let Some(path) = self.bridge.get_video_file_path(video_id).await? else {
            return Ok(None);
        };
        Ok(Some(format!("file://{}", path.display())))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Filesystem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Video;
    use crate::bridge::{BridgeConfig, NativeHost};
    use tempfile::TempDir;

    fn sample_video(id: &str, title: &str) -> Video {
        Video {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            video_url: format!("/uploads/{id}.mp4"),
            thumbnail_url: None,
            duration: None,
            is_downloadable: true,
            subject_id: None,
            subject: None,
            class: None,
        }
    }

    async fn open_store_in(temp: &TempDir) -> FilesystemStore {
        let bridge = Arc::new(NativeHost::new(BridgeConfig::with_app_dir(temp.path())));
        let store = FilesystemStore::new(bridge);
        store.initialize().await.expect("initialize failed");
        store
    }

    #[tokio::test]
    async fn test_save_then_get_reads_sidecar_without_bytes() {
        let temp = TempDir::new().unwrap();
        let store = open_store_in(&temp).await;

        let record =
            DownloadedVideoRecord::from_video(&sample_video("v1", "Gravity"), vec![5u8; 64]);
        store.save(&record).await.unwrap();

        let loaded = store.get("v1").await.unwrap().expect("record missing");
        assert_eq!(loaded.id, "video_v1");
        assert_eq!(loaded.title, "Gravity");
        assert_eq!(loaded.size, 64);
        assert!(loaded.video_data.is_none());
    }

    #[tokio::test]
    async fn test_playback_url_points_at_content_file() {
        let temp = TempDir::new().unwrap();
        let store = open_store_in(&temp).await;

        let record =
            DownloadedVideoRecord::from_video(&sample_video("v2", "Sound Waves"), vec![1, 2, 3]);
        store.save(&record).await.unwrap();

        let url = store
            .resolve_playback_url("v2")
            .await
            .unwrap()
            .expect("no playback url");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("Sound_Waves_v2.mp4"));
    }

    #[tokio::test]
    async fn test_delete_removes_sidecar_but_keeps_content() {
        let temp = TempDir::new().unwrap();
        let store = open_store_in(&temp).await;

        let record =
            DownloadedVideoRecord::from_video(&sample_video("v3", "Cells"), vec![8u8; 16]);
        store.save(&record).await.unwrap();
        assert!(store.is_downloaded("v3").await);

        store.delete("v3").await.unwrap();
        assert!(!store.is_downloaded("v3").await);
        assert!(store.get("v3").await.unwrap().is_none());
        // Content file survives the delete
        let content = temp.path().join("videos").join("Cells_v3.mp4");
        assert!(content.exists());
    }

    #[tokio::test]
    async fn test_get_all_is_not_implemented() {
        let temp = TempDir::new().unwrap();
        let store = open_store_in(&temp).await;
        assert!(matches!(
            store.get_all().await,
            Err(GurukulError::NotImplemented(_))
        ));
    }

    #[tokio::test]
    async fn test_uninitialized_store_reports_unavailable() {
        let temp = TempDir::new().unwrap();
        let bridge = Arc::new(NativeHost::new(BridgeConfig::with_app_dir(temp.path())));
        let store = FilesystemStore::new(bridge);
        assert!(matches!(
            store.get("v1").await,
            Err(GurukulError::StorageUnavailable)
        ));
        assert!(!store.is_downloaded("v1").await);
    }
}
