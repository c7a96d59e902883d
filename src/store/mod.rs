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


//! Offline video storage.
//!
//! One [`OfflineStore`] contract, two backends. The filesystem backend
//! reaches the local disk through the host bridge; the database backend
//! embeds sqlite and keeps the binary content inside the record. The
//! backend is selected exactly once at startup by [`open_store`], from the
//! bridge's presence, and never re-probed per operation.

pub mod database;
pub mod filesystem;
pub mod record;

use crate::bridge::HostBridge;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use database::DatabaseStore;
pub use filesystem::FilesystemStore;
pub use record::DownloadedVideoRecord;

/// Which persistence mechanism backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Embedded sqlite database; bytes live inside the record
    Database,
    /// Local filesystem via the host bridge; bytes live in `.mp4` files
    Filesystem,
}

/// Uniform persistence contract over both storage backends.
///
/// Capability gaps are surfaced as explicit errors rather than silent
/// no-ops; `is_downloaded` is the one query that degrades to `false` on
/// any fault, so presence checks never take the UI down.
#[async_trait]
pub trait OfflineStore: Send + Sync {
    /// Prepare the backend for use. Idempotent; every other operation
    /// requires a prior successful call.
    async fn initialize(&self) -> Result<()>;

    /// Persist a downloaded video, replacing any record under the same key
    async fn save(&self, record: &DownloadedVideoRecord) -> Result<()>;

    /// Fetch one record by video id, or `None` when no offline copy exists
    async fn get(&self, video_id: &str) -> Result<Option<DownloadedVideoRecord>>;

    /// Enumerate all offline records
    async fn get_all(&self) -> Result<Vec<DownloadedVideoRecord>>;

    /// Remove a video's offline record
    async fn delete(&self, video_id: &str) -> Result<()>;

    /// Whether an offline copy exists. Returns `false` on any storage
    /// fault instead of propagating it.
    async fn is_downloaded(&self, video_id: &str) -> bool;

    /// Produce a URL a local player can bind to for the offline copy, or
    /// `None` when the video is not stored.
    async fn resolve_playback_url(&self, video_id: &str) -> Result<Option<String>>;

    /// The backend this store runs on
    fn backend(&self) -> StorageBackend;
}

/// Open the offline store for this environment.
///
/// The host bridge's presence is the capability probe: with a bridge the
/// filesystem backend is used, without one the embedded database. The
/// returned store is already initialized.
pub async fn open_store(bridge: Option<Arc<dyn HostBridge>>) -> Result<Arc<dyn OfflineStore>> {
    let store: Arc<dyn OfflineStore> = match bridge {
        Some(bridge) => {
            info!("host bridge present, using filesystem storage backend");
            Arc::new(FilesystemStore::new(bridge))
        }
        None => {
            info!("no host bridge, using embedded database storage backend");
            Arc::new(DatabaseStore::at_default_path())
        }
    };

    store.initialize().await?;
    Ok(store)
}
