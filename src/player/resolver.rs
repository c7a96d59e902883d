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


//! Offline-aware playback resolution.
//!
//! For each video the resolver decides which byte source a player binds
//! to: the offline copy when one exists, the remote stream otherwise, and
//! a transitional state while a download runs. Stores are consulted in
//! precedence order with filesystem backends ahead of database backends,
//! so a disk copy always wins when both hold the video.
//!
//! The resolver also owns the download path end to end: eligibility
//! guards, streaming fetch, persistence into the highest-precedence
//! store, and the quota-refresh broadcast once the copy is safely stored.

use crate::api::{PortalClient, Video};
use crate::download::DownloadController;
use crate::error::{GurukulError, Result};
use crate::player::quota::{QuotaEvent, QuotaNotifier};
use crate::store::{DownloadedVideoRecord, OfflineStore, StorageBackend};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Byte source a player should bind to for a given video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    /// No offline copy; stream from the portal backend
    RemoteOnly { url: String },
    /// A download is in flight; remain on the remote stream and show
    /// progress
    Downloading,
    /// An offline copy exists; play it without touching the network
    OfflineAvailable { url: String },
}

/// Offline-aware playback resolver and download orchestrator
pub struct PlaybackResolver {
    portal: PortalClient,
    controller: DownloadController,
    /// Stores in precedence order, filesystem first
    stores: Vec<Arc<dyn OfflineStore>>,
    notifier: QuotaNotifier,
    /// Video ids with a download currently in flight
    in_flight: Mutex<HashSet<String>>,
}

impl PlaybackResolver {
    /// Build a resolver over the given stores.
    ///
    /// Store order is normalized here: filesystem backends are moved ahead
    /// of database backends, preserving relative order within each kind.
    /// Downloads persist into the first store after normalization.
    pub fn new(portal: PortalClient, stores: Vec<Arc<dyn OfflineStore>>) -> Self {
        let mut stores = stores;
        stores.sort_by_key(|s| match s.backend() {
            StorageBackend::Filesystem => 0,
            StorageBackend::Database => 1,
        });

        Self {
            portal,
            controller: DownloadController::new(),
            stores,
            notifier: QuotaNotifier::new(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Quota-refresh notifier, for dashboards to subscribe to
    pub fn quota_notifier(&self) -> &QuotaNotifier {
        &self.notifier
    }

    fn active_store(&self) -> Result<&Arc<dyn OfflineStore>> {
        self.stores.first().ok_or(GurukulError::StorageUnavailable)
    }

    fn is_in_flight(&self, video_id: &str) -> bool {
        match self.in_flight.lock() {
            Ok(set) => set.contains(video_id),
            Err(_) => false,
        }
    }

    fn set_in_flight(&self, video_id: &str, active: bool) {
        if let Ok(mut set) = self.in_flight.lock() {
            if active {
                set.insert(video_id.to_string());
            } else {
                set.remove(video_id);
            }
        }
    }

    /// Decide the byte source for a video.
    ///
    /// A download in flight reports [`PlaybackSource::Downloading`];
    /// otherwise the stores are scanned in precedence order and the first
    /// offline copy wins. With no copy anywhere, the remote URL is
    /// resolved against the portal base.
    pub async fn resolve(&self, video: &Video) -> Result<PlaybackSource> {
        if self.is_in_flight(&video.id) {
            return Ok(PlaybackSource::Downloading);
        }

        for store in &self.stores {
            match store.resolve_playback_url(&video.id).await {
                Ok(Some(url)) => return Ok(PlaybackSource::OfflineAvailable { url }),
                Ok(None) => {}
                Err(e) => {
                    // A faulting store must not block remote playback
                    warn!(video_id = %video.id, error = %e, "store failed during resolution, skipping");
                }
            }
        }

        Ok(PlaybackSource::RemoteOnly {
            url: self.portal.resolve_media_url(&video.video_url),
        })
    }

    /// Download a video for offline playback.
    ///
    /// Fails fast when the video is not marked downloadable or an offline
    /// copy already exists. On success the record is persisted into the
    /// highest-precedence store and a quota-refresh event is broadcast.
    /// `on_progress` receives percentages in `[0, 100]`.
    pub async fn download<F>(
        &self,
        video: &Video,
        token: &str,
        on_progress: F,
    ) -> Result<DownloadedVideoRecord>
    where
        F: FnMut(f64),
    {
        if !video.is_downloadable {
            return Err(GurukulError::NotDownloadable(video.id.clone()));
        }

        // A copy in any store blocks a re-fetch, not just one in the
        // store downloads persist into
        for store in &self.stores {
            if store.is_downloaded(&video.id).await {
                return Err(GurukulError::AlreadyDownloaded(video.id.clone()));
            }
        }
        self.active_store()?;

        self.set_in_flight(&video.id, true);
        let result = self.fetch_and_store(video, token, on_progress).await;
        self.set_in_flight(&video.id, false);

        let record = result?;
        self.notifier.notify(QuotaEvent {
            video_id: record.video_id.clone(),
            downloaded_at: record.downloaded_at,
        });

        info!(video_id = %video.id, size = record.size, "video available offline");
        Ok(record)
    }

    async fn fetch_and_store<F>(
        &self,
        video: &Video,
        token: &str,
        on_progress: F,
    ) -> Result<DownloadedVideoRecord>
    where
        F: FnMut(f64),
    {
        let url = self.portal.download_url(&video.id);
        let payload = self.controller.fetch(&url, token, on_progress).await?;

        let record = DownloadedVideoRecord::from_video(video, payload.data);
        self.active_store()?.save(&record).await?;
        Ok(record)
    }

    /// Remove a video's offline record from every store holding one
    pub async fn delete_offline_copy(&self, video_id: &str) -> Result<()> {
        for store in &self.stores {
            if store.is_downloaded(video_id).await {
                store.delete(video_id).await?;
            }
        }
        Ok(())
    }
}
