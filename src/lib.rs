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


//! Offline video core for the Gurukul school learning portal.
//!
//! This crate implements the portal's offline-media pipeline:
//!
//! - [`download`] streams a video from the portal backend with progress
//!   reporting and assembles it into an in-memory payload.
//! - [`store`] persists downloaded videos behind a single [`store::OfflineStore`]
//!   contract with two backends: an embedded sqlite database, or the local
//!   filesystem reached through the desktop shell's host bridge.
//! - [`player`] decides which byte source a player binds to, preferring the
//!   offline copy, and broadcasts quota-refresh events after downloads.
//! - [`bridge`] is the privileged capability surface exposed by the desktop
//!   shell (download directory, preferences, window control); its absence
//!   selects the database backend.
//! - [`api`] holds the HTTP contracts the core consumes from the portal
//!   backend (download endpoint, video entity, school quota).

pub mod api;
pub mod bridge;
pub mod download;
pub mod error;
pub mod player;
pub mod store;

pub use api::{PortalClient, Video};
pub use bridge::{BridgeConfig, HostBridge, NativeHost};
pub use download::{download_video, VideoPayload};
pub use error::{GurukulError, Result};
pub use player::{PlaybackResolver, PlaybackSource, QuotaEvent, QuotaNotifier};
pub use store::{open_store, DownloadedVideoRecord, OfflineStore, StorageBackend};
