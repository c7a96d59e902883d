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


//! Offline video record.

use crate::api::Video;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Prefix applied to the video id to form the record key
const RECORD_ID_PREFIX: &str = "video_";

/// A downloaded video as persisted by the offline store.
///
/// Metadata fields are snapshots of the video entity at download time;
/// later edits on the backend do not propagate to offline copies. The
/// binary content may be absent on reads from backends that keep bytes on
/// disk rather than inside the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedVideoRecord {
    /// Record key, always `video_<videoId>`
    pub id: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "thumbnailUrl", default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    /// Binary content; `None` when the backend stores bytes out of band
    #[serde(skip)]
    pub video_data: Option<Vec<u8>>,
    /// Payload size in bytes
    pub size: u64,
    /// Download completion time, epoch milliseconds UTC
    #[serde(rename = "downloadedAt")]
    pub downloaded_at: i64,
}

impl DownloadedVideoRecord {
    /// Record key for a video id
    pub fn key_for(video_id: &str) -> String {
        format!("{RECORD_ID_PREFIX}{video_id}")
    }

    /// Snapshot a video entity and its downloaded bytes into a record,
    /// stamped with the current time.
    pub fn from_video(video: &Video, data: Vec<u8>) -> Self {
        Self {
            id: Self::key_for(&video.id),
            video_id: video.id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            duration: video.duration.clone(),
            subject: video.subject.clone(),
            class: video.class.clone(),
            size: data.len() as u64,
            video_data: Some(data),
            downloaded_at: Utc::now().timestamp_millis(),
        }
    }

    /// Sidecar metadata for filesystem-backed storage (everything except
    /// the binary content)
    pub fn metadata_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "videoId": self.video_id,
            "title": self.title,
            "description": self.description,
            "thumbnailUrl": self.thumbnail_url,
            "duration": self.duration,
            "subject": self.subject,
            "class": self.class,
            "size": self.size,
            "downloadedAt": self.downloaded_at,
        })
    }
}
