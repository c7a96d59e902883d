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


//! HTTP client for the portal backend.
//!
//! Wraps `reqwest::Client` with base-URL management and bearer
//! authentication. Non-2xx responses from the backend carry a JSON body
//! `{"error": "..."}`; [`ErrorBody`] models that payload.
//!
//! Downloads deliberately use a client with no overall request timeout:
//! video fetches can legitimately run for minutes, and the original design
//! specifies no timeout path beyond transport-level failures.

use crate::error::{GurukulError, Result};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default request timeout for metadata endpoints (not downloads)
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Video entity as served by the portal backend
///
/// Only the fields the offline core reads are modeled. `subject` and
/// `class` are the denormalized display strings snapshotted into offline
/// records at download time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "videoUrl")]
    pub video_url: String,
    #[serde(rename = "thumbnailUrl", default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(rename = "isDownloadable", default)]
    pub is_downloadable: bool,
    #[serde(rename = "subjectId", default)]
    pub subject_id: Option<String>,
    /// Denormalized subject display name, when the backend expands it
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

/// Error payload returned by the backend on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Per-school download quota, tracked server-side
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DownloadQuota {
    #[serde(rename = "downloadsAllowed", default)]
    pub allowed: u32,
    #[serde(rename = "downloadsUsed", default)]
    pub used: u32,
}

impl DownloadQuota {
    /// Downloads still permitted under the quota
    pub fn remaining(&self) -> u32 {
        self.allowed.saturating_sub(self.used)
    }
}

/// School profile from `GET /api/auth/school/me`
///
/// Dashboards re-fetch this after a quota-refresh notification since quota
/// state is server-authoritative and never tracked locally.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub quota: DownloadQuota,
}

/// HTTP client for the portal backend
#[derive(Debug, Clone)]
pub struct PortalClient {
    base_url: String,
    client: reqwest::Client,
}

impl PortalClient {
    /// Create a client for the given base URL (e.g. the environment-configured
    /// backend host). A trailing slash on the base is trimmed.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Backend base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated download endpoint for a video
    pub fn download_url(&self, video_id: &str) -> String {
        format!("{}/api/videos/{}/download", self.base_url, video_id)
    }

    /// Resolve a backend-relative media URL against the base URL.
    ///
    /// URLs that are already absolute pass through untouched.
    pub fn resolve_media_url(&self, video_url: &str) -> String {
        if video_url.starts_with("http://") || video_url.starts_with("https://") {
            video_url.to_string()
        } else {
            format!("{}{}", self.base_url, video_url)
        }
    }

    /// Fetch the authenticated school profile, including the current quota
    pub async fn fetch_school_profile(&self, token: &str) -> Result<SchoolProfile> {
        if token.is_empty() {
            return Err(GurukulError::MissingCredential);
        }

        let response = self
            .client
            .get(format!("{}/api/auth/school/me", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        if !response.status().is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => "Failed to load school profile".to_string(),
            };
            return Err(GurukulError::DownloadFailed(message));
        }

        Ok(response.json::<SchoolProfile>().await?)
    }
}
