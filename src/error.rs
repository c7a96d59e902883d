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


//! Error types for the offline video core.
//!
//! Errors are grouped by the subsystem that raises them: download
//! acquisition, offline storage, and the host capability bridge. Storage
//! faults deliberately separate "never initialized" (a contract violation)
//! from "an individual operation faulted" so that callers can degrade
//! gracefully on the latter.

use thiserror::Error;

/// Result type alias using our GurukulError type
pub type Result<T> = std::result::Result<T, GurukulError>;

/// Main error type for the offline video core
#[derive(Error, Debug)]
pub enum GurukulError {
    // ===== Download acquisition =====
    /// Network/transport failure or non-success HTTP status while fetching
    /// video content. Carries the server-supplied message when one was
    /// parseable from the error payload.
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// No bearer credential available before the request was attempted
    #[error("Not logged in")]
    MissingCredential,

    /// The backend has not marked this video as downloadable
    #[error("Video '{0}' is not available for download")]
    NotDownloadable(String),

    /// An offline copy already exists; downloads are not re-fetched
    #[error("Video '{0}' is already downloaded")]
    AlreadyDownloaded(String),

    // ===== Offline storage =====
    /// A store operation was attempted before `initialize()` succeeded
    #[error("Offline storage is not initialized")]
    StorageUnavailable,

    /// An individual storage read/write/delete faulted
    #[error("Storage operation '{operation}' failed: {message}")]
    StorageOperationFailed {
        operation: &'static str,
        message: String,
    },

    /// Operation has no implementation for the active backend
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    // ===== Host bridge =====
    /// A bridge capability was invoked without probing for its presence
    #[error("Host bridge is not available in this environment")]
    HostBridgeUnavailable,

    /// Path rejected during validation (missing, not a directory, not writable)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Generic file I/O error with context
    #[error("File I/O error: {0}")]
    FileIoError(String),

    // ===== External library errors =====
    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Base64 decode error from the host bridge payload
    #[error("Invalid base64 payload: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

impl GurukulError {
    /// Create a StorageOperationFailed error from any displayable cause
    pub fn storage<E: std::fmt::Display>(operation: &'static str, cause: E) -> Self {
        GurukulError::StorageOperationFailed {
            operation,
            message: cause.to_string(),
        }
    }

    /// Check if the error is a storage fault (either kind)
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            GurukulError::StorageUnavailable | GurukulError::StorageOperationFailed { .. }
        )
    }

    /// Get user-friendly error message suitable for display
    ///
    /// Storage causes are logged, not shown verbatim; downloads surface the
    /// server's message when one was available.
    pub fn user_message(&self) -> String {
        match self {
            GurukulError::DownloadFailed(msg) => msg.clone(),
            GurukulError::MissingCredential => "Please login to download videos".to_string(),
            GurukulError::NotDownloadable(_) => {
                "This video is not available for download".to_string()
            }
            GurukulError::AlreadyDownloaded(_) => "Video is already downloaded!".to_string(),
            GurukulError::StorageUnavailable | GurukulError::StorageOperationFailed { .. } => {
                "Failed to save video. Please try again.".to_string()
            }
            GurukulError::ReqwestError(_) => {
                "Failed to download video. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
