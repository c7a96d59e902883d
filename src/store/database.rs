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


//! Embedded database storage backend.
//!
//! Stores downloaded videos in a local sqlite database with the binary
//! content held as a blob inside each record. Records key on
//! `video_<videoId>` with secondary indexes on the video id and the
//! download timestamp.
//!
//! Playback from this backend spills the blob to a file in the system
//! temp directory and hands back a `file://` URL. Spill files are only
//! reclaimed through [`DatabaseStore::release_playback_url`]; a caller
//! that forgets to release keeps the bytes on disk until the OS cleans
//! the temp directory.

use crate::error::{GurukulError, Result};
use crate::store::record::DownloadedVideoRecord;
use crate::store::{OfflineStore, StorageBackend};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{ConnectOptions, Row};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Database file name under the app data directory
const DATABASE_FILE: &str = "offline_videos.db";

/// Subdirectory of the system temp dir holding playback spill files
const SPILL_DIR: &str = "gurukul-playback";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS downloaded_videos (
        id TEXT PRIMARY KEY,
        video_id TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        thumbnail_url TEXT,
        duration TEXT,
        subject TEXT,
        class TEXT,
        video_data BLOB NOT NULL,
        size INTEGER NOT NULL,
        downloaded_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_downloaded_videos_video_id
        ON downloaded_videos(video_id)",
    "CREATE INDEX IF NOT EXISTS idx_downloaded_videos_downloaded_at
        ON downloaded_videos(downloaded_at)",
];

/// Offline store backed by an embedded sqlite database
pub struct DatabaseStore {
    /// Database file location; `None` selects an in-memory database
    path: Option<PathBuf>,
    pool: OnceCell<SqlitePool>,
}

impl DatabaseStore {
    /// Store at an explicit database file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            pool: OnceCell::new(),
        }
    }

    /// Store at the platform default location
    /// (`<data dir>/Gurukul/offline_videos.db`)
    pub fn at_default_path() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Gurukul")
            .join(DATABASE_FILE);
        Self::new(path)
    }

    /// In-memory store for tests
    pub fn in_memory() -> Self {
        Self {
            path: None,
            pool: OnceCell::new(),
        }
    }

    async fn connect(&self) -> Result<SqlitePool> {
        let (connect_opts, max_connections) = match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.exists() {
                        tokio::fs::create_dir_all(parent).await.map_err(|e| {
                            GurukulError::FileIoError(format!(
                                "Failed to create database directory {}: {e}",
                                parent.display()
                            ))
                        })?;
                    }
                }

                let connection_string = format!("sqlite://{}?mode=rwc", path.display());
                let opts = SqliteConnectOptions::from_str(&connection_string)?
                    .create_if_missing(true)
                    .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                    .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                    .busy_timeout(Duration::from_secs(30))
                    .disable_statement_logging();
                (opts, 5)
            }
            None => {
                let opts = SqliteConnectOptions::from_str("sqlite::memory:")?
                    .disable_statement_logging();
                // In-memory sqlite is per-connection; one connection keeps
                // all operations on the same database
                (opts, 1)
            }
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!(path = ?self.path, "offline video database ready");
        Ok(pool)
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.pool.get().ok_or(GurukulError::StorageUnavailable)
    }

    fn spill_path(video_id: &str) -> PathBuf {
        std::env::temp_dir()
            .join(SPILL_DIR)
            .join(format!("video_{video_id}.mp4"))
    }

    /// Delete the playback spill file for a video, if one exists.
    ///
    /// Callers own this step; nothing in the store invokes it implicitly.
    pub async fn release_playback_url(&self, video_id: &str) -> Result<()> {
        let path = Self::spill_path(video_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GurukulError::FileIoError(format!(
                "{}: {e}",
                path.display()
            ))),
        }
    }
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> std::result::Result<DownloadedVideoRecord, sqlx::Error> {
    Ok(DownloadedVideoRecord {
        id: row.try_get("id")?,
        video_id: row.try_get("video_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        thumbnail_url: row.try_get("thumbnail_url")?,
        duration: row.try_get("duration")?,
        subject: row.try_get("subject")?,
        class: row.try_get("class")?,
        video_data: Some(row.try_get::<Vec<u8>, _>("video_data")?),
        size: row.try_get::<i64, _>("size")? as u64,
        downloaded_at: row.try_get("downloaded_at")?,
    })
}

#[async_trait]
impl OfflineStore for DatabaseStore {
    async fn initialize(&self) -> Result<()> {
        self.pool.get_or_try_init(|| self.connect()).await?;
        Ok(())
    }

    async fn save(&self, record: &DownloadedVideoRecord) -> Result<()> {
        let pool = self.pool()?;
        let data = record
            .video_data
            .as_deref()
            .ok_or_else(|| GurukulError::storage("save", "record carries no binary content"))?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO downloaded_videos
                (id, video_id, title, description, thumbnail_url, duration,
                 subject, class, video_data, size, downloaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.video_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.thumbnail_url)
        .bind(&record.duration)
        .bind(&record.subject)
        .bind(&record.class)
        .bind(data)
        .bind(record.size as i64)
        .bind(record.downloaded_at)
        .execute(pool)
        .await
        .map_err(|e| GurukulError::storage("save", e))?;

        debug!(video_id = %record.video_id, size = record.size, "record saved to database");
        Ok(())
    }

    async fn get(&self, video_id: &str) -> Result<Option<DownloadedVideoRecord>> {
        let pool = self.pool()?;
        let row = sqlx::query("SELECT * FROM downloaded_videos WHERE video_id = ?")
            .bind(video_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| GurukulError::storage("get", e))?;

        row.map(row_to_record)
            .transpose()
            .map_err(|e| GurukulError::storage("get", e))
    }

    async fn get_all(&self) -> Result<Vec<DownloadedVideoRecord>> {
        let pool = self.pool()?;
        let rows = sqlx::query("SELECT * FROM downloaded_videos ORDER BY downloaded_at DESC")
            .fetch_all(pool)
            .await
            .map_err(|e| GurukulError::storage("getAll", e))?;

        rows.into_iter()
            .map(row_to_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GurukulError::storage("getAll", e))
    }

    async fn delete(&self, video_id: &str) -> Result<()> {
        let pool = self.pool()?;
        sqlx::query("DELETE FROM downloaded_videos WHERE video_id = ?")
            .bind(video_id)
            .execute(pool)
            .await
            .map_err(|e| GurukulError::storage("delete", e))?;
        Ok(())
    }

    async fn is_downloaded(&self, video_id: &str) -> bool {
        let Ok(pool) = self.pool() else {
            return false;
        };

        let result: std::result::Result<Option<i64>, _> =
            sqlx::query_scalar("SELECT 1 FROM downloaded_videos WHERE video_id = ? LIMIT 1")
                .bind(video_id)
                .fetch_optional(pool)
                .await;

        match result {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!(video_id, error = %e, "presence check failed, reporting not downloaded");
                false
            }
        }
    }

    async fn resolve_playback_url(&self, video_id: &str) -> Result<Option<String>> {
        let Some(record) = self.get(video_id).await? else {
            return Ok(None);
        };
        let Some(data) = record.video_data else {
            return Ok(None);
        };

        let path = Self::spill_path(video_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GurukulError::FileIoError(format!("{}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| GurukulError::FileIoError(format!("{}: {e}", path.display())))?;

        debug!(video_id, path = %path.display(), "spilled blob for playback");
        Ok(Some(format!("file://{}", path.display())))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Database
    }
}
