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


//! End-to-end tests of the offline pipeline: streaming download against a
//! mock portal backend, persistence through both storage backends, and
//! playback resolution.

use gurukul_core::api::{PortalClient, Video};
use gurukul_core::bridge::{BridgeConfig, NativeHost};
use gurukul_core::player::{PlaybackResolver, PlaybackSource};
use gurukul_core::store::{
    DatabaseStore, DownloadedVideoRecord, FilesystemStore, OfflineStore,
};
use gurukul_core::GurukulError;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn sample_video(id: &str, title: &str) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        description: Some("Lesson".to_string()),
        video_url: format!("/uploads/{id}.mp4"),
        thumbnail_url: None,
        duration: Some("10:00".to_string()),
        is_downloadable: true,
        subject_id: Some("sub-science".to_string()),
        subject: Some("Science".to_string()),
        class: Some("Class 6".to_string()),
    }
}

async fn database_store() -> Arc<dyn OfflineStore> {
    let store = DatabaseStore::in_memory();
    store.initialize().await.unwrap();
    Arc::new(store)
}

async fn filesystem_store(temp: &TempDir) -> Arc<dyn OfflineStore> {
    let bridge = Arc::new(NativeHost::new(BridgeConfig::with_app_dir(temp.path())));
    let store = FilesystemStore::new(bridge);
    store.initialize().await.unwrap();
    Arc::new(store)
}

#[tokio::test]
async fn download_streams_with_monotonic_progress() {
    let mut server = mockito::Server::new_async().await;
    let body: Vec<u8> = (0..2 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

    let mock = server
        .mock("GET", "/api/videos/v1/download")
        .match_header("authorization", "Bearer school-token")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body(&body)
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);

    let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let record = resolver
        .download(&sample_video("v1", "Water Cycle"), "school-token", move |p| {
            seen_cb.lock().unwrap().push(p);
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(record.size as usize, body.len());
    assert_eq!(record.video_data.as_ref().unwrap(), &body);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress regressed");
    assert!(seen.iter().all(|p| (0.0..=100.0).contains(p)));
    assert_eq!(*seen.last().unwrap(), 100.0);
}

#[tokio::test]
async fn rejected_download_surfaces_server_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/v2/download")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Quota exceeded"}"#)
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);

    let err = resolver
        .download(&sample_video("v2", "Blocked"), "school-token", |_| {})
        .await
        .unwrap_err();

    match &err {
        GurukulError::DownloadFailed(msg) => {
            assert_eq!(msg, "Quota exceeded");
        }
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
    // The server's message reaches the user verbatim
    assert_eq!(err.user_message(), "Quota exceeded");
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_generic_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/v3/download")
        .with_status(500)
        .with_body("<html>Internal Server Error</html>")
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);

    let err = resolver
        .download(&sample_video("v3", "Broken"), "school-token", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GurukulError::DownloadFailed(ref msg) if msg == "Failed to download video"
    ));
}

#[tokio::test]
async fn missing_content_length_skips_intermediate_progress() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/v4/download")
        .with_status(200)
        .with_chunked_body(|w| {
            for _ in 0..8 {
                w.write_all(&[0xABu8; 4096])?;
            }
            Ok(())
        })
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);

    let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let record = resolver
        .download(&sample_video("v4", "No Length"), "school-token", move |p| {
            seen_cb.lock().unwrap().push(p);
        })
        .await
        .unwrap();

    // Unknown total: the only report is the completion signal
    assert_eq!(*seen.lock().unwrap(), vec![100.0]);
    assert_eq!(record.size, 8 * 4096);
}

#[tokio::test]
async fn filesystem_download_without_content_length_marks_downloaded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/ve/download")
        .with_status(200)
        .with_chunked_body(|w| {
            for _ in 0..4 {
                w.write_all(&[0x5Au8; 2048])?;
            }
            Ok(())
        })
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let portal = PortalClient::new(server.url()).unwrap();
    let store = filesystem_store(&temp).await;
    let resolver = PlaybackResolver::new(portal, vec![Arc::clone(&store)]);

    let seen: Arc<Mutex<Vec<f64>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    resolver
        .download(&sample_video("ve", "Echoes"), "school-token", move |p| {
            seen_cb.lock().unwrap().push(p);
        })
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![100.0]);
    assert!(store.is_downloaded("ve").await);
}

#[tokio::test]
async fn quota_event_broadcast_after_download() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/v5/download")
        .with_status(200)
        .with_body(vec![1u8; 256])
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);
    let mut quota_rx = resolver.quota_notifier().subscribe();

    resolver
        .download(&sample_video("v5", "Quota"), "school-token", |_| {})
        .await
        .unwrap();

    let event = quota_rx.recv().await.unwrap();
    assert_eq!(event.video_id, "v5");
    assert!(event.downloaded_at > 0);
}

#[tokio::test]
async fn redownload_after_delete_takes_updated_title() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/videos/v6/download")
        .with_status(200)
        .with_body(vec![2u8; 128])
        .expect(2)
        .create_async()
        .await;

    let portal = PortalClient::new(server.url()).unwrap();
    let store = database_store().await;
    let resolver = PlaybackResolver::new(portal, vec![Arc::clone(&store)]);

    resolver
        .download(&sample_video("v6", "Old Title"), "school-token", |_| {})
        .await
        .unwrap();

    // A second download attempt while the copy exists is refused
    let err = resolver
        .download(&sample_video("v6", "New Title"), "school-token", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, GurukulError::AlreadyDownloaded(_)));

    resolver.delete_offline_copy("v6").await.unwrap();
    resolver
        .download(&sample_video("v6", "New Title"), "school-token", |_| {})
        .await
        .unwrap();

    let record = store.get("v6").await.unwrap().unwrap();
    assert_eq!(record.title, "New Title");
}

#[tokio::test]
async fn filesystem_pipeline_round_trips_bytes() {
    let mut server = mockito::Server::new_async().await;
    let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 13) as u8).collect();
    server
        .mock("GET", "/api/videos/v7/download")
        .with_status(200)
        .with_body(&body)
        .create_async()
        .await;

    let temp = TempDir::new().unwrap();
    let portal = PortalClient::new(server.url()).unwrap();
    let store = filesystem_store(&temp).await;
    let resolver = PlaybackResolver::new(portal, vec![store]);

    let video = sample_video("v7", "Magnetism");
    resolver.download(&video, "school-token", |_| {}).await.unwrap();

    let source = resolver.resolve(&video).await.unwrap();
    let PlaybackSource::OfflineAvailable { url } = source else {
        panic!("expected offline source, got {source:?}");
    };
    let path = url.strip_prefix("file://").unwrap();
    assert_eq!(std::fs::read(path).unwrap(), body);
}

#[tokio::test]
async fn fresh_store_reports_nothing_downloaded() {
    let store = database_store().await;
    assert!(!store.is_downloaded("unknown").await);
    assert!(store.get("unknown").await.unwrap().is_none());
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn resolver_falls_back_to_remote_for_unknown_video() {
    let portal = PortalClient::new("https://portal.example.com").unwrap();
    let resolver = PlaybackResolver::new(portal, vec![database_store().await]);

    let source = resolver.resolve(&sample_video("v8", "Remote")).await.unwrap();
    assert_eq!(
        source,
        PlaybackSource::RemoteOnly {
            url: "https://portal.example.com/uploads/v8.mp4".to_string()
        }
    );
}

#[tokio::test]
async fn record_snapshot_survives_database_round_trip() {
    let store = database_store().await;
    let video = sample_video("v9", "Plants");
    let record = DownloadedVideoRecord::from_video(&video, vec![3u8; 99]);
    store.save(&record).await.unwrap();

    let loaded = store.get("v9").await.unwrap().unwrap();
    assert_eq!(loaded.subject.as_deref(), Some("Science"));
    assert_eq!(loaded.class.as_deref(), Some("Class 6"));
    assert_eq!(loaded.downloaded_at, record.downloaded_at);
}
