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


use clap::{Parser, Subcommand};
use gurukul_core::api::{PortalClient, Video};
use gurukul_core::player::PlaybackResolver;
use gurukul_core::store::{DatabaseStore, OfflineStore};
use gurukul_core::Result;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gurukul-cli")]
#[command(about = "Gurukul offline video tool", long_about = None)]
struct Cli {
    /// Portal backend base URL
    #[arg(long, env = "GURUKUL_API_URL", default_value = "http://localhost:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a video for offline playback
    Download {
        /// Video id on the portal backend
        video_id: String,
        /// Title recorded with the offline copy
        #[arg(short, long)]
        title: Option<String>,
        /// Bearer token for the portal backend
        #[arg(long, env = "GURUKUL_TOKEN")]
        token: String,
    },
    /// List offline videos
    List,
    /// Show offline status and playback URL for a video
    Status { video_id: String },
    /// Remove a video's offline record
    Delete { video_id: String },
}

async fn open_store() -> Result<Arc<dyn OfflineStore>> {
    let store = DatabaseStore::at_default_path();
    store.initialize().await?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let portal = PortalClient::new(&cli.base_url)?;
    let store = open_store().await?;

    match cli.command {
        Commands::Download {
            video_id,
            title,
            token,
        } => {
            let video = Video {
                id: video_id.clone(),
                title: title.unwrap_or_else(|| video_id.clone()),
                description: None,
                video_url: format!("/uploads/{video_id}.mp4"),
                thumbnail_url: None,
                duration: None,
                is_downloadable: true,
                subject_id: None,
                subject: None,
                class: None,
            };

            let resolver = PlaybackResolver::new(portal, vec![store]);
            let record = resolver
                .download(&video, &token, |percent| {
                    print!("\rDownloading: {percent:>5.1}%");
                    let _ = std::io::Write::flush(&mut std::io::stdout());
                })
                .await?;
            println!("\nSaved {} ({} bytes)", record.id, record.size);
        }
        Commands::List => {
            let records = store.get_all().await?;
            if records.is_empty() {
                println!("No offline videos");
            }
            for record in records {
                println!(
                    "{}  {}  {} bytes  downloaded_at={}",
                    record.video_id, record.title, record.size, record.downloaded_at
                );
            }
        }
        Commands::Status { video_id } => {
            if store.is_downloaded(&video_id).await {
                match store.resolve_playback_url(&video_id).await? {
                    Some(url) => println!("Downloaded: {url}"),
                    None => println!("Downloaded (no playback URL)"),
                }
            } else {
                println!("Not downloaded");
            }
        }
        Commands::Delete { video_id } => {
            store.delete(&video_id).await?;
            println!("Deleted offline record for {video_id}");
        }
    }

    Ok(())
}
