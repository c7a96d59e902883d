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


//! Quota-refresh notifications.
//!
//! Every completed download counts against the school's server-side quota,
//! so dashboards showing quota numbers must re-fetch the school profile
//! after each download. The notifier is a typed broadcast channel: any
//! number of subscribers, events carry the video id and completion time,
//! and emission never fails when nobody is listening.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered events per subscriber before the oldest are dropped
const CHANNEL_CAPACITY: usize = 16;

/// A download finished; quota displays should re-fetch the school profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEvent {
    pub video_id: String,
    /// Download completion time, epoch milliseconds UTC
    pub downloaded_at: i64,
}

/// Broadcast sender for quota-refresh events
#[derive(Debug, Clone)]
pub struct QuotaNotifier {
    sender: broadcast::Sender<QuotaEvent>,
}

impl Default for QuotaNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl QuotaNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Open a new subscription; only events emitted after this call are seen
    pub fn subscribe(&self) -> broadcast::Receiver<QuotaEvent> {
        self.sender.subscribe()
    }

    /// Emit a quota-refresh event. A send with no live subscribers is not
    /// an error.
    pub fn notify(&self, event: QuotaEvent) {
        debug!(video_id = %event.video_id, "quota refresh event");
        let _ = self.sender.send(event);
    }
}
