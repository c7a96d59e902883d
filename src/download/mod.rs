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


//! Streaming video acquisition.
//!
//! The download controller performs an authenticated GET against the portal
//! backend, consumes the response body chunk by chunk, and reports
//! fractional progress while assembling the complete payload in memory.
//! Persistence is the store's responsibility, never the controller's.

pub mod controller;
pub mod progress;

pub use controller::{download_video, DownloadController, VideoPayload, VIDEO_MIME};
pub use progress::PercentTracker;
