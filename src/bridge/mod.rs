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


//! Host capability bridge.
//!
//! The bridge is the privileged surface the desktop shell exposes to the
//! core: filesystem access for downloaded videos, the configurable download
//! directory with its persisted preferences, and window-control
//! notifications. Its *absence* is a capability signal: the offline store
//! falls back to the embedded database backend rather than attempting and
//! catching bridge calls.
//!
//! Binary payloads cross the bridge base64-encoded. That round trip is a
//! fixed cost of the boundary, which mirrors a cross-process channel with
//! string/structured transport only.

pub mod config;
pub mod host;

pub use config::{BridgeConfig, Preferences};
pub use host::{
    FolderPicker, FolderSelection, HostBridge, NativeHost, SaveVideoRequest, SavedVideoFile,
};
