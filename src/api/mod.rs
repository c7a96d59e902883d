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


//! HTTP contracts consumed from the portal backend.
//!
//! The backend server itself is an external collaborator; this module only
//! models the pieces the offline core depends on: the authenticated video
//! download endpoint, the video entity shape, and the school profile that
//! carries the server-authoritative download quota.

pub mod client;

pub use client::{DownloadQuota, ErrorBody, PortalClient, SchoolProfile, Video};
