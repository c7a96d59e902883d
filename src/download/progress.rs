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


//! Download progress reporting.
//!
//! Progress is a percentage in `[0, 100]` derived from
//! `received_bytes / content_length`. When the server omits
//! `content-length` there is no known total, so no intermediate values are
//! reported and only the completion signal (100) is delivered.

/// Percentage tracker for a single download.
///
/// Guarantees the reported sequence is non-decreasing and clamped to
/// `[0, 100]`, with 100 always the final value on success.
#[derive(Debug)]
pub struct PercentTracker {
    total: Option<u64>,
    last: f64,
}

impl PercentTracker {
    /// Create a tracker; `total` is the content-length when the server sent one
    pub fn new(total: Option<u64>) -> Self {
        Self { total, last: 0.0 }
    }

    /// Record the received-byte count after a chunk.
    ///
    /// Returns the percentage to report, or `None` when the total is
    /// unknown (or zero) and intermediate progress cannot be computed.
    pub fn update(&mut self, received: u64) -> Option<f64> {
        let total = self.total.filter(|t| *t > 0)?;
        let percent = (received as f64 / total as f64) * 100.0;
        // Never regress, never overshoot
        self.last = percent.clamp(self.last, 100.0);
        Some(self.last)
    }

    /// Mark the download complete; returns `Some(100)` unless 100 was
    /// already the last reported value.
    pub fn complete(&mut self) -> Option<f64> {
        if self.last >= 100.0 {
            return None;
        }
        self.last = 100.0;
        Some(100.0)
    }

    /// Last reported percentage
    pub fn last(&self) -> f64 {
        self.last
    }
}
