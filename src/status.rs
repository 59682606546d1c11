// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use tracing::info;

use crate::session::SessionState;

/// Receives every session state transition, e.g. to drive a status display.
pub trait StatusSink: Send + Sync + 'static {
    fn update(&self, state: SessionState, message: &str);
}

/// Reports status changes through tracing.
pub struct TracingStatus {}

impl TracingStatus {
    pub fn new() -> TracingStatus {
        TracingStatus {}
    }
}

impl Default for TracingStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for TracingStatus {
    fn update(&self, state: SessionState, message: &str) {
        info!(state = %state, "{}", message);
    }
}
