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
use std::{error::Error, time::Duration};

use tracing::info;

use crate::voices::Voice;

/// Makes a voice audible. Calls are fire-and-forget: implementations should
/// return as soon as playback has been submitted, and sustained voices must
/// stop on their own once the duration has elapsed.
pub trait SoundPlayer: Send + Sync + 'static {
    /// Plays a sustained voice for the given duration.
    fn play_sustained(&self, voice: &Voice, duration: Duration) -> Result<(), Box<dyn Error>>;

    /// Plays a percussive voice.
    fn play_percussive(&self, voice: &Voice) -> Result<(), Box<dyn Error>>;
}

/// A sound player that doesn't produce audio. It reports every note through
/// tracing instead, which is what the terminal binary uses.
pub struct TracingPlayer {}

impl TracingPlayer {
    pub fn new() -> TracingPlayer {
        TracingPlayer {}
    }
}

impl Default for TracingPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundPlayer for TracingPlayer {
    fn play_sustained(&self, voice: &Voice, duration: Duration) -> Result<(), Box<dyn Error>> {
        info!(
            note = voice.label,
            duration = format!("{:?}", duration),
            "Playing sustained note."
        );
        Ok(())
    }

    fn play_percussive(&self, voice: &Voice) -> Result<(), Box<dyn Error>> {
        info!(note = voice.label, "Playing drum.");
        Ok(())
    }
}
