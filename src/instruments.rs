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
use std::{sync::Arc, time::Duration};

use tracing::error;

use crate::{recorder::VoiceEvent, sound::SoundPlayer, visual::VisualFeedback, voices::Voice};

/// Triggers the sound player and the visual feedback together for a voice.
///
/// Failures from either collaborator are logged here and never reach the
/// caller, so playback and scheduling carry on regardless.
pub struct Instruments {
    sound: Arc<dyn SoundPlayer>,
    visual: Arc<dyn VisualFeedback>,
    /// How long a drum marker stays visible.
    percussive_visual: Duration,
}

impl Instruments {
    pub fn new(
        sound: Arc<dyn SoundPlayer>,
        visual: Arc<dyn VisualFeedback>,
        percussive_visual: Duration,
    ) -> Instruments {
        Instruments {
            sound,
            visual,
            percussive_visual,
        }
    }

    /// Plays a sustained voice for `duration`.
    pub fn sustained(&self, voice: &Voice, duration: Duration) {
        if let Err(e) = self.sound.play_sustained(voice, duration) {
            error!(err = e.as_ref(), note = voice.label, "Error playing note");
        }
        self.show(voice, duration);
    }

    /// Plays a percussive voice.
    pub fn percussive(&self, voice: &Voice) {
        if let Err(e) = self.sound.play_percussive(voice) {
            error!(err = e.as_ref(), note = voice.label, "Error playing drum");
        }
        self.show(voice, self.percussive_visual);
    }

    /// Plays a recorded event again.
    pub fn replay(&self, event: &VoiceEvent) {
        match event {
            VoiceEvent::Sustained {
                voice, duration, ..
            } => self.sustained(voice, *duration),
            VoiceEvent::Percussive { voice, .. } => self.percussive(voice),
        }
    }

    fn show(&self, voice: &Voice, duration: Duration) {
        if let Err(e) = self.visual.show(
            voice.label,
            voice.color,
            duration,
            voice.lane(),
            voice.is_percussive(),
        ) {
            error!(err = e.as_ref(), note = voice.label, "Error showing marker");
        }
    }
}
