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

//! Captures triggered voices as timestamped events relative to a recording
//! origin.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::voices::{Voice, VoiceKind};

/// The nominal length recorded for a percussive voice.
pub const PERCUSSIVE_STUB: Duration = Duration::from_millis(500);

/// A single recorded trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEvent {
    /// A held voice with its true held duration.
    Sustained {
        voice: &'static Voice,
        offset: Duration,
        duration: Duration,
    },
    /// A one-shot voice.
    Percussive {
        voice: &'static Voice,
        offset: Duration,
    },
}

impl VoiceEvent {
    pub fn kind(&self) -> VoiceKind {
        match self {
            VoiceEvent::Sustained { .. } => VoiceKind::Sustained,
            VoiceEvent::Percussive { .. } => VoiceKind::Percussive,
        }
    }

    pub fn voice(&self) -> &'static Voice {
        match self {
            VoiceEvent::Sustained { voice, .. } | VoiceEvent::Percussive { voice, .. } => voice,
        }
    }

    /// The time between the recording origin and the trigger.
    pub fn offset(&self) -> Duration {
        match self {
            VoiceEvent::Sustained { offset, .. } | VoiceEvent::Percussive { offset, .. } => {
                *offset
            }
        }
    }

    /// The held duration for sustained voices, the stub for percussive ones.
    pub fn duration(&self) -> Duration {
        match self {
            VoiceEvent::Sustained { duration, .. } => *duration,
            VoiceEvent::Percussive { .. } => PERCUSSIVE_STUB,
        }
    }
}

/// The offset captured when a sustained voice was pressed during a take.
#[derive(Debug, Clone, Copy)]
struct Capture {
    take: u64,
    offset: Duration,
}

/// A sustained voice that is currently held.
#[derive(Debug)]
struct ActiveNote {
    start: Duration,
    capture: Option<Capture>,
}

/// The take currently being recorded.
#[derive(Debug, Clone, Copy)]
struct Take {
    id: u64,
    origin: Duration,
}

/// Tracks held voices and, while a take is running, records every trigger.
///
/// The recorder does no playback of its own. Every time passed in must come
/// from the same monotonic clock.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Vec<VoiceEvent>,
    active: HashMap<usize, ActiveNote>,
    take: Option<Take>,
    takes: u64,
}

impl Recorder {
    pub fn new() -> Recorder {
        Recorder::default()
    }

    /// Starts a new take at `now`, discarding anything recorded before.
    pub fn begin(&mut self, now: Duration) {
        self.events.clear();
        self.takes += 1;
        self.take = Some(Take {
            id: self.takes,
            origin: now,
        });
    }

    /// Ends the current take and hands over everything it recorded.
    ///
    /// Voices still held are not part of the take.
    pub fn finish(&mut self) -> Vec<VoiceEvent> {
        self.take = None;
        std::mem::take(&mut self.events)
    }

    /// Returns true while a take is running.
    pub fn is_recording(&self) -> bool {
        self.take.is_some()
    }

    /// The events recorded so far in the current take, in insertion order.
    pub fn events(&self) -> &[VoiceEvent] {
        &self.events
    }

    /// Returns true if the sustained voice with the given index is held.
    pub fn is_held(&self, index: usize) -> bool {
        self.active.contains_key(&index)
    }

    /// Marks a sustained voice as held. Returns false if it was already held, in
    /// which case nothing changes.
    pub fn press(&mut self, voice: &'static Voice, now: Duration) -> bool {
        if self.active.contains_key(&voice.index) {
            debug!(note = voice.label, "Note already held.");
            return false;
        }

        let capture = self.take.map(|take| Capture {
            take: take.id,
            offset: now.saturating_sub(take.origin),
        });
        self.active.insert(
            voice.index,
            ActiveNote {
                start: now,
                capture,
            },
        );
        true
    }

    /// Releases a held sustained voice and returns how long it was held. If the
    /// press happened during the take that is still running, the note is
    /// recorded. Releasing a voice that isn't held does nothing.
    pub fn release(&mut self, voice: &'static Voice, now: Duration) -> Option<Duration> {
        let note = self.active.remove(&voice.index)?;
        let duration = now.saturating_sub(note.start);

        match (note.capture, self.take) {
            (Some(capture), Some(take)) if capture.take == take.id => {
                let event = VoiceEvent::Sustained {
                    voice,
                    offset: capture.offset,
                    duration,
                };
                debug!(event = ?event, "Recorded note.");
                self.events.push(event);
            }
            _ => {}
        }

        Some(duration)
    }

    /// Records a percussive hit if a take is running.
    pub fn hit(&mut self, voice: &'static Voice, now: Duration) {
        if let Some(take) = self.take {
            let event = VoiceEvent::Percussive {
                voice,
                offset: now.saturating_sub(take.origin),
            };
            debug!(event = ?event, "Recorded hit.");
            self.events.push(event);
        }
    }
}
