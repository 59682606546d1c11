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

//! Mock collaborators that record every call they receive.

use std::{error::Error, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::{
    clock::TokioClock,
    config::Tuning,
    session::{Session, SessionState},
    sound::SoundPlayer,
    status::StatusSink,
    visual::VisualFeedback,
    voices::Voice,
};

/// A call made to the mock sound player. `at` is measured from the player's
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Played {
    Sustained {
        voice: usize,
        duration: Duration,
        at: Duration,
    },
    Percussive {
        voice: usize,
        at: Duration,
    },
}

impl Played {
    pub fn at(&self) -> Duration {
        match self {
            Played::Sustained { at, .. } | Played::Percussive { at, .. } => *at,
        }
    }
}

/// A sound player that records calls instead of playing them.
pub struct MockPlayer {
    origin: Instant,
    played: Mutex<Vec<Played>>,
    fail: bool,
}

impl MockPlayer {
    pub fn new() -> MockPlayer {
        MockPlayer {
            origin: Instant::now(),
            played: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A player that records every call and then reports a failure.
    pub fn failing() -> MockPlayer {
        MockPlayer {
            fail: true,
            ..MockPlayer::new()
        }
    }

    pub fn played(&self) -> Vec<Played> {
        self.played.lock().clone()
    }

    fn record(&self, played: Played) -> Result<(), Box<dyn Error>> {
        self.played.lock().push(played);
        if self.fail {
            return Err("playback rejected".into());
        }
        Ok(())
    }
}

impl SoundPlayer for MockPlayer {
    fn play_sustained(&self, voice: &Voice, duration: Duration) -> Result<(), Box<dyn Error>> {
        self.record(Played::Sustained {
            voice: voice.index,
            duration,
            at: self.origin.elapsed(),
        })
    }

    fn play_percussive(&self, voice: &Voice) -> Result<(), Box<dyn Error>> {
        self.record(Played::Percussive {
            voice: voice.index,
            at: self.origin.elapsed(),
        })
    }
}

/// A marker shown through the mock visual feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    pub label: String,
    pub color: String,
    pub duration: Duration,
    pub lane: usize,
    pub percussive: bool,
}

pub struct MockVisual {
    shown: Mutex<Vec<Shown>>,
    fail: bool,
}

impl MockVisual {
    pub fn new() -> MockVisual {
        MockVisual {
            shown: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> MockVisual {
        MockVisual {
            fail: true,
            ..MockVisual::new()
        }
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().clone()
    }
}

impl VisualFeedback for MockVisual {
    fn show(
        &self,
        label: &str,
        color: &str,
        duration: Duration,
        lane: usize,
        percussive: bool,
    ) -> Result<(), Box<dyn Error>> {
        self.shown.lock().push(Shown {
            label: label.to_string(),
            color: color.to_string(),
            duration,
            lane,
            percussive,
        });
        if self.fail {
            return Err("display unavailable".into());
        }
        Ok(())
    }
}

/// Records every status update.
pub struct MockStatus {
    updates: Mutex<Vec<(SessionState, String)>>,
}

impl MockStatus {
    pub fn new() -> MockStatus {
        MockStatus {
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn states(&self) -> Vec<SessionState> {
        self.updates.lock().iter().map(|(state, _)| *state).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.updates
            .lock()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl StatusSink for MockStatus {
    fn update(&self, state: SessionState, message: &str) {
        self.updates.lock().push((state, message.to_string()));
    }
}

/// A session wired to mock collaborators.
pub struct Harness {
    pub session: Session,
    pub sound: Arc<MockPlayer>,
    pub visual: Arc<MockVisual>,
    pub status: Arc<MockStatus>,
}

fn build(sound: MockPlayer, visual: MockVisual) -> Harness {
    let sound = Arc::new(sound);
    let visual = Arc::new(visual);
    let status = Arc::new(MockStatus::new());
    let session = Session::new(
        Tuning::default(),
        Arc::new(TokioClock::new()),
        sound.clone(),
        visual.clone(),
        status.clone(),
    );
    Harness {
        session,
        sound,
        visual,
        status,
    }
}

/// Creates an idle session with default tuning and well-behaved mocks.
pub fn harness() -> Harness {
    build(MockPlayer::new(), MockVisual::new())
}

/// Creates an idle session whose sound player and visual feedback always fail.
pub fn failing_harness() -> Harness {
    build(MockPlayer::failing(), MockVisual::failing())
}
