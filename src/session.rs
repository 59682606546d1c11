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

//! The record/loop state machine.

use std::fmt;
use std::sync::Arc;

use tracing::{info, span, warn, Level, Span};

use crate::{
    clock::Clock,
    config::Tuning,
    instruments::Instruments,
    looper::{LoopPlan, LoopTiming, Looper},
    recorder::{Recorder, VoiceEvent},
    sound::SoundPlayer,
    status::StatusSink,
    visual::VisualFeedback,
    voices::{self, VoiceKind},
};

const IDLE_MESSAGE: &str = "Toggle to start recording your performance";
const RECORDING_MESSAGE: &str = "Recording... toggle again to loop";
const LOOPING_MESSAGE: &str = "Looping... toggle to stop";

/// The state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is being recorded or looped.
    Idle,
    /// Triggers are being recorded.
    Recording,
    /// The last recording is playing on repeat.
    Looping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Recording => write!(f, "recording"),
            SessionState::Looping => write!(f, "looping"),
        }
    }
}

/// Owns everything a performance needs: the state, the recorder, the held
/// voices and the running loop. All transitions go through `&mut self`, so a
/// single owner serializes them.
pub struct Session {
    state: SessionState,
    recorder: Recorder,
    looper: Looper,
    instruments: Arc<Instruments>,
    clock: Arc<dyn Clock>,
    status: Arc<dyn StatusSink>,
    tuning: Tuning,
    span: Span,
}

impl Session {
    /// Creates a new idle session.
    pub fn new(
        tuning: Tuning,
        clock: Arc<dyn Clock>,
        sound: Arc<dyn SoundPlayer>,
        visual: Arc<dyn VisualFeedback>,
        status: Arc<dyn StatusSink>,
    ) -> Session {
        let instruments = Arc::new(Instruments::new(sound, visual, tuning.percussive_visual));
        let session = Session {
            state: SessionState::Idle,
            recorder: Recorder::new(),
            looper: Looper::new(instruments.clone()),
            instruments,
            clock,
            status,
            tuning,
            span: span!(Level::INFO, "session"),
        };
        session.status.update(SessionState::Idle, IDLE_MESSAGE);
        session
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The events recorded so far in the current take.
    pub fn recording(&self) -> &[VoiceEvent] {
        self.recorder.events()
    }

    /// The plan being looped, if any.
    pub fn loop_plan(&self) -> Option<&LoopPlan> {
        self.looper.plan()
    }

    /// The parameters loops are derived with.
    pub fn timing(&self) -> &LoopTiming {
        &self.tuning.timing
    }

    /// Returns true if the piano voice with the given index is held.
    pub fn is_held(&self, index: usize) -> bool {
        self.recorder.is_held(index)
    }

    /// Advances the state machine: Idle starts recording, Recording starts
    /// looping (or goes back to Idle if nothing was recorded) and Looping
    /// stops the loop.
    pub fn toggle(&mut self) {
        let span = self.span.clone();
        let _enter = span.enter();

        match self.state {
            SessionState::Idle => self.start_recording(),
            SessionState::Recording => self.stop_recording(),
            SessionState::Looping => self.stop_looping(),
        }
    }

    fn start_recording(&mut self) {
        self.recorder.begin(self.clock.now());
        info!("Started recording.");
        self.transition(SessionState::Recording, RECORDING_MESSAGE);
    }

    fn stop_recording(&mut self) {
        let events = self.recorder.finish();
        let Some(plan) = LoopPlan::new(events, &self.tuning.timing) else {
            info!("Nothing was recorded.");
            self.transition(SessionState::Idle, IDLE_MESSAGE);
            return;
        };

        info!(
            events = plan.events().len(),
            period = format!("{:?}", plan.period()),
            "Stopped recording."
        );
        self.looper.start(plan);
        self.transition(SessionState::Looping, LOOPING_MESSAGE);
    }

    fn stop_looping(&mut self) {
        self.looper.stop();
        self.transition(SessionState::Idle, IDLE_MESSAGE);
    }

    fn transition(&mut self, state: SessionState, message: &str) {
        self.state = state;
        self.status.update(state, message);
    }

    /// Presses the piano voice with the given index. It sounds immediately in
    /// every state and is recorded when released if the press happened while
    /// recording. Pressing a voice that is already held does nothing.
    pub fn start_sustained(&mut self, index: usize) {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(voice) = voices::voice(VoiceKind::Sustained, index) else {
            warn!(index, "Unknown piano voice.");
            return;
        };
        if !self.recorder.press(voice, self.clock.now()) {
            return;
        }
        self.instruments.sustained(voice, self.tuning.sustained_hold);
    }

    /// Releases the piano voice with the given index.
    pub fn stop_sustained(&mut self, index: usize) {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(voice) = voices::voice(VoiceKind::Sustained, index) else {
            warn!(index, "Unknown piano voice.");
            return;
        };
        self.recorder.release(voice, self.clock.now());
    }

    /// Hits the drum with the given index, recording it while recording.
    pub fn trigger_percussive(&mut self, index: usize) {
        let span = self.span.clone();
        let _enter = span.enter();

        let Some(voice) = voices::voice(VoiceKind::Percussive, index) else {
            warn!(index, "Unknown drum voice.");
            return;
        };
        self.instruments.percussive(voice);
        self.recorder.hit(voice, self.clock.now());
    }
}
