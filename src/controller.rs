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
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

use tokio::sync::mpsc::{self, Sender};
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, span, warn, Instrument, Level};

use crate::session::Session;
use crate::voices::{self, VoiceKind};

pub mod keyboard;

/// Controller events that will trigger behavior in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Advances the record/loop state machine.
    Toggle,

    /// A key went down.
    Press(char),

    /// A key came up.
    Release(char),
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Feeds input events into a session.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver. The controller takes
    /// ownership of the session and is the only thing that touches it from
    /// then on.
    pub fn new(session: Session, driver: Arc<dyn Driver>) -> Controller {
        Controller {
            handle: tokio::spawn(
                Controller::trigger_events(session, driver)
                    .instrument(span!(Level::INFO, "controller")),
            ),
        }
    }

    /// Join will block until the controller finishes, which happens once the
    /// driver stops sending events.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Triggers session operations by watching the driver and getting events from it.
    async fn trigger_events(mut session: Session, driver: Arc<dyn Driver>) {
        let (events_tx, mut events_rx) = mpsc::channel(16);
        let join_handle = driver.monitor_events(events_tx);

        info!(state = %session.state(), "Controller started.");

        // Keys currently down. Key repeat shows up as repeated presses.
        let mut pressed: HashSet<char> = HashSet::new();
        while let Some(event) = events_rx.recv().await {
            info!(event = format!("{:?}", event), "Received event.");
            Controller::dispatch(&mut session, &mut pressed, event);
        }

        info!("Controller closing.");
        match join_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(err = %e, "Event monitor failed"),
            Err(e) => error!("Error waiting for event monitor to stop: {}", e),
        }
    }

    fn dispatch(session: &mut Session, pressed: &mut HashSet<char>, event: Event) {
        match event {
            Event::Toggle => session.toggle(),
            Event::Press(key) => {
                let Some(voice) = voices::by_key(key) else {
                    warn!(key = %key, "Key is not bound to a voice");
                    return;
                };
                if !pressed.insert(voice.key) {
                    return;
                }
                match voice.kind {
                    VoiceKind::Sustained => session.start_sustained(voice.index),
                    VoiceKind::Percussive => session.trigger_percussive(voice.index),
                }
            }
            Event::Release(key) => {
                let Some(voice) = voices::by_key(key) else {
                    warn!(key = %key, "Key is not bound to a voice");
                    return;
                };
                pressed.remove(&voice.key);
                if voice.kind == VoiceKind::Sustained {
                    session.stop_sustained(voice.index);
                }
            }
        }
    }
}
