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

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::Event;
use crate::voices::{self, VoiceKind};

const TOGGLE: &str = "t";
const TOGGLE_LONG: &str = "toggle";
const QUIT: &str = "q";
const QUIT_LONG: &str = "quit";

/// A controller that reads commands from stdin, one line at a time.
///
/// Each line holds whitespace separated commands: `t` toggles the session,
/// `+k` presses key `k`, `-k` releases it and a bare `k` taps it. Tapping a
/// piano key alternates between holding and releasing it. `q` stops reading.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads and forwards one line of commands. Returns false once the
    /// performer quits or the input ends.
    fn monitor_io<R, W>(
        events_tx: &Sender<Event>,
        held: &mut HashSet<char>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command ({}: toggle, <key>: tap, +<key>: press, -<key>: release, {}: quit): ",
            TOGGLE, QUIT,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        for token in input.split_whitespace() {
            let token = token.to_lowercase();
            let events = match token.as_str() {
                TOGGLE | TOGGLE_LONG => vec![Event::Toggle],
                QUIT | QUIT_LONG => return Ok(false),
                _ => match key_events(&token, held) {
                    Some(events) => events,
                    None => {
                        warn!(input = token, "Unrecognized input");
                        continue;
                    }
                },
            };

            for event in events {
                events_tx
                    .blocking_send(event)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            }
        }
        Ok(true)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a key command into press/release events.
fn key_events(token: &str, held: &mut HashSet<char>) -> Option<Vec<Event>> {
    let mut chars = token.chars();
    let (prefix, key) = match (chars.next(), chars.next(), chars.next()) {
        (Some(key), None, _) => (None, key),
        (Some(prefix @ ('+' | '-')), Some(key), None) => (Some(prefix), key),
        _ => return None,
    };
    let voice = voices::by_key(key)?;
    let key = voice.key;

    let events = match (prefix, voice.kind) {
        (Some('+'), _) => {
            held.insert(key);
            vec![Event::Press(key)]
        }
        (Some(_), _) => {
            held.remove(&key);
            vec![Event::Release(key)]
        }
        (None, VoiceKind::Percussive) => vec![Event::Press(key), Event::Release(key)],
        (None, VoiceKind::Sustained) => {
            if held.remove(&key) {
                vec![Event::Release(key)]
            } else {
                held.insert(key);
                vec![Event::Press(key)]
            }
        }
    };
    Some(events)
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            let mut held = HashSet::new();
            while Self::monitor_io(&events_tx, &mut held, io::stdin().lock(), io::stdout())? {}

            info!("Keyboard driver stopped.");
            Ok(())
        })
    }
}
