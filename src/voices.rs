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

//! The fixed voice tables: nine piano notes on the home row and seven drums on
//! the bottom row.

use std::fmt;

/// How a voice behaves once it has been triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceKind {
    /// Sounds for as long as its key is held (piano).
    Sustained,
    /// Sounds for a fixed nominal time no matter how long the key is held (drums).
    Percussive,
}

/// A single playable voice.
#[derive(Debug, PartialEq, Eq)]
pub struct Voice {
    /// Which table this voice belongs to.
    pub kind: VoiceKind,
    /// The index of the voice within its table. Unique per table, not globally.
    pub index: usize,
    /// The note name shown to the performer.
    pub label: &'static str,
    /// The display color, as a hex string.
    pub color: &'static str,
    /// The key that plays this voice.
    pub key: char,
}

impl Voice {
    const fn new(
        kind: VoiceKind,
        index: usize,
        label: &'static str,
        color: &'static str,
        key: char,
    ) -> Voice {
        Voice {
            kind,
            index,
            label,
            color,
            key,
        }
    }

    /// The visual lane for this voice. Lanes are numbered per table.
    pub fn lane(&self) -> usize {
        self.index
    }

    /// Returns true if this is a drum voice.
    pub fn is_percussive(&self) -> bool {
        self.kind == VoiceKind::Percussive
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.key)
    }
}

/// The piano voices.
pub static PIANO: [Voice; 9] = [
    Voice::new(VoiceKind::Sustained, 0, "C4", "#ff6b6b", 'a'),
    Voice::new(VoiceKind::Sustained, 1, "D4", "#4ecdc4", 's'),
    Voice::new(VoiceKind::Sustained, 2, "E4", "#45b7d1", 'd'),
    Voice::new(VoiceKind::Sustained, 3, "F4", "#f9ca24", 'f'),
    Voice::new(VoiceKind::Sustained, 4, "G4", "#f0932b", 'g'),
    Voice::new(VoiceKind::Sustained, 5, "A4", "#eb4d4d", 'h'),
    Voice::new(VoiceKind::Sustained, 6, "B4", "#6c5ce7", 'j'),
    Voice::new(VoiceKind::Sustained, 7, "C5", "#a29bfe", 'k'),
    Voice::new(VoiceKind::Sustained, 8, "D5", "#fd79a8", 'l'),
];

/// The drum voices.
pub static DRUMS: [Voice; 7] = [
    Voice::new(VoiceKind::Percussive, 0, "C2", "#e17055", 'z'),
    Voice::new(VoiceKind::Percussive, 1, "D2", "#74b9ff", 'x'),
    Voice::new(VoiceKind::Percussive, 2, "E2", "#00b894", 'c'),
    Voice::new(VoiceKind::Percussive, 3, "F2", "#fdcb6e", 'v'),
    Voice::new(VoiceKind::Percussive, 4, "G2", "#6c5ce7", 'b'),
    Voice::new(VoiceKind::Percussive, 5, "A2", "#fd79a8", 'n'),
    Voice::new(VoiceKind::Percussive, 6, "B2", "#55a3ff", 'm'),
];

/// Looks up a voice by kind and table index.
pub fn voice(kind: VoiceKind, index: usize) -> Option<&'static Voice> {
    match kind {
        VoiceKind::Sustained => PIANO.get(index),
        VoiceKind::Percussive => DRUMS.get(index),
    }
}

/// Looks up the voice bound to the given key. Matching is case insensitive.
pub fn by_key(key: char) -> Option<&'static Voice> {
    let key = key.to_ascii_lowercase();
    all().find(|voice| voice.key == key)
}

/// Every voice, piano first.
pub fn all() -> impl Iterator<Item = &'static Voice> {
    PIANO.iter().chain(DRUMS.iter())
}
