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
use std::path::Path;
use std::time::Duration;

use crate::looper::LoopTiming;

mod error;
mod settings;

pub use self::error::ConfigError;
pub use self::settings::Settings;

/// How long a live piano note sounds when its key is pressed.
pub const DEFAULT_SUSTAINED_HOLD: Duration = Duration::from_secs(2);

/// How long a drum marker stays visible.
pub const DEFAULT_PERCUSSIVE_VISUAL: Duration = Duration::from_millis(800);

/// Resolved timing parameters for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Parameters for deriving loop periods.
    pub timing: LoopTiming,
    /// Audible duration of a live sustained voice.
    pub sustained_hold: Duration,
    /// Marker duration for percussive voices.
    pub percussive_visual: Duration,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            timing: LoopTiming::default(),
            sustained_hold: DEFAULT_SUSTAINED_HOLD,
            percussive_visual: DEFAULT_PERCUSSIVE_VISUAL,
        }
    }
}

/// Loads and resolves the tuning from a YAML file.
pub fn load_tuning(path: &Path) -> Result<Tuning, ConfigError> {
    Settings::deserialize(path)?.tuning()
}
