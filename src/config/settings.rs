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

use config::{Config, File, FileFormat};
use duration_string::DurationString;
use serde::Deserialize;

use super::{ConfigError, Tuning, DEFAULT_PERCUSSIVE_VISUAL, DEFAULT_SUSTAINED_HOLD};
use crate::looper::{LoopTiming, DEFAULT_MINIMUM_PERIOD, DEFAULT_SEAM_GAP, PERCUSSIVE_END_PAD};

/// A YAML representation of the session settings. Every field is optional.
#[derive(Deserialize, Default)]
pub struct Settings {
    /// Loop period parameters.
    #[serde(rename = "loop")]
    looping: Option<LoopSettings>,

    /// Live playback parameters.
    performance: Option<PerformanceSettings>,
}

#[derive(Deserialize, Default)]
struct LoopSettings {
    /// The shortest loop that will be played.
    minimum_period: Option<String>,
    /// Silence added after the last event of a loop.
    seam_gap: Option<String>,
    /// How long a drum is assumed to ring when working out a loop's end.
    percussive_end_pad: Option<String>,
}

#[derive(Deserialize, Default)]
struct PerformanceSettings {
    /// How long a live piano note sounds.
    sustained_hold: Option<String>,
    /// How long a drum marker is shown.
    percussive_visual: Option<String>,
}

impl Settings {
    /// Parse settings from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// Parse settings from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// Resolves the settings, filling in defaults for anything unset.
    pub fn tuning(&self) -> Result<Tuning, ConfigError> {
        let looping = self.looping.as_ref();
        let performance = self.performance.as_ref();

        let timing = LoopTiming {
            minimum_period: parse_duration(
                "loop.minimum_period",
                looping.and_then(|l| l.minimum_period.as_deref()),
                DEFAULT_MINIMUM_PERIOD,
            )?,
            seam_gap: parse_duration(
                "loop.seam_gap",
                looping.and_then(|l| l.seam_gap.as_deref()),
                DEFAULT_SEAM_GAP,
            )?,
            percussive_end_pad: parse_duration(
                "loop.percussive_end_pad",
                looping.and_then(|l| l.percussive_end_pad.as_deref()),
                PERCUSSIVE_END_PAD,
            )?,
        };
        if timing.minimum_period.is_zero() {
            return Err(ConfigError::Invalid {
                field: "loop.minimum_period",
                reason: "the loop period must be greater than zero".to_string(),
            });
        }

        Ok(Tuning {
            timing,
            sustained_hold: parse_duration(
                "performance.sustained_hold",
                performance.and_then(|p| p.sustained_hold.as_deref()),
                DEFAULT_SUSTAINED_HOLD,
            )?,
            percussive_visual: parse_duration(
                "performance.percussive_visual",
                performance.and_then(|p| p.percussive_visual.as_deref()),
                DEFAULT_PERCUSSIVE_VISUAL,
            )?,
        })
    }
}

fn parse_duration(
    field: &'static str,
    value: Option<&str>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match value {
        Some(value) => Ok(DurationString::from_string(value.to_string())
            .map_err(|e| ConfigError::Duration {
                field,
                value: value.to_string(),
                reason: e.to_string(),
            })?
            .into()),
        None => Ok(default),
    }
}
