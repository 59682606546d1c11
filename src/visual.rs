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
use std::{error::Error, io, time::Duration};

use parking_lot::Mutex;

/// Renders a transient marker for a triggered voice.
pub trait VisualFeedback: Send + Sync + 'static {
    /// Shows a marker with the given label and color that lasts for `duration`.
    /// `lane` is the voice's lane within its group, `percussive` selects the
    /// drum lanes rather than the piano lanes.
    fn show(
        &self,
        label: &str,
        color: &str,
        duration: Duration,
        lane: usize,
        percussive: bool,
    ) -> Result<(), Box<dyn Error>>;
}

/// Number of milliseconds each cell of a terminal marker stands for.
const MS_PER_CELL: u128 = 100;

/// The longest marker drawn, in cells.
const MAX_CELLS: usize = 40;

/// Draws markers as single lines of text, one per trigger.
pub struct TerminalFeedback<W: io::Write + Send + 'static> {
    writer: Mutex<W>,
}

impl<W: io::Write + Send + 'static> TerminalFeedback<W> {
    pub fn new(writer: W) -> TerminalFeedback<W> {
        TerminalFeedback {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the feedback and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: io::Write + Send + 'static> VisualFeedback for TerminalFeedback<W> {
    fn show(
        &self,
        label: &str,
        color: &str,
        duration: Duration,
        lane: usize,
        percussive: bool,
    ) -> Result<(), Box<dyn Error>> {
        let cells = (duration.as_millis() / MS_PER_CELL).clamp(1, MAX_CELLS as u128) as usize;
        let (group, indent) = if percussive {
            ("drum", "  ")
        } else {
            ("piano", "")
        };

        let mut writer = self.writer.lock();
        writeln!(
            writer,
            "{}{:<5} {:<3} {:width$}{} {}ms {}",
            indent,
            group,
            label,
            "",
            "#".repeat(cells),
            duration.as_millis(),
            color,
            width = lane,
        )?;
        writer.flush()?;
        Ok(())
    }
}
