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

//! Snaps loosely played notes onto a rhythmic grid so they read as clean note values.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::note::Note;

/// Note lengths in sixteenth notes that quantized durations are rounded to. On a tie the longer
/// length wins.
const STANDARD_SIXTEENTHS: [f64; 9] = [16.0, 12.0, 8.0, 6.0, 4.0, 3.0, 2.0, 1.0, 0.5];

/// The grid spacing.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Grid {
    #[serde(rename = "32nd")]
    ThirtySecond,
    #[default]
    #[serde(rename = "16th")]
    Sixteenth,
    #[serde(rename = "8th")]
    Eighth,
    #[serde(rename = "quarter")]
    Quarter,
}

impl Grid {
    /// The grid spacing in quarter notes.
    fn quarters(self) -> f64 {
        match self {
            Grid::ThirtySecond => 0.125,
            Grid::Sixteenth => 0.25,
            Grid::Eighth => 0.5,
            Grid::Quarter => 1.0,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Grid::ThirtySecond => "32nd",
            Grid::Sixteenth => "16th",
            Grid::Eighth => "8th",
            Grid::Quarter => "quarter",
        })
    }
}

/// Moves every note start and end to the nearest grid line at `tempo` BPM.
///
/// A note whose end snaps onto or before its start is given one grid step. The snapped duration
/// is then rounded to the nearest standard length, from a 32nd up to a whole note. Velocities
/// are kept and the output is sorted by start time, then pitch.
pub fn quantize_notes(notes: &[Note], tempo: f64, grid: Grid) -> Vec<Note> {
    if !tempo.is_finite() || tempo <= 0.0 {
        warn!(tempo, "Unusable tempo, leaving notes unquantized.");
        return notes.to_vec();
    }

    let quarter = 60.0 / tempo;
    let step = quarter * grid.quarters();

    let mut quantized = Vec::with_capacity(notes.len());
    for note in notes {
        let start = (note.start_time() / step).round() * step;
        let mut end = (note.end_time() / step).round() * step;
        if end <= start {
            end = start + step;
        }

        let duration = nearest_standard(end - start, quarter);
        match Note::new(note.pitch(), start, start + duration, note.velocity()) {
            Ok(note) => quantized.push(note),
            Err(e) => debug!(
                err = %e,
                pitch = note.pitch(),
                start,
                "Dropping note that can't be quantized."
            ),
        }
    }

    quantized.sort_by(|a, b| {
        a.start_time()
            .total_cmp(&b.start_time())
            .then(a.pitch().cmp(&b.pitch()))
    });
    debug!(notes = quantized.len(), %grid, "Quantized notes.");
    quantized
}

fn nearest_standard(duration: f64, quarter: f64) -> f64 {
    let sixteenths = duration / quarter * 4.0;
    let mut nearest = STANDARD_SIXTEENTHS[0];
    for standard in STANDARD_SIXTEENTHS {
        if (standard - sixteenths).abs() < (nearest - sixteenths).abs() {
            nearest = standard;
        }
    }
    nearest * quarter / 4.0
}
