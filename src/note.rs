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
use serde::Serialize;

/// Notes at or above this pitch are written on the treble staff.
pub const MIDDLE_C: u8 = 60;

/// The staff a note is written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    /// Right hand, treble staff.
    Treble,
    /// Left hand, bass staff.
    Bass,
}

impl Hand {
    /// Splits at middle C: 60 and up is treble, everything below is bass.
    pub fn for_pitch(pitch: u8) -> Hand {
        if pitch >= MIDDLE_C {
            Hand::Treble
        } else {
            Hand::Bass
        }
    }

    /// Numeric form of the hand (0 = treble, 1 = bass).
    pub fn index(&self) -> usize {
        match self {
            Hand::Treble => 0,
            Hand::Bass => 1,
        }
    }
}

/// Reasons a note can't be constructed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidNote {
    #[error("pitch {0} is outside 0-127")]
    Pitch(u8),
    #[error("velocity {0} is outside 1-127")]
    Velocity(u8),
    #[error("note must end after it starts (start {start}, end {end})")]
    Timing { start: f64, end: f64 },
}

/// A single sounding note. Times are in seconds from the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pitch: u8,
    start_time: f64,
    end_time: f64,
    velocity: u8,
    hand: Hand,
}

impl Note {
    /// Creates a new note. The hand is derived from the pitch.
    pub fn new(pitch: u8, start_time: f64, end_time: f64, velocity: u8) -> Result<Note, InvalidNote> {
        if pitch > 127 {
            return Err(InvalidNote::Pitch(pitch));
        }
        if velocity == 0 || velocity > 127 {
            return Err(InvalidNote::Velocity(velocity));
        }
        if !start_time.is_finite() || !end_time.is_finite() || end_time <= start_time {
            return Err(InvalidNote::Timing {
                start: start_time,
                end: end_time,
            });
        }

        Ok(Note {
            pitch,
            start_time,
            end_time,
            velocity,
            hand: Hand::for_pitch(pitch),
        })
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    /// Length of the note in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Stable sort by start time. Notes that start together keep their input order.
pub(crate) fn sort_by_start(notes: &mut [Note]) {
    notes.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}
