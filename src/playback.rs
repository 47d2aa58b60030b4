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

//! Playback cursor tracking. The scheduler doesn't make any sound itself. It drives a
//! [`Transport`] and works out which note and measure the transport is currently on.
use std::{error::Error, fmt};

use serde::Serialize;

use crate::notation::SheetData;

mod clock;
pub mod mock;
mod scheduler;

pub use clock::ClockTransport;
pub use scheduler::{Scheduler, MAX_TEMPO, MIN_TEMPO};

/// Something that produces sound for a list of events and reports how far along it is.
pub trait Transport: fmt::Display + Send + Sync {
    /// Replaces the events to play.
    fn load_events(&self, events: &[PlaybackEvent]) -> Result<(), Box<dyn Error>>;

    /// Starts or resumes playback.
    fn play(&self) -> Result<(), Box<dyn Error>>;

    /// Pauses playback, keeping the position.
    fn pause(&self) -> Result<(), Box<dyn Error>>;

    /// Stops playback and rewinds to the start.
    fn stop(&self) -> Result<(), Box<dyn Error>>;

    /// Moves to the given position in seconds.
    fn seek_to(&self, seconds: f64) -> Result<(), Box<dyn Error>>;

    /// Sets the tempo multiplier.
    fn set_tempo(&self, multiplier: f64) -> Result<(), Box<dyn Error>>;

    /// Seconds elapsed since the start of playback.
    fn position(&self) -> f64;
}

/// A note as the scheduler sees it. Times are unscaled seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackEvent {
    /// Index of the note in [`SheetData::all_notes`].
    pub note_index: usize,
    pub pitch: u8,
    pub velocity: u8,
    pub start_time: f64,
    pub end_time: f64,
    /// Index of the note's measure in [`SheetData::measures`].
    pub measure_index: usize,
}

impl PlaybackEvent {
    /// Start time at the given tempo multiplier.
    pub fn scaled_start(&self, multiplier: f64) -> f64 {
        self.start_time / multiplier
    }

    /// End time at the given tempo multiplier.
    pub fn scaled_end(&self, multiplier: f64) -> f64 {
        self.end_time / multiplier
    }
}

/// Builds one event per note, in note order. Notes that didn't fit in a measure are attributed to
/// the last one.
pub fn build_events(sheet: &SheetData) -> Vec<PlaybackEvent> {
    let last_measure = sheet.measures().len().saturating_sub(1);
    sheet
        .all_notes()
        .iter()
        .enumerate()
        .map(|(note_index, note)| PlaybackEvent {
            note_index,
            pitch: note.pitch(),
            velocity: note.velocity(),
            start_time: note.start_time(),
            end_time: note.end_time(),
            measure_index: sheet
                .measure_index_at(note.start_time())
                .unwrap_or(last_measure),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Stopped => "stopped",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        };
        write!(f, "{}", name)
    }
}

/// A snapshot of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Transport position in seconds.
    pub current_position: f64,
    /// Unscaled length of the sheet in seconds.
    pub total_duration: f64,
    pub tempo_multiplier: f64,
    /// The note under the cursor, if one is sounding.
    pub current_note_index: Option<usize>,
    pub current_measure: usize,
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState {
            status: PlaybackStatus::Stopped,
            current_position: 0.0,
            total_duration: 0.0,
            tempo_multiplier: 1.0,
            current_note_index: None,
            current_measure: 0,
        }
    }
}

/// Published to subscribers as playback progresses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackUpdate {
    #[serde(rename_all = "camelCase")]
    Position {
        position: f64,
        note_index: Option<usize>,
        measure_index: usize,
    },
    /// Playback reached the end of the sheet. Sent once per run.
    Finished,
}
