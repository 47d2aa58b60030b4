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

//! The sheet model. Decoded notes are cut into fixed-length measures, split by hand, and the
//! silences between them are filled in with rests.
use serde::Serialize;
use tracing::{debug, warn};

use crate::note::{self, Hand, Note};

pub mod cleanup;
pub mod key;
pub mod quantize;
mod rests;
pub mod staff;

pub use rests::{compute_rests, RestNote, RestType, MIN_REST_BEATS};

/// The most measures a sheet will have. Notes past this are kept but not placed.
pub const MAX_MEASURES: usize = 999;

/// Notes starting this close before a barline belong to the next measure.
pub const BOUNDARY_TOLERANCE: f64 = 0.01;

const FALLBACK_TEMPO: f64 = 120.0;
const FALLBACK_BEATS_PER_MEASURE: u32 = 4;

/// One bar of music.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    number: usize,
    start_time: f64,
    end_time: f64,
    treble_notes: Vec<Note>,
    bass_notes: Vec<Note>,
    treble_rests: Vec<RestNote>,
    bass_rests: Vec<RestNote>,
}

impl Measure {
    /// The 1-based measure number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Notes for the given hand, sorted by start time.
    pub fn notes(&self, hand: Hand) -> &[Note] {
        match hand {
            Hand::Treble => &self.treble_notes,
            Hand::Bass => &self.bass_notes,
        }
    }

    pub fn rests(&self, hand: Hand) -> &[RestNote] {
        match hand {
            Hand::Treble => &self.treble_rests,
            Hand::Bass => &self.bass_rests,
        }
    }
}

/// The full sheet model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    all_notes: Vec<Note>,
    measures: Vec<Measure>,
    total_duration: f64,
    tempo: f64,
    beats_per_measure: u32,
    beat_unit: u32,
    key_signature: i8,
}

impl SheetData {
    /// Every note, sorted by start time.
    pub fn all_notes(&self) -> &[Note] {
        &self.all_notes
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    /// Latest note end in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Tempo in beats per minute.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub fn beat_unit(&self) -> u32 {
        self.beat_unit
    }

    /// Signed count of sharps (positive) or flats (negative).
    pub fn key_signature(&self) -> i8 {
        self.key_signature
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo
    }

    pub fn measure_duration(&self) -> f64 {
        self.seconds_per_beat() * f64::from(self.beats_per_measure)
    }

    /// Index into [`SheetData::measures`] of the measure a note starting at `time` belongs to.
    pub fn measure_index_at(&self, time: f64) -> Option<usize> {
        measure_index(time, self.measure_duration(), self.measures.len())
    }

    pub fn is_empty(&self) -> bool {
        self.all_notes.is_empty()
    }
}

fn measure_index(start: f64, measure_duration: f64, count: usize) -> Option<usize> {
    let index = ((start + BOUNDARY_TOLERANCE) / measure_duration).floor();
    if !(0.0..count as f64).contains(&index) {
        return None;
    }
    Some(index as usize)
}

/// Builds the sheet model from decoded notes.
///
/// Measures are laid out back to back from zero. Each note is placed in exactly one measure and
/// each hand of each measure gets its rests. A tempo that isn't a positive number, or zero beats
/// per measure, falls back to 4 beats at 120 BPM.
pub fn build_sheet_data(
    notes: &[Note],
    tempo: f64,
    beats_per_measure: u32,
    beat_unit: u32,
    key_signature: i8,
) -> SheetData {
    let (tempo, beats_per_measure) = if tempo.is_finite() && tempo > 0.0 && beats_per_measure > 0
    {
        (tempo, beats_per_measure)
    } else {
        warn!(
            tempo,
            beats_per_measure, "Invalid meter, using 4 beats at 120 BPM."
        );
        (FALLBACK_TEMPO, FALLBACK_BEATS_PER_MEASURE)
    };

    let mut sheet = SheetData {
        all_notes: notes.to_vec(),
        measures: Vec::new(),
        total_duration: 0.0,
        tempo,
        beats_per_measure,
        beat_unit,
        key_signature: key_signature.clamp(-7, 7),
    };
    if sheet.all_notes.is_empty() {
        return sheet;
    }
    note::sort_by_start(&mut sheet.all_notes);

    sheet.total_duration = sheet
        .all_notes
        .iter()
        .map(Note::end_time)
        .fold(0.0, f64::max);

    let seconds_per_beat = sheet.seconds_per_beat();
    let measure_duration = sheet.measure_duration();
    let count = ((sheet.total_duration / measure_duration).ceil() as usize).clamp(1, MAX_MEASURES);

    let mut hands: Vec<[Vec<Note>; 2]> = vec![[Vec::new(), Vec::new()]; count];
    let mut unplaced = 0;
    for note in &sheet.all_notes {
        match measure_index(note.start_time(), measure_duration, count) {
            Some(index) => hands[index][note.hand().index()].push(*note),
            None => unplaced += 1,
        }
    }
    if unplaced > 0 {
        warn!(
            unplaced,
            max_measures = MAX_MEASURES,
            "Some notes fall past the last measure and won't be shown."
        );
    }

    sheet.measures = hands
        .into_iter()
        .enumerate()
        .map(|(index, [treble, bass])| {
            let start_time = index as f64 * measure_duration;
            let end_time = (index + 1) as f64 * measure_duration;
            Measure {
                number: index + 1,
                start_time,
                end_time,
                treble_rests: compute_rests(&treble, start_time, end_time, seconds_per_beat),
                bass_rests: compute_rests(&bass, start_time, end_time, seconds_per_beat),
                treble_notes: treble,
                bass_notes: bass,
            }
        })
        .collect();

    debug!(
        notes = sheet.all_notes.len(),
        measures = sheet.measures.len(),
        total_duration = sheet.total_duration,
        "Built sheet data."
    );

    sheet
}
