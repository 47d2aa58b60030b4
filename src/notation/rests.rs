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

use crate::note::Note;

/// Gaps of this many beats or fewer don't produce a rest.
pub const MIN_REST_BEATS: f64 = 0.2;

/// The glyph a rest is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RestType {
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl RestType {
    /// Picks the single closest rest for a duration in beats. A 3 beat gap becomes one half
    /// rest, not a half and a quarter.
    pub fn from_beats(beats: f64) -> RestType {
        if beats >= 3.5 {
            RestType::Whole
        } else if beats >= 1.75 {
            RestType::Half
        } else if beats >= 0.875 {
            RestType::Quarter
        } else if beats >= 0.4375 {
            RestType::Eighth
        } else {
            RestType::Sixteenth
        }
    }
}

/// A silence in one hand of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestNote {
    /// Start of the rest in seconds.
    pub start_time: f64,
    /// Length of the rest in beats.
    pub duration: f64,
    #[serde(rename = "type")]
    pub rest_type: RestType,
}

impl RestNote {
    fn new(start_time: f64, duration: f64) -> RestNote {
        RestNote {
            start_time,
            duration,
            rest_type: RestType::from_beats(duration),
        }
    }
}

/// Computes the rests for one hand in one measure. `notes` must be sorted by start time.
///
/// An empty hand gets one rest covering the whole measure. Otherwise rests fill the gap before
/// the first note, the gaps between notes and the gap after the last note, skipping anything of
/// [`MIN_REST_BEATS`] or less. Gaps are measured from the latest end seen so far, so a rest never
/// lands under a note that is still sounding.
pub fn compute_rests(
    notes: &[Note],
    measure_start: f64,
    measure_end: f64,
    seconds_per_beat: f64,
) -> Vec<RestNote> {
    let to_beats = |seconds: f64| seconds / seconds_per_beat;

    let Some(first) = notes.first() else {
        return vec![RestNote::new(
            measure_start,
            to_beats(measure_end - measure_start),
        )];
    };

    let mut rests = Vec::new();
    let mut push_gap = |from: f64, to: f64| {
        let beats = to_beats(to - from);
        if beats > MIN_REST_BEATS {
            rests.push(RestNote::new(from, beats));
        }
    };

    push_gap(measure_start, first.start_time());

    let mut sounding_until = first.end_time();
    for note in &notes[1..] {
        push_gap(sounding_until, note.start_time());
        sounding_until = sounding_until.max(note.end_time());
    }

    push_gap(sounding_until, measure_end);

    rests
}
