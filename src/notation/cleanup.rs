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

//! Cleanup for performances recorded from a keyboard, where the same key is often struck
//! repeatedly for what reads as one held note.
use std::collections::BTreeMap;

use tracing::debug;

use crate::note::Note;

/// Note lengths in eighth notes that merged notes are rounded up to.
const STANDARD_EIGHTHS: [f64; 8] = [0.5, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0];

/// Merges repeated strikes of the same pitch into one note and snaps durations to standard
/// lengths.
///
/// A note is folded into the previous note of the same pitch if it starts less than one beat
/// after that note ends, or overlaps it. The merged note keeps the louder velocity. Every
/// resulting duration is rounded up to the nearest standard length, capped at a whole note. The
/// output is sorted by start time, then pitch.
pub fn merge_repeated_notes(notes: &[Note], tempo: f64) -> Vec<Note> {
    let eighth = 30.0 / tempo;
    let beat = eighth * 2.0;

    let mut by_pitch: BTreeMap<u8, Vec<Note>> = BTreeMap::new();
    for note in notes {
        by_pitch.entry(note.pitch()).or_default().push(*note);
    }

    let mut merged = Vec::with_capacity(notes.len());
    for (pitch, mut group) in by_pitch {
        group.sort_by(|a, b| a.start_time().total_cmp(&b.start_time()));

        let mut iter = group.into_iter();
        let Some(first) = iter.next() else {
            continue;
        };
        let (mut start, mut end, mut velocity) =
            (first.start_time(), first.end_time(), first.velocity());

        for note in iter {
            if note.start_time() - end < beat {
                end = end.max(note.end_time());
                velocity = velocity.max(note.velocity());
                continue;
            }
            push_rounded(&mut merged, pitch, start, end, velocity, eighth);
            (start, end, velocity) = (note.start_time(), note.end_time(), note.velocity());
        }
        push_rounded(&mut merged, pitch, start, end, velocity, eighth);
    }

    merged.sort_by(|a, b| {
        a.start_time()
            .total_cmp(&b.start_time())
            .then(a.pitch().cmp(&b.pitch()))
    });
    debug!(
        before = notes.len(),
        after = merged.len(),
        "Merged repeated notes."
    );
    merged
}

fn push_rounded(notes: &mut Vec<Note>, pitch: u8, start: f64, end: f64, velocity: u8, eighth: f64) {
    let eighths = (end - start) / eighth;
    let rounded = STANDARD_EIGHTHS
        .iter()
        .copied()
        .find(|&standard| standard >= eighths)
        .unwrap_or(8.0);

    match Note::new(pitch, start, start + rounded * eighth, velocity) {
        Ok(note) => notes.push(note),
        Err(e) => debug!(err = %e, pitch, start, "Dropping note that can't be rounded."),
    }
}
