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

/// Semitone offsets of the major scale from its root.
const MAJOR_SCALE: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Key signature (sharps positive, flats negative) for the major key on each root.
const KEY_FOR_ROOT: [i8; 12] = [0, -5, 2, -3, 4, -1, 6, 1, -4, 3, -2, 5];

const SHARP_SPELLING: [(char, i8); 12] = [
    ('C', 0),
    ('C', 1),
    ('D', 0),
    ('D', 1),
    ('E', 0),
    ('F', 0),
    ('F', 1),
    ('G', 0),
    ('G', 1),
    ('A', 0),
    ('A', 1),
    ('B', 0),
];

const FLAT_SPELLING: [(char, i8); 12] = [
    ('C', 0),
    ('D', -1),
    ('D', 0),
    ('E', -1),
    ('E', 0),
    ('F', 0),
    ('G', -1),
    ('G', 0),
    ('A', -1),
    ('A', 0),
    ('B', -1),
    ('B', 0),
];

/// A pitch written as a letter, an alteration and an octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpelledPitch {
    pub step: char,
    /// -1 for flat, 1 for sharp.
    pub alter: i8,
    /// Scientific octave, middle C is C4.
    pub octave: i8,
}

impl std::fmt::Display for SpelledPitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accidental = match self.alter {
            1 => "#",
            -1 => "b",
            _ => "",
        };
        write!(f, "{}{}{}", self.step, accidental, self.octave)
    }
}

/// Guesses the key signature of a set of notes.
///
/// Each major key scores one point for every note whose pitch class is in its scale. The best
/// scoring key wins, ties going to the lowest root. No notes gives C major.
pub fn detect_key_signature(notes: &[Note]) -> i8 {
    let mut histogram = [0usize; 12];
    for note in notes {
        histogram[usize::from(note.pitch() % 12)] += 1;
    }

    let mut best_root = 0;
    let mut best_score = 0;
    for root in 0..12 {
        let score: usize = MAJOR_SCALE
            .iter()
            .map(|offset| histogram[(root + offset) % 12])
            .sum();
        if score > best_score {
            best_root = root;
            best_score = score;
        }
    }

    KEY_FOR_ROOT[best_root]
}

/// Spells a pitch for the given key: sharps in sharp keys and C major, flats in flat keys.
pub fn spell_pitch(pitch: u8, key_signature: i8) -> SpelledPitch {
    let table = if key_signature >= 0 {
        &SHARP_SPELLING
    } else {
        &FLAT_SPELLING
    };
    let (step, alter) = table[usize::from(pitch % 12)];
    SpelledPitch {
        step,
        alter,
        octave: (pitch / 12) as i8 - 1,
    }
}
