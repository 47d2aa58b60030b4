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

//! Vertical placement on the staff. Positions count diatonic steps from middle C, which is 0.
//! Each step is one line or space.
use serde::Serialize;

use crate::note::Hand;

/// Diatonic step within the octave for each pitch class. Sharps share the step of the natural
/// below them.
const DIATONIC_STEPS: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];

const SHARP_PITCH_CLASSES: [u8; 5] = [1, 3, 6, 8, 10];

/// Order sharps are added to a key signature.
pub const SHARP_ORDER: [char; 7] = ['F', 'C', 'G', 'D', 'A', 'E', 'B'];

/// Order flats are added to a key signature.
pub const FLAT_ORDER: [char; 7] = ['B', 'E', 'A', 'D', 'G', 'C', 'F'];

const TREBLE_SHARP_POSITIONS: [i32; 7] = [10, 7, 11, 8, 5, 9, 6];
const TREBLE_FLAT_POSITIONS: [i32; 7] = [6, 9, 5, 8, 4, 7, 3];
const BASS_SHARP_POSITIONS: [i32; 7] = [-4, -7, -3, -6, -9, -5, -8];
const BASS_FLAT_POSITIONS: [i32; 7] = [-8, -5, -9, -6, -10, -7, -11];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    Treble,
    Bass,
}

impl From<Hand> for Clef {
    fn from(hand: Hand) -> Clef {
        match hand {
            Hand::Treble => Clef::Treble,
            Hand::Bass => Clef::Bass,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Accidental {
    Sharp,
    Flat,
}

/// One accidental drawn at the start of a staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyAccidental {
    pub letter: char,
    pub accidental: Accidental,
    pub staff_position: i32,
}

/// Returns the staff position of a pitch.
pub fn staff_position(pitch: u8) -> i32 {
    let octave = i32::from(pitch / 12) - 5;
    octave * 7 + DIATONIC_STEPS[usize::from(pitch % 12)]
}

/// True if the pitch is a black key, written as a sharp.
pub fn is_sharp(pitch: u8) -> bool {
    SHARP_PITCH_CLASSES.contains(&(pitch % 12))
}

/// Lays out the key signature accidentals for a clef. Positive counts are sharps, negative are
/// flats, clamped to 7.
pub fn key_signature_layout(key_signature: i8, clef: Clef) -> Vec<KeyAccidental> {
    let count = usize::from(key_signature.unsigned_abs()).min(7);
    let (accidental, letters, positions) = match (key_signature >= 0, clef) {
        (true, Clef::Treble) => (Accidental::Sharp, &SHARP_ORDER, &TREBLE_SHARP_POSITIONS),
        (true, Clef::Bass) => (Accidental::Sharp, &SHARP_ORDER, &BASS_SHARP_POSITIONS),
        (false, Clef::Treble) => (Accidental::Flat, &FLAT_ORDER, &TREBLE_FLAT_POSITIONS),
        (false, Clef::Bass) => (Accidental::Flat, &FLAT_ORDER, &BASS_FLAT_POSITIONS),
    };

    letters
        .iter()
        .zip(positions.iter())
        .take(count)
        .map(|(&letter, &staff_position)| KeyAccidental {
            letter,
            accidental,
            staff_position,
        })
        .collect()
}
