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
use serde::{Deserialize, Serialize};

use crate::notation::quantize::Grid;

/// How decoded notes are turned into a sheet.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Notation {
    /// Explicit key signature, sharps positive and flats negative.
    #[serde(skip_serializing_if = "Option::is_none")]
    key_signature: Option<i8>,

    /// Guess the key when no key signature is given (default: true).
    #[serde(skip_serializing_if = "Option::is_none")]
    detect_key: Option<bool>,

    /// Merge repeated strikes of the same key (default: false).
    #[serde(skip_serializing_if = "Option::is_none")]
    merge_repeated_notes: Option<bool>,

    /// Snap notes to this grid before anything else (default: off).
    #[serde(skip_serializing_if = "Option::is_none")]
    quantize: Option<Grid>,
}

impl Notation {
    pub fn new(
        key_signature: Option<i8>,
        detect_key: Option<bool>,
        merge_repeated_notes: Option<bool>,
        quantize: Option<Grid>,
    ) -> Notation {
        Notation {
            key_signature,
            detect_key,
            merge_repeated_notes,
            quantize,
        }
    }

    /// The explicit key signature, clamped to 7 sharps or flats.
    pub fn key_signature(&self) -> Option<i8> {
        self.key_signature.map(|key| key.clamp(-7, 7))
    }

    pub fn detect_key(&self) -> bool {
        self.detect_key.unwrap_or(true)
    }

    pub fn merge_repeated_notes(&self) -> bool {
        self.merge_repeated_notes.unwrap_or(false)
    }

    pub fn quantize(&self) -> Option<Grid> {
        self.quantize
    }
}
