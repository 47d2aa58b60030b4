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

/// Typed error for SMF decode failures. Any of these aborts the whole decode, callers never
/// see a partial note list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("not a MIDI file")]
    NotMidi,
    #[error("track {index} does not start with an MTrk chunk")]
    BadTrackTag { index: usize },
    #[error("truncated MIDI data")]
    Truncated,
    #[error("unsupported time division {0:#06x}")]
    UnsupportedDivision(u16),
    #[error("data byte without running status at offset {offset}")]
    MissingRunningStatus { offset: usize },
}
