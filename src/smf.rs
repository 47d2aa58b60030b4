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
//! Standard MIDI File decoding.
//!
//! The decoder flattens every track into a single list of notes in seconds. A single global
//! tempo is assumed: tick to second conversion uses whatever tempo was last seen at the time
//! a note is finished, so files with tempo changes come out with one uniform tempo.
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::note::{self, Note};

use self::reader::Reader;

pub mod error;
mod reader;

pub use error::FormatError;

/// 120 BPM, used until a tempo meta event says otherwise.
pub const DEFAULT_TEMPO: u32 = 500_000;

const MICROS_PER_MINUTE: f64 = 60_000_000.0;
const MICROS_PER_SECOND: f64 = 1_000_000.0;

const META_TEMPO: u8 = 0x51;
const META_TIME_SIGNATURE: u8 = 0x58;

/// The result of decoding an SMF buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMidi {
    /// All notes across all tracks, sorted by start time.
    pub notes: Vec<Note>,
    /// Tempo in beats per minute.
    pub tempo_bpm: f64,
    /// Numerator of the time signature.
    pub beats_per_measure: u32,
    /// Denominator of the time signature.
    pub beat_unit: u32,
}

struct Header {
    format: u16,
    tracks: u16,
    ticks_per_beat: u16,
}

/// Tempo and time signature are file-wide; meta events in any track overwrite them.
struct Globals {
    tempo: u32,
    beats_per_measure: u32,
    beat_unit: u32,
}

impl Default for Globals {
    fn default() -> Self {
        Globals {
            tempo: DEFAULT_TEMPO,
            beats_per_measure: 4,
            beat_unit: 4,
        }
    }
}

impl Globals {
    fn apply_meta(&mut self, kind: u8, data: &[u8]) {
        match (kind, data.len()) {
            (META_TEMPO, 3) => {
                let tempo = u32::from_be_bytes([0, data[0], data[1], data[2]]);
                if tempo == 0 {
                    debug!("ignoring zero tempo");
                    return;
                }
                self.tempo = tempo;
            }
            (META_TIME_SIGNATURE, 4) => match 1u32.checked_shl(u32::from(data[1])) {
                Some(beat_unit) if data[0] > 0 => {
                    self.beats_per_measure = u32::from(data[0]);
                    self.beat_unit = beat_unit;
                }
                _ => debug!(
                    numerator = data[0],
                    exponent = data[1],
                    "ignoring unusable time signature"
                ),
            },
            (META_TEMPO | META_TIME_SIGNATURE, length) => {
                debug!(kind, length, "ignoring meta event with the wrong length")
            }
            _ => {}
        }
    }

    fn seconds(&self, ticks: u64, ticks_per_beat: u16) -> f64 {
        ticks as f64 / f64::from(ticks_per_beat) * (f64::from(self.tempo) / MICROS_PER_SECOND)
    }
}

/// A note-on waiting for its note-off.
struct PendingNote {
    start_tick: u64,
    velocity: u8,
}

/// Decodes raw SMF bytes into a flat, time-sorted note list plus tempo and time signature.
pub fn decode(data: &[u8]) -> Result<DecodedMidi, FormatError> {
    let mut reader = Reader::new(data);
    let header = read_header(&mut reader)?;

    let mut globals = Globals::default();
    let mut notes = Vec::new();
    for index in 0..usize::from(header.tracks) {
        if reader.take(4)? != b"MTrk" {
            return Err(FormatError::BadTrackTag { index });
        }
        let length = reader.u32()? as usize;
        let mut track = reader.region(length);
        decode_track(&mut track, header.ticks_per_beat, &mut globals, &mut notes)?;
    }

    note::sort_by_start(&mut notes);
    let tempo_bpm = MICROS_PER_MINUTE / f64::from(globals.tempo);

    info!(
        format = header.format,
        tracks = header.tracks,
        notes = notes.len(),
        tempo_bpm,
        "Decoded MIDI file."
    );

    Ok(DecodedMidi {
        notes,
        tempo_bpm,
        beats_per_measure: globals.beats_per_measure,
        beat_unit: globals.beat_unit,
    })
}

fn read_header(reader: &mut Reader) -> Result<Header, FormatError> {
    match reader.take(4) {
        Ok(tag) if tag == b"MThd" => {}
        _ => return Err(FormatError::NotMidi),
    }

    // The header length is always 6 and isn't checked.
    reader.u32()?;
    let format = reader.u16()?;
    let tracks = reader.u16()?;
    let division = reader.u16()?;

    // SMPTE divisions (top bit set) aren't supported, and zero ticks per beat is meaningless.
    if division & 0x8000 != 0 || division == 0 {
        return Err(FormatError::UnsupportedDivision(division));
    }

    Ok(Header {
        format,
        tracks,
        ticks_per_beat: division & 0x7FFF,
    })
}

fn decode_track(
    track: &mut Reader,
    ticks_per_beat: u16,
    globals: &mut Globals,
    notes: &mut Vec<Note>,
) -> Result<(), FormatError> {
    let mut pending: HashMap<u8, PendingNote> = HashMap::new();
    let mut running_status: Option<u8> = None;
    let mut tick: u64 = 0;

    while !track.is_empty() {
        tick += u64::from(track.vlq()?);

        let offset = track.offset();
        let mut status = track.u8()?;
        if status < 0x80 {
            status = running_status.ok_or(FormatError::MissingRunningStatus { offset })?;
            // The byte we just read is the first data byte.
            track.unread();
        }

        match status & 0xF0 {
            0x80 | 0x90 => {
                running_status = Some(status);
                let key = track.u8()?;
                let velocity = track.u8()?;

                if status & 0xF0 == 0x90 && velocity > 0 {
                    // One sounding note per pitch; a repeated note-on replaces the earlier one.
                    pending.insert(
                        key,
                        PendingNote {
                            start_tick: tick,
                            velocity,
                        },
                    );
                } else if let Some(on) = pending.remove(&key) {
                    let start = globals.seconds(on.start_tick, ticks_per_beat);
                    let end = globals.seconds(tick, ticks_per_beat);
                    match Note::new(key, start, end, on.velocity) {
                        Ok(note) => notes.push(note),
                        Err(e) => debug!(err = e.to_string(), "Dropping note."),
                    }
                }
            }
            0xA0 | 0xB0 | 0xE0 => {
                running_status = Some(status);
                track.skip(2)?;
            }
            0xC0 | 0xD0 => {
                running_status = Some(status);
                track.skip(1)?;
            }
            _ => match status {
                0xFF => {
                    let kind = track.u8()?;
                    let length = track.vlq()? as usize;
                    let data = track.take(length)?;
                    globals.apply_meta(kind, data);
                }
                0xF0 | 0xF7 => {
                    let length = track.vlq()? as usize;
                    track.skip(length)?;
                }
                _ => debug!(status, offset, "Ignoring system status byte."),
            },
        }
    }

    if !pending.is_empty() {
        debug!(count = pending.len(), "Dropping notes without a note-off.");
    }

    Ok(())
}
