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
use std::{
    thread,
    time::{Duration, SystemTime},
};

use crate::note::Note;

/// SMF fixtures written with midly.
pub mod smf {
    use std::error::Error;

    use midly::{
        num::{u15, u24, u28, u4, u7},
        Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
    };

    /// Ticks per quarter note used by every fixture.
    pub const TICKS_PER_BEAT: u16 = 480;

    fn channel_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        }
    }

    pub fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        channel_event(
            delta,
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        )
    }

    pub fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
        channel_event(
            delta,
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        )
    }

    pub fn controller(delta: u32, controller: u8, value: u8) -> TrackEvent<'static> {
        channel_event(
            delta,
            MidiMessage::Controller {
                controller: u7::new(controller),
                value: u7::new(value),
            },
        )
    }

    pub fn meta_tempo(delta: u32, micros_per_beat: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros_per_beat))),
        }
    }

    pub fn meta_time_signature(delta: u32, numerator: u8, exponent: u8) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::TimeSignature(numerator, exponent, 24, 8)),
        }
    }

    pub fn end_of_track() -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    /// Serializes the given tracks into SMF bytes.
    pub fn write_smf(
        format: Format,
        tracks: Vec<Vec<TrackEvent<'static>>>,
    ) -> Result<Vec<u8>, Box<dyn Error>> {
        let mut smf = Smf::new(Header::new(
            format,
            Timing::Metrical(u15::new(TICKS_PER_BEAT)),
        ));
        smf.tracks = tracks;

        let mut bytes = Vec::new();
        smf.write_std(&mut bytes)?;
        Ok(bytes)
    }
}

/// Builds a note, panicking on invalid input. Test-only convenience.
pub fn note(pitch: u8, start_time: f64, end_time: f64) -> Note {
    Note::new(pitch, start_time, end_time, 80).expect("invalid test note")
}

/// Wait for the given predicate to return true or fail.
#[inline]
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = SystemTime::now();
    let tick = Duration::from_millis(10);
    let timeout = Duration::from_secs(3);

    loop {
        let elapsed = start.elapsed().expect("System time error");
        if elapsed > timeout {
            panic!("{}", error_msg);
        }
        if predicate() {
            return;
        }
        thread::sleep(tick);
    }
}
