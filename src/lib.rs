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

//! Turns Standard MIDI Files into a two-staff piano sheet model and tracks a playback cursor
//! over it.
//!
//! The pipeline is [`smf::decode`] to get notes, [`notation::build_sheet_data`] to lay them out
//! in measures, and a [`player::Player`] (or a bare [`playback::Scheduler`]) to follow playback.
//! [`load_sheet`] runs the first two steps with the options from a config file.
use tracing::info;

pub mod config;
pub mod notation;
pub mod note;
pub mod playback;
pub mod player;
mod playsync;
pub mod smf;
pub mod util;

#[cfg(test)]
mod testutil;

use crate::{
    config::Notation,
    notation::{cleanup, key, quantize, SheetData},
    smf::FormatError,
};

/// Decodes SMF bytes and builds the sheet model.
///
/// Notes are quantized and then repeated notes merged first, if configured. The key signature
/// is the configured one, or a detected one when detection is on, or C major.
pub fn load_sheet(data: &[u8], options: &Notation) -> Result<SheetData, FormatError> {
    let decoded = smf::decode(data)?;

    let notes = match options.quantize() {
        Some(grid) => quantize::quantize_notes(&decoded.notes, decoded.tempo_bpm, grid),
        None => decoded.notes,
    };
    let notes = if options.merge_repeated_notes() {
        cleanup::merge_repeated_notes(&notes, decoded.tempo_bpm)
    } else {
        notes
    };

    let key_signature = match options.key_signature() {
        Some(key_signature) => key_signature,
        None if options.detect_key() => key::detect_key_signature(&notes),
        None => 0,
    };
    info!(
        notes = notes.len(),
        tempo = decoded.tempo_bpm,
        key_signature,
        "Loaded sheet."
    );

    Ok(notation::build_sheet_data(
        &notes,
        decoded.tempo_bpm,
        decoded.beats_per_measure,
        decoded.beat_unit,
        key_signature,
    ))
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use midly::Format;

    use crate::{
        config::Notation,
        note::Hand,
        notation::{quantize::Grid, RestType},
        playback::{mock, PlaybackStatus, PlaybackUpdate, Scheduler},
        smf::FormatError,
        testutil::smf::{end_of_track, meta_tempo, note_off, note_on, write_smf},
    };

    use super::load_sheet;

    /// One middle C quarter note at the default tempo.
    const SINGLE_NOTE: &[u8] = &[
        b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0, //
        b'M', b'T', b'r', b'k', 0, 0, 0, 13, //
        0x00, 0x90, 60, 80, //
        0x83, 0x60, 0x80, 60, 0, //
        0x00, 0xFF, 0x2F, 0x00,
    ];

    #[test]
    fn test_single_note_end_to_end() -> Result<(), Box<dyn Error>> {
        let sheet = load_sheet(SINGLE_NOTE, &Notation::default())?;

        assert_eq!(120.0, sheet.tempo());
        assert_eq!(1, sheet.all_notes().len());
        let note = sheet.all_notes()[0];
        assert_eq!(60, note.pitch());
        assert_eq!(0.0, note.start_time());
        assert_eq!(0.5, note.end_time());
        assert_eq!(80, note.velocity());
        assert_eq!(Hand::Treble, note.hand());

        assert_eq!(2.0, sheet.measure_duration());
        assert_eq!(1, sheet.measures().len());
        let measure = &sheet.measures()[0];
        assert_eq!(1, measure.notes(Hand::Treble).len());
        assert_eq!(3.0, measure.rests(Hand::Treble)[0].duration);
        assert_eq!(RestType::Half, measure.rests(Hand::Treble)[0].rest_type);
        assert_eq!(RestType::Whole, measure.rests(Hand::Bass)[0].rest_type);

        let transport = mock::Transport::get("mock-transport");
        let mut scheduler = Scheduler::new(std::sync::Arc::new(transport.clone()));
        scheduler.load(&sheet)?;
        scheduler.play()?;

        transport.set_position(0.25);
        scheduler.tick();
        assert_eq!(Some(0), scheduler.state().current_note_index);
        assert_eq!(0, scheduler.state().current_measure);

        transport.set_position(2.0);
        assert_eq!(Some(PlaybackUpdate::Finished), scheduler.tick());
        assert_eq!(PlaybackStatus::Stopped, scheduler.state().status);
        assert_eq!(None, scheduler.tick());
        Ok(())
    }

    #[test]
    fn test_decode_errors_surface() {
        assert_eq!(
            Err(FormatError::NotMidi),
            load_sheet(b"RIFF\0\0\0\x06", &Notation::default())
        );
    }

    #[test]
    fn test_key_options() -> Result<(), Box<dyn Error>> {
        // G major scale.
        let mut track = vec![meta_tempo(0, 500_000)];
        for pitch in [67, 69, 71, 72, 74, 76, 78] {
            track.push(note_on(0, pitch, 90));
            track.push(note_off(240, pitch));
        }
        track.push(end_of_track());
        let bytes = write_smf(Format::SingleTrack, vec![track])?;

        assert_eq!(1, load_sheet(&bytes, &Notation::default())?.key_signature());
        assert_eq!(
            0,
            load_sheet(&bytes, &Notation::new(None, Some(false), None, None))?.key_signature()
        );
        assert_eq!(
            -4,
            load_sheet(&bytes, &Notation::new(Some(-4), Some(true), None, None))?
                .key_signature()
        );
        Ok(())
    }

    #[test]
    fn test_merge_option() -> Result<(), Box<dyn Error>> {
        let track = vec![
            note_on(0, 60, 70),
            note_off(200, 60),
            note_on(40, 60, 100),
            note_off(200, 60),
            end_of_track(),
        ];
        let bytes = write_smf(Format::SingleTrack, vec![track])?;

        let plain = load_sheet(&bytes, &Notation::default())?;
        assert_eq!(2, plain.all_notes().len());

        let merged = load_sheet(&bytes, &Notation::new(None, None, Some(true), None))?;
        assert_eq!(1, merged.all_notes().len());
        assert_eq!(100, merged.all_notes()[0].velocity());
        Ok(())
    }

    #[test]
    fn test_quantize_option() -> Result<(), Box<dyn Error>> {
        // Slightly late and slightly short of a quarter note at 120 BPM.
        let track = vec![note_on(20, 64, 90), note_off(450, 64), end_of_track()];
        let bytes = write_smf(Format::SingleTrack, vec![track])?;

        let plain = load_sheet(&bytes, &Notation::default())?;
        assert_ne!(0.0, plain.all_notes()[0].start_time());

        let options = Notation::new(None, None, None, Some(Grid::Sixteenth));
        let quantized = load_sheet(&bytes, &options)?;
        let note = quantized.all_notes()[0];
        assert_eq!(0.0, note.start_time());
        assert_eq!(0.5, note.end_time());
        Ok(())
    }
}
