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
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use midly::{
    num::{u15, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use noteflow::{
    notation::build_sheet_data,
    playback::{mock, Scheduler},
    smf,
};

fn event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message,
        },
    }
}

/// Two tracks of eighth notes, a melody over a bass line.
fn generate_smf(notes_per_track: usize) -> Vec<u8> {
    let track = |base: u8| {
        let mut events = Vec::with_capacity(notes_per_track * 2 + 1);
        for i in 0..notes_per_track {
            let key = u7::new(base + (i % 12) as u8);
            events.push(event(
                0,
                MidiMessage::NoteOn {
                    key,
                    vel: u7::new(80),
                },
            ));
            events.push(event(
                240,
                MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            ));
        }
        events.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        events
    };

    let mut smf = Smf::new(Header::new(Format::Parallel, Timing::Metrical(u15::new(480))));
    smf.tracks = vec![track(60), track(36)];

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).unwrap();
    bytes
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for notes in [100, 1_000, 10_000] {
        let bytes = generate_smf(notes);
        group.bench_with_input(BenchmarkId::from_parameter(notes), &bytes, |b, bytes| {
            b.iter(|| black_box(smf::decode(black_box(bytes)).unwrap()))
        });
    }

    group.finish();
}

fn benchmark_build_sheet(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_sheet");

    for notes in [100, 1_000, 10_000] {
        let decoded = smf::decode(&generate_smf(notes)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(notes),
            &decoded,
            |b, decoded| {
                b.iter(|| {
                    black_box(build_sheet_data(
                        black_box(&decoded.notes),
                        decoded.tempo_bpm,
                        decoded.beats_per_measure,
                        decoded.beat_unit,
                        0,
                    ))
                })
            },
        );
    }

    group.finish();
}

fn benchmark_tick(c: &mut Criterion) {
    let decoded = smf::decode(&generate_smf(1_000)).unwrap();
    let sheet = build_sheet_data(&decoded.notes, decoded.tempo_bpm, 4, 4, 0);

    let transport = mock::Transport::get("bench");
    let mut scheduler = Scheduler::new(Arc::new(transport.clone()));
    scheduler.load(&sheet).unwrap();
    scheduler.play().unwrap();
    transport.set_position(sheet.total_duration() / 2.0);

    c.bench_function("tick_1000_notes", |b| {
        b.iter(|| black_box(scheduler.tick()))
    });
}

criterion_group!(benches, benchmark_decode, benchmark_build_sheet, benchmark_tick);
criterion_main!(benches);
