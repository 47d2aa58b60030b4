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
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand, ValueEnum};
use noteflow::config::Settings;
use noteflow::notation::key::spell_pitch;
use noteflow::notation::staff::{key_signature_layout, Clef};
use noteflow::notation::SheetData;
use noteflow::note::Hand;
use noteflow::playback::{ClockTransport, PlaybackUpdate};
use noteflow::player::Player;
use noteflow::util::{filename_display, seconds_display};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A MIDI file to piano sheet converter."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the sheet model built from a MIDI file.
    Inspect {
        /// The path to the MIDI file.
        path: PathBuf,
        /// The path to the settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The output format.
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Follows playback of a MIDI file in real time, printing the cursor as it moves.
    Play {
        /// The path to the MIDI file.
        path: PathBuf,
        /// The path to the settings file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The tempo multiplier. Overrides the settings file.
        #[arg(short, long)]
        tempo: Option<f64>,
        /// Where to start, in seconds.
        #[arg(short, long)]
        seek: Option<f64>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            path,
            config,
            format,
        } => {
            let settings = load_settings(config.as_deref())?;
            let sheet = noteflow::load_sheet(&fs::read(&path)?, settings.notation())?;

            match format {
                Format::Text => print_sheet(&path, &sheet),
                Format::Json => println!("{}", serde_json::to_string_pretty(&sheet)?),
                Format::Yaml => print!("{}", serde_yml::to_string(&sheet)?),
            }
        }
        Commands::Play {
            path,
            config,
            tempo,
            seek,
        } => {
            let settings = load_settings(config.as_deref())?;
            let sheet = noteflow::load_sheet(&fs::read(&path)?, settings.notation())?;
            if sheet.is_empty() {
                println!("{} has no notes.", filename_display(&path));
                return Ok(());
            }

            let player = Player::new(
                Arc::new(ClockTransport::new()),
                settings.playback().poll_interval()?,
            );
            player.load(&sheet)?;
            player.set_tempo(tempo.unwrap_or(settings.playback().tempo()?))?;
            let updates = player.subscribe();
            if let Some(seek) = seek {
                player.seek_to(seek)?;
            }

            println!(
                "Playing {} ({}) at x{}",
                filename_display(&path),
                seconds_display(sheet.total_duration()),
                player.state().tempo_multiplier
            );
            player.play()?;

            let mut last_note = None;
            for update in updates.iter() {
                match update {
                    PlaybackUpdate::Position {
                        position,
                        note_index,
                        measure_index,
                    } => {
                        if note_index.is_none() || note_index == last_note {
                            continue;
                        }
                        last_note = note_index;
                        let Some(note) = note_index.and_then(|index| sheet.all_notes().get(index))
                        else {
                            continue;
                        };
                        println!(
                            "{} measure {:>3}  {}",
                            seconds_display(position),
                            measure_index + 1,
                            spell_pitch(note.pitch(), sheet.key_signature())
                        );
                    }
                    PlaybackUpdate::Finished => {
                        println!("Finished.");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn Error>> {
    Ok(match path {
        Some(path) => Settings::deserialize(path)?,
        None => Settings::default(),
    })
}

fn print_sheet(path: &Path, sheet: &SheetData) {
    let key = sheet.key_signature();
    let accidentals: String = key_signature_layout(key, Clef::Treble)
        .iter()
        .map(|accidental| accidental.letter)
        .collect();

    println!("File:     {}", filename_display(path));
    println!("Tempo:    {:.1} BPM", sheet.tempo());
    println!(
        "Meter:    {}/{}",
        sheet.beats_per_measure(),
        sheet.beat_unit()
    );
    println!(
        "Key:      {} ({})",
        key,
        if accidentals.is_empty() {
            "none".to_string()
        } else {
            accidentals
        }
    );
    println!("Duration: {}", seconds_display(sheet.total_duration()));
    println!(
        "Notes:    {} in {} measures",
        sheet.all_notes().len(),
        sheet.measures().len()
    );

    for measure in sheet.measures() {
        println!(
            "\nMeasure {} [{} - {}]",
            measure.number(),
            seconds_display(measure.start_time()),
            seconds_display(measure.end_time())
        );
        for (label, hand) in [("treble", Hand::Treble), ("bass", Hand::Bass)] {
            let notes: Vec<String> = measure
                .notes(hand)
                .iter()
                .map(|note| spell_pitch(note.pitch(), key).to_string())
                .collect();
            let rests: Vec<String> = measure
                .rests(hand)
                .iter()
                .map(|rest| format!("{:?}", rest.rest_type).to_lowercase())
                .collect();
            println!(
                "  {:<6} notes: [{}] rests: [{}]",
                label,
                notes.join(" "),
                rests.join(" ")
            );
        }
    }
}
