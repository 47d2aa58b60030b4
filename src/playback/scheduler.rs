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
use std::{error::Error, sync::Arc};

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info};

use crate::notation::SheetData;

use super::{
    build_events, PlaybackEvent, PlaybackState, PlaybackStatus, PlaybackUpdate, Transport,
};

/// Slowest tempo multiplier.
pub const MIN_TEMPO: f64 = 0.25;

/// Fastest tempo multiplier.
pub const MAX_TEMPO: f64 = 2.0;

/// The playback state machine.
///
/// The scheduler owns the timeline and the cursor state. It has no timer of its own: whoever
/// drives it calls [`Scheduler::tick`] periodically while playing. Event times are stored
/// unscaled and divided by the tempo multiplier whenever they're compared against the transport
/// position, so changing tempo never rebuilds the timeline.
pub struct Scheduler {
    transport: Arc<dyn Transport>,
    events: Vec<PlaybackEvent>,
    loaded: bool,
    state: PlaybackState,
    subscribers: Vec<Sender<PlaybackUpdate>>,
}

impl Scheduler {
    /// Creates a scheduler with nothing loaded.
    pub fn new(transport: Arc<dyn Transport>) -> Scheduler {
        Scheduler {
            transport,
            events: Vec::new(),
            loaded: false,
            state: PlaybackState::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn events(&self) -> &[PlaybackEvent] {
        &self.events
    }

    /// Returns a receiver for position and completion updates.
    pub fn subscribe(&mut self) -> Receiver<PlaybackUpdate> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Installs a new timeline. Anything playing is stopped first. The tempo multiplier carries
    /// over.
    pub fn load(&mut self, sheet: &SheetData) -> Result<(), Box<dyn Error>> {
        if self.state.status != PlaybackStatus::Stopped {
            self.stop()?;
        }

        let events = build_events(sheet);
        self.transport.load_events(&events)?;
        info!(
            transport = self.transport.to_string(),
            events = events.len(),
            total_duration = sheet.total_duration(),
            "Loaded timeline."
        );

        self.events = events;
        self.loaded = true;
        self.state = PlaybackState {
            total_duration: sheet.total_duration(),
            tempo_multiplier: self.state.tempo_multiplier,
            ..PlaybackState::default()
        };
        Ok(())
    }

    /// Starts playback. Does nothing without a timeline or when already playing.
    pub fn play(&mut self) -> Result<(), Box<dyn Error>> {
        if !self.loaded {
            debug!("Nothing loaded, ignoring play.");
            return Ok(());
        }
        if self.state.status == PlaybackStatus::Playing {
            return Ok(());
        }

        self.transport.play()?;
        self.state.status = PlaybackStatus::Playing;
        info!(position = self.state.current_position, "Playing.");
        Ok(())
    }

    /// Pauses playback, keeping the position. Only acts while playing.
    pub fn pause(&mut self) -> Result<(), Box<dyn Error>> {
        if self.state.status != PlaybackStatus::Playing {
            return Ok(());
        }

        self.transport.pause()?;
        self.state.status = PlaybackStatus::Paused;
        info!(position = self.state.current_position, "Paused.");
        Ok(())
    }

    /// Stops playback and rewinds to the start.
    pub fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.state.status = PlaybackStatus::Stopped;
        self.state.current_position = 0.0;
        self.state.current_note_index = None;
        self.state.current_measure = 0;
        info!("Stopped.");
        self.transport.stop()
    }

    /// Moves the cursor to `position` seconds of transport time without changing the status.
    /// Negative positions are treated as 0.
    pub fn seek_to(&mut self, position: f64) -> Result<(), Box<dyn Error>> {
        if !position.is_finite() {
            debug!(position, "Ignoring seek to a non-finite position.");
            return Ok(());
        }
        let position = position.max(0.0);

        self.transport.seek_to(position)?;
        self.state.current_position = position;
        info!(position, "Seeked.");

        let update = self.resolve(position);
        self.publish(update);
        Ok(())
    }

    /// Sets the tempo multiplier, clamped to [`MIN_TEMPO`]..=[`MAX_TEMPO`].
    pub fn set_tempo(&mut self, multiplier: f64) -> Result<(), Box<dyn Error>> {
        if !multiplier.is_finite() {
            debug!(multiplier, "Ignoring non-finite tempo.");
            return Ok(());
        }
        let multiplier = multiplier.clamp(MIN_TEMPO, MAX_TEMPO);

        self.transport.set_tempo(multiplier)?;
        self.state.tempo_multiplier = multiplier;
        info!(multiplier, "Tempo set.");
        Ok(())
    }

    /// Reads the transport position and moves the cursor. Returns the update that was published,
    /// or nothing when not playing.
    pub fn tick(&mut self) -> Option<PlaybackUpdate> {
        if self.state.status != PlaybackStatus::Playing {
            return None;
        }

        let elapsed = self.transport.position();
        self.state.current_position = elapsed;

        let scaled_total = self.state.total_duration / self.state.tempo_multiplier;
        if elapsed >= scaled_total {
            info!(elapsed, "Reached the end of the timeline.");
            if let Err(e) = self.stop() {
                error!(err = e.as_ref(), "Error stopping transport at end of playback.");
            }
            self.publish(PlaybackUpdate::Finished);
            return Some(PlaybackUpdate::Finished);
        }

        let update = self.resolve(elapsed);
        self.publish(update.clone());
        Some(update)
    }

    /// Finds the note and measure at `elapsed`. Of the notes sounding, the one that started last
    /// wins. With nothing sounding the measure of the last started note is kept.
    fn resolve(&mut self, elapsed: f64) -> PlaybackUpdate {
        let multiplier = self.state.tempo_multiplier;

        let mut sounding: Option<&PlaybackEvent> = None;
        for event in &self.events {
            let start = event.scaled_start(multiplier);
            if start <= elapsed
                && elapsed < event.scaled_end(multiplier)
                && sounding.map_or(true, |best| start >= best.scaled_start(multiplier))
            {
                sounding = Some(event);
            }
        }

        let (note_index, measure_index) = match sounding {
            Some(event) => (Some(event.note_index), event.measure_index),
            None => (
                None,
                self.events
                    .iter()
                    .rev()
                    .find(|event| event.scaled_start(multiplier) <= elapsed)
                    .map_or(0, |event| event.measure_index),
            ),
        };

        self.state.current_note_index = note_index;
        self.state.current_measure = measure_index;
        PlaybackUpdate::Position {
            position: elapsed,
            note_index,
            measure_index,
        }
    }

    fn publish(&mut self, update: PlaybackUpdate) {
        self.subscribers
            .retain(|subscriber| subscriber.send(update.clone()).is_ok());
    }
}
