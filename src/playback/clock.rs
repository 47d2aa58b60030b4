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
use std::{error::Error, fmt, time::Instant};

use parking_lot::Mutex;
use tracing::debug;

use super::PlaybackEvent;

struct Clock {
    /// Position accumulated before the current run.
    offset: f64,
    /// When the current run started, if running.
    started: Option<Instant>,
    events: usize,
    tempo: f64,
}

impl Clock {
    fn position(&self) -> f64 {
        self.offset
            + self
                .started
                .map_or(0.0, |started| started.elapsed().as_secs_f64())
    }
}

/// A silent transport that just follows the wall clock.
pub struct ClockTransport {
    clock: Mutex<Clock>,
}

impl ClockTransport {
    pub fn new() -> ClockTransport {
        ClockTransport {
            clock: Mutex::new(Clock {
                offset: 0.0,
                started: None,
                events: 0,
                tempo: 1.0,
            }),
        }
    }
}

impl Default for ClockTransport {
    fn default() -> Self {
        ClockTransport::new()
    }
}

impl super::Transport for ClockTransport {
    fn load_events(&self, events: &[PlaybackEvent]) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        clock.events = events.len();
        clock.offset = 0.0;
        clock.started = None;
        Ok(())
    }

    fn play(&self) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        if clock.started.is_none() {
            clock.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&self) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        clock.offset = clock.position();
        clock.started = None;
        Ok(())
    }

    fn stop(&self) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        clock.offset = 0.0;
        clock.started = None;
        Ok(())
    }

    fn seek_to(&self, seconds: f64) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        clock.offset = seconds;
        if clock.started.is_some() {
            clock.started = Some(Instant::now());
        }
        Ok(())
    }

    fn set_tempo(&self, multiplier: f64) -> Result<(), Box<dyn Error>> {
        let mut clock = self.clock.lock();
        debug!(events = clock.events, multiplier, "Clock tempo changed.");
        clock.tempo = multiplier;
        Ok(())
    }

    fn position(&self) -> f64 {
        self.clock.lock().position()
    }
}

impl fmt::Display for ClockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = self.clock.lock();
        write!(f, "Clock ({} events, x{})", clock.events, clock.tempo)
    }
}
