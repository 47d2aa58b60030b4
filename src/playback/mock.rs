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
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::debug;

use super::PlaybackEvent;

/// A transport call, as recorded by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Carries the number of events loaded.
    LoadEvents(usize),
    Play,
    Pause,
    Stop,
    SeekTo(f64),
    SetTempo(f64),
}

/// A mock transport. Doesn't play anything and only moves when told to.
#[derive(Clone)]
pub struct Transport {
    name: String,
    position: Arc<Mutex<f64>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<AtomicBool>,
}

impl Transport {
    /// Gets the given mock transport.
    pub fn get(name: &str) -> Transport {
        Transport {
            name: name.to_string(),
            position: Arc::new(Mutex::new(0.0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Moves the reported position.
    pub fn set_position(&self, seconds: f64) {
        *self.position.lock() = seconds;
    }

    /// Every call that succeeded, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// When set, every call fails.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    fn record(&self, call: Call) -> Result<(), Box<dyn Error>> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(format!("{} failed {:?}", self.name, call).into());
        }
        debug!(transport = self.name, call = ?call, "Mock transport call.");
        self.calls.lock().push(call);
        Ok(())
    }
}

impl super::Transport for Transport {
    fn load_events(&self, events: &[PlaybackEvent]) -> Result<(), Box<dyn Error>> {
        self.record(Call::LoadEvents(events.len()))?;
        self.set_position(0.0);
        Ok(())
    }

    fn play(&self) -> Result<(), Box<dyn Error>> {
        self.record(Call::Play)
    }

    fn pause(&self) -> Result<(), Box<dyn Error>> {
        self.record(Call::Pause)
    }

    fn stop(&self) -> Result<(), Box<dyn Error>> {
        self.record(Call::Stop)?;
        self.set_position(0.0);
        Ok(())
    }

    fn seek_to(&self, seconds: f64) -> Result<(), Box<dyn Error>> {
        self.record(Call::SeekTo(seconds))?;
        self.set_position(seconds);
        Ok(())
    }

    fn set_tempo(&self, multiplier: f64) -> Result<(), Box<dyn Error>> {
        self.record(Call::SetTempo(multiplier))
    }

    fn position(&self) -> f64 {
        *self.position.lock()
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
