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
use std::time::Duration;

use duration_string::DurationString;
use serde::{Deserialize, Serialize};

use crate::playback::{MAX_TEMPO, MIN_TEMPO};
use crate::player::DEFAULT_POLL_INTERVAL;

use super::error::ConfigError;

const DEFAULT_TEMPO: f64 = 1.0;

/// A YAML representation of the playback configuration.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Playback {
    /// How often the cursor is updated while playing (default: 50ms).
    #[serde(skip_serializing_if = "Option::is_none")]
    poll_interval: Option<String>,

    /// Initial tempo multiplier (default: 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    tempo: Option<f64>,
}

impl Playback {
    pub fn new(poll_interval: Option<&str>, tempo: Option<f64>) -> Playback {
        Playback {
            poll_interval: poll_interval.map(str::to_string),
            tempo,
        }
    }

    /// Returns the poll interval from the configuration.
    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        let Some(poll_interval) = &self.poll_interval else {
            return Ok(DEFAULT_POLL_INTERVAL);
        };

        let invalid = |reason: String| ConfigError::InvalidDuration {
            field: "playback.poll_interval",
            value: poll_interval.clone(),
            reason,
        };
        let duration: Duration = DurationString::from_string(poll_interval.clone())
            .map_err(|e| invalid(e.to_string()))?
            .into();
        if duration.is_zero() {
            return Err(invalid("must be greater than zero".to_string()));
        }
        Ok(duration)
    }

    /// Returns the tempo multiplier, clamped to the supported range.
    pub fn tempo(&self) -> Result<f64, ConfigError> {
        match self.tempo {
            None => Ok(DEFAULT_TEMPO),
            Some(tempo) if tempo.is_finite() && tempo > 0.0 => Ok(tempo.clamp(MIN_TEMPO, MAX_TEMPO)),
            Some(tempo) => Err(ConfigError::InvalidValue {
                field: "playback.tempo",
                reason: format!("{} is not a positive number", tempo),
            }),
        }
    }
}
