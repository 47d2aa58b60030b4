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
use std::{fs, path::Path};

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

mod error;
mod notation;
mod playback;

pub use self::error::ConfigError;
pub use self::notation::Notation;
pub use self::playback::Playback;

/// The top level configuration. Every section and field is optional.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    notation: Notation,
    #[serde(default)]
    playback: Playback,
}

impl Settings {
    pub fn new(notation: Notation, playback: Playback) -> Settings {
        Settings { notation, playback }
    }

    /// Deserializes a file from the path into a settings struct and checks its values.
    pub fn deserialize(path: &Path) -> Result<Settings, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Serialize and save the settings to a file at given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = self.to_yaml()?;
        info!(path = %path.display(), "Saving settings.");
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn notation(&self) -> &Notation {
        &self.notation
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.playback.poll_interval()?;
        self.playback.tempo()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs, time::Duration};

    use tempfile::tempdir;

    use crate::notation::quantize::Grid;

    use super::{ConfigError, Notation, Playback, Settings};

    #[test]
    fn test_full_config() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("noteflow.yaml");
        fs::write(
            &path,
            r#"
notation:
  key_signature: -2
  detect_key: false
  merge_repeated_notes: true
  quantize: 32nd
playback:
  poll_interval: 20ms
  tempo: 0.75
"#,
        )?;

        let settings = Settings::deserialize(&path)?;
        assert_eq!(Some(-2), settings.notation().key_signature());
        assert!(!settings.notation().detect_key());
        assert!(settings.notation().merge_repeated_notes());
        assert_eq!(Some(Grid::ThirtySecond), settings.notation().quantize());
        assert_eq!(
            Duration::from_millis(20),
            settings.playback().poll_interval()?
        );
        assert_eq!(0.75, settings.playback().tempo()?);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "notation: {}\n")?;

        let settings = Settings::deserialize(&path)?;
        assert_eq!(None, settings.notation().key_signature());
        assert!(settings.notation().detect_key());
        assert!(!settings.notation().merge_repeated_notes());
        assert_eq!(None, settings.notation().quantize());
        assert_eq!(
            Duration::from_millis(50),
            settings.playback().poll_interval()?
        );
        assert_eq!(1.0, settings.playback().tempo()?);
        Ok(())
    }

    #[test]
    fn test_clamped_values() -> Result<(), Box<dyn Error>> {
        let notation = Notation::new(Some(11), None, None, None);
        assert_eq!(Some(7), notation.key_signature());

        assert_eq!(2.0, Playback::new(None, Some(8.0)).tempo()?);
        assert_eq!(0.25, Playback::new(None, Some(0.1)).tempo()?);
        Ok(())
    }

    #[test]
    fn test_invalid_values() -> Result<(), Box<dyn Error>> {
        assert!(matches!(
            Playback::new(Some("0ms"), None).poll_interval(),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            Playback::new(Some("soon"), None).poll_interval(),
            Err(ConfigError::InvalidDuration { .. })
        ));
        assert!(matches!(
            Playback::new(None, Some(-1.0)).tempo(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let dir = tempdir()?;
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "playback:\n  poll_interval: 0s\n")?;
        assert!(matches!(
            Settings::deserialize(&path),
            Err(ConfigError::InvalidDuration { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            Settings::deserialize(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_save_round_trip() -> Result<(), Box<dyn Error>> {
        let settings = Settings::new(
            Notation::new(Some(3), Some(true), None, Some(Grid::Eighth)),
            Playback::new(Some("25ms"), Some(1.5)),
        );

        let yaml = settings.to_yaml()?;
        assert!(yaml.contains("key_signature: 3"));
        assert!(!yaml.contains("merge_repeated_notes"));
        assert!(yaml.contains("8th"));

        let dir = tempdir()?;
        let path = dir.path().join("saved.yaml");
        settings.save(&path)?;
        assert_eq!(settings, Settings::deserialize(&path)?);
        Ok(())
    }
}
