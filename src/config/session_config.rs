use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::constants::{
    DEFAULT_NOTE_LENGTH, DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG, PLAYBACK_LEAD_SECS,
    SOUND_CLEANUP_DELAY_SECS,
};
use crate::data::coords::LatLng;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid reference point: {0:?}")]
    InvalidReference(LatLng),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub cleanup_delay_secs: f64, // One-shot voices are disposed after this
    pub lead_secs: f64,          // Offset for the shared start time of play_many
    pub note_length: String,     // Transport notation, e.g. "8n"
}

impl PlaybackConfig {
    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.cleanup_delay_secs.max(0.0))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            cleanup_delay_secs: SOUND_CLEANUP_DELAY_SECS,
            lead_secs: PLAYBACK_LEAD_SECS,
            note_length: DEFAULT_NOTE_LENGTH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub reference: LatLng,
    pub playback: PlaybackConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reference: LatLng::new(DEFAULT_REFERENCE_LAT, DEFAULT_REFERENCE_LNG),
            playback: PlaybackConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: SessionConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = self.reference;
        if !r.is_finite() || r.lat.abs() > 90.0 || r.lng.abs() > 180.0 {
            return Err(ConfigError::InvalidReference(r));
        }
        Ok(())
    }

    pub fn with_reference(mut self, lat: Option<f64>, lng: Option<f64>) -> Self {
        if let Some(lat) = lat {
            self.reference.lat = lat;
        }
        if let Some(lng) = lng {
            self.reference.lng = lng;
        }
        self
    }
}
