use std::collections::HashMap;
use std::time::Instant;

use tracing::info;

use crate::audio::error::{AudioError, AudioResult};
use crate::models::instrument::InstrumentDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceHandle(pub u64);

/// What to do with a voice once it exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Attack/release a single note at `at` seconds of audio time.
    Note { note: String, length: String, at: f64 },
    /// Start a looping voice at `at` seconds of audio time.
    Start { at: f64 },
}

/// Seam to the audio synthesis library. Times are in seconds on the
/// backend's own clock.
pub trait SoundBackend: Send {
    fn now(&self) -> f64;
    fn create_voice(&mut self, instrument: &InstrumentDefinition) -> AudioResult<VoiceHandle>;
    fn trigger(&mut self, voice: VoiceHandle, trigger: &Trigger) -> AudioResult<()>;
    fn dispose(&mut self, voice: VoiceHandle) -> AudioResult<()>;
}

/// Backend without an audio device: every call is logged.
pub struct TracingBackend {
    epoch: Instant,
    next_id: u64,
    live: HashMap<VoiceHandle, &'static str>,
}

impl TracingBackend {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            next_id: 0,
            live: HashMap::new(),
        }
    }

    pub fn live_voices(&self) -> usize {
        self.live.len()
    }
}

impl Default for TracingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBackend for TracingBackend {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn create_voice(&mut self, instrument: &InstrumentDefinition) -> AudioResult<VoiceHandle> {
        let voice = VoiceHandle(self.next_id);
        self.next_id += 1;
        self.live.insert(voice, instrument.id);
        info!(voice = voice.0, instrument = instrument.id, voice_kind = ?instrument.voice, "Created voice");
        Ok(voice)
    }

    fn trigger(&mut self, voice: VoiceHandle, trigger: &Trigger) -> AudioResult<()> {
        let instrument = self.live.get(&voice).ok_or(AudioError::UnknownVoice(voice))?;
        match trigger {
            Trigger::Note { note, length, at } => {
                info!(voice = voice.0, instrument, note = %note, length = %length, at, "Note triggered")
            }
            Trigger::Start { at } => info!(voice = voice.0, instrument, at, "Loop started"),
        }
        Ok(())
    }

    fn dispose(&mut self, voice: VoiceHandle) -> AudioResult<()> {
        let instrument = self.live.remove(&voice).ok_or(AudioError::UnknownVoice(voice))?;
        info!(voice = voice.0, instrument, "Disposed voice");
        Ok(())
    }
}
