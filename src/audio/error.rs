//! Error types for sound playback.

use thiserror::Error;

use crate::audio::backend::VoiceHandle;

/// Result type for playback operations.
pub type AudioResult<T> = Result<T, AudioError>;

#[derive(Debug, Error)]
pub enum AudioError {
    /// The backend could not build a voice.
    #[error("failed to create voice for '{sound}': {message}")]
    VoiceCreation { sound: String, message: String },

    /// Trigger or start failed.
    #[error("failed to trigger voice {voice:?}: {message}")]
    Trigger { voice: VoiceHandle, message: String },

    /// Voice was already disposed or never existed.
    #[error("unknown voice {0:?}")]
    UnknownVoice(VoiceHandle),
}
