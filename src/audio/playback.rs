//! Playback service.
//!
//! Owned by the application and handed around by reference. It keeps track of
//! the voices it has created so `stop_all` and the cleanup sweep can dispose
//! them; the synthesis itself happens in a [`SoundBackend`].

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audio::backend::{SoundBackend, Trigger, VoiceHandle};
use crate::audio::error::AudioResult;
use crate::config::session_config::PlaybackConfig;
use crate::models::instrument::{resolve_instrument, InstrumentDefinition};
use crate::utils::logging::{self, OperationCategory, PlaybackAction};

/// A sound id and the note to play it at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundCue {
    pub sound: String,
    pub note: String,
}

impl SoundCue {
    pub fn new(sound: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            sound: sound.into(),
            note: note.into(),
        }
    }

    /// Cue at the instrument's default note.
    pub fn for_sound(sound: &str) -> Self {
        Self::new(sound, resolve_instrument(sound).default_note)
    }
}

struct PlaybackState<B> {
    backend: B,
    // Voices started by play_many; stop_all disposes these.
    active: Vec<VoiceHandle>,
    // Voices started by play_one, disposed once their deadline passes.
    one_shots: Vec<(VoiceHandle, Instant)>,
}

pub struct PlaybackService<B: SoundBackend> {
    state: Mutex<PlaybackState<B>>,
    config: PlaybackConfig,
}

impl<B: SoundBackend> PlaybackService<B> {
    pub fn new(backend: B, config: PlaybackConfig) -> Self {
        Self {
            state: Mutex::new(PlaybackState {
                backend,
                active: Vec::new(),
                one_shots: Vec::new(),
            }),
            config,
        }
    }

    fn trigger_for(&self, instrument: &InstrumentDefinition, note: &str, at: f64) -> Trigger {
        if instrument.voice.is_looping() {
            Trigger::Start { at }
        } else {
            Trigger::Note {
                note: note.to_string(),
                length: self.config.note_length.clone(),
                at,
            }
        }
    }

    /// Play one sound now; the voice is disposed after the cleanup delay.
    pub fn play_one(&self, sound: &str, note: &str) -> AudioResult<VoiceHandle> {
        let _timing = logging::start_timing(
            "play_one",
            OperationCategory::Playback { action: PlaybackAction::Trigger },
        );
        let instrument = resolve_instrument(sound);
        let mut state = self.state.lock();

        let voice = state.backend.create_voice(instrument)?;
        let now = state.backend.now();
        let trigger = self.trigger_for(instrument, note, now);
        state.backend.trigger(voice, &trigger)?;

        let deadline = Instant::now() + self.config.cleanup_delay();
        state.one_shots.push((voice, deadline));
        debug!(voice = voice.0, sound, note, "Scheduled one-shot cleanup");
        Ok(voice)
    }

    /// Stop whatever is playing, then start every cue at one shared time.
    pub fn play_many(&self, cues: &[SoundCue]) -> AudioResult<Vec<VoiceHandle>> {
        self.stop_all();

        let _timing = logging::start_timing(
            "play_many",
            OperationCategory::Playback { action: PlaybackAction::Trigger },
        );
        let mut state = self.state.lock();

        // Create all voices first so they can share a start time.
        let mut prepared = Vec::with_capacity(cues.len());
        for cue in cues {
            let instrument = resolve_instrument(&cue.sound);
            let voice = state.backend.create_voice(instrument)?;
            state.active.push(voice);
            prepared.push((voice, instrument, cue.note.as_str()));
        }

        let start = state.backend.now() + self.config.lead_secs;
        for (voice, instrument, note) in &prepared {
            let trigger = self.trigger_for(instrument, note, start);
            state.backend.trigger(*voice, &trigger)?;
        }

        debug!(voices = prepared.len(), start, "Started sound group");
        Ok(prepared.into_iter().map(|(voice, _, _)| voice).collect())
    }

    /// Dispose every voice started by `play_many`. Failures are logged and
    /// the sweep continues.
    pub fn stop_all(&self) {
        let _timing = logging::start_timing(
            "stop_all",
            OperationCategory::Playback { action: PlaybackAction::Dispose },
        );
        let mut state = self.state.lock();
        let voices = std::mem::take(&mut state.active);
        for voice in voices {
            if let Err(e) = state.backend.dispose(voice) {
                warn!(voice = voice.0, error = %e, "Error disposing voice");
            }
        }
    }

    /// Dispose one-shot voices whose cleanup delay has passed.
    pub fn reap_expired(&self) -> usize {
        self.reap_expired_at(Instant::now())
    }

    pub fn reap_expired_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        let (expired, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.one_shots)
            .into_iter()
            .partition(|(_, deadline)| *deadline <= now);
        state.one_shots = pending;

        for (voice, _) in &expired {
            if let Err(e) = state.backend.dispose(*voice) {
                warn!(voice = voice.0, error = %e, "Error disposing one-shot voice");
            }
        }
        expired.len()
    }

    /// Time until the next one-shot voice is due for cleanup.
    pub fn next_cleanup_in(&self) -> Option<Duration> {
        let state = self.state.lock();
        let now = Instant::now();
        state
            .one_shots
            .iter()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
            .min()
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    pub fn pending_one_shots(&self) -> usize {
        self.state.lock().one_shots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::error::AudioError;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Create(u64, &'static str),
        Trigger(u64, Trigger),
        Dispose(u64),
    }

    #[derive(Clone, Default)]
    struct RecordingBackend {
        events: Arc<Mutex<Vec<Event>>>,
        next_id: u64,
        clock: f64,
        fail_dispose: bool,
    }

    impl SoundBackend for RecordingBackend {
        fn now(&self) -> f64 {
            self.clock
        }

        fn create_voice(&mut self, instrument: &InstrumentDefinition) -> AudioResult<VoiceHandle> {
            let id = self.next_id;
            self.next_id += 1;
            self.events.lock().push(Event::Create(id, instrument.id));
            Ok(VoiceHandle(id))
        }

        fn trigger(&mut self, voice: VoiceHandle, trigger: &Trigger) -> AudioResult<()> {
            self.events.lock().push(Event::Trigger(voice.0, trigger.clone()));
            Ok(())
        }

        fn dispose(&mut self, voice: VoiceHandle) -> AudioResult<()> {
            self.events.lock().push(Event::Dispose(voice.0));
            if self.fail_dispose {
                return Err(AudioError::UnknownVoice(voice));
            }
            Ok(())
        }
    }

    fn service(backend: RecordingBackend) -> PlaybackService<RecordingBackend> {
        PlaybackService::new(backend, PlaybackConfig::default())
    }

    #[test]
    fn test_play_one_triggers_note_now() {
        let backend = RecordingBackend { clock: 3.0, ..Default::default() };
        let events = backend.events.clone();
        let playback = service(backend);

        playback.play_one("bass", "C2").unwrap();

        let events = events.lock();
        assert_eq!(events[0], Event::Create(0, "bass"));
        assert_eq!(
            events[1],
            Event::Trigger(0, Trigger::Note { note: "C2".into(), length: "8n".into(), at: 3.0 })
        );
        assert_eq!(playback.pending_one_shots(), 1);
        assert_eq!(playback.active_count(), 0);
    }

    #[test]
    fn test_one_shots_are_reaped_after_delay() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let playback = service(backend);
        playback.play_one("drum", "C3").unwrap();

        assert_eq!(playback.reap_expired_at(Instant::now()), 0);
        let later = Instant::now() + Duration::from_secs(9);
        assert_eq!(playback.reap_expired_at(later), 1);
        assert_eq!(playback.pending_one_shots(), 0);
        assert_eq!(events.lock().last(), Some(&Event::Dispose(0)));
    }

    #[test]
    fn test_play_many_shares_start_time_and_starts_loops() {
        let backend = RecordingBackend { clock: 10.0, ..Default::default() };
        let events = backend.events.clone();
        let playback = service(backend);

        let voices = playback
            .play_many(&[SoundCue::for_sound("lead"), SoundCue::for_sound("beat_loop")])
            .unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(playback.active_count(), 2);

        let events = events.lock();
        let triggers: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Trigger(_, t) => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            triggers,
            vec![
                Trigger::Note { note: "C5".into(), length: "8n".into(), at: 10.1 },
                Trigger::Start { at: 10.1 },
            ]
        );
        // both voices exist before the first trigger
        assert!(matches!(events[0], Event::Create(..)));
        assert!(matches!(events[1], Event::Create(..)));
    }

    #[test]
    fn test_play_many_leaves_group_running() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let playback = service(backend);

        playback
            .play_many(&[SoundCue::for_sound("bass"), SoundCue::for_sound("organ_loop")])
            .unwrap();

        assert_eq!(playback.active_count(), 2);
        assert!(!events.lock().iter().any(|e| matches!(e, Event::Dispose(_))));
        assert_eq!(playback.reap_expired_at(Instant::now() + Duration::from_secs(60)), 0);
        assert_eq!(playback.active_count(), 2);
    }

    #[test]
    fn test_play_many_stops_previous_group() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let playback = service(backend);

        playback.play_many(&[SoundCue::for_sound("bass")]).unwrap();
        playback.play_many(&[SoundCue::for_sound("drum")]).unwrap();

        assert_eq!(playback.active_count(), 1);
        assert!(events.lock().contains(&Event::Dispose(0)));
    }

    #[test]
    fn test_stop_all_survives_dispose_errors() {
        let backend = RecordingBackend { fail_dispose: true, ..Default::default() };
        let events = backend.events.clone();
        let playback = service(backend);

        playback
            .play_many(&[SoundCue::for_sound("bass"), SoundCue::for_sound("lead")])
            .unwrap();
        playback.stop_all();

        assert_eq!(playback.active_count(), 0);
        let disposals = events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Dispose(_)))
            .count();
        assert_eq!(disposals, 2);
    }

    #[test]
    fn test_unknown_sound_uses_fallback_synth() {
        let backend = RecordingBackend::default();
        let events = backend.events.clone();
        let playback = service(backend);

        playback.play_one("theremin", "A4").unwrap();
        assert_eq!(events.lock()[0], Event::Create(0, "synth"));
    }
}
