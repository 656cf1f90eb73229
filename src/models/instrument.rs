// Instrument catalog - the sounds a zone can be assigned
use serde::Serialize;

use crate::config::constants::FALLBACK_NOTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// How the audio backend should build a voice for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoiceKind {
    Synth {
        waveform: Waveform,
        envelope: Option<Envelope>,
    },
    FmSynth,
    AmSynth,
    MonoSynth {
        waveform: Waveform,
        envelope: Envelope,
    },
    MembraneSynth,
    SamplePlayer {
        url: &'static str,
    },
    /// Two looping synths, the second offset by an eighth note.
    ComboLoop {
        first_note: &'static str,
        second_note: &'static str,
        interval: &'static str,
    },
}

impl VoiceKind {
    /// Looping voices are started, everything else is triggered with a note.
    pub fn is_looping(&self) -> bool {
        matches!(self, VoiceKind::SamplePlayer { .. } | VoiceKind::ComboLoop { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InstrumentDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub default_note: &'static str,
    pub voice: VoiceKind,
}

pub const INSTRUMENT_DEFINITIONS: &[InstrumentDefinition] = &[
    InstrumentDefinition {
        id: "fm-synth",
        name: "FM Synth",
        default_note: "C4",
        voice: VoiceKind::FmSynth,
    },
    InstrumentDefinition {
        id: "am-synth",
        name: "AM Synth",
        default_note: "G4",
        voice: VoiceKind::AmSynth,
    },
    InstrumentDefinition {
        id: "bass",
        name: "Bass",
        default_note: "C2",
        voice: VoiceKind::MonoSynth {
            waveform: Waveform::Sawtooth,
            envelope: Envelope { attack: 0.1, decay: 0.3, sustain: 0.3, release: 0.8 },
        },
    },
    InstrumentDefinition {
        id: "lead",
        name: "Lead",
        default_note: "C5",
        voice: VoiceKind::Synth {
            waveform: Waveform::Square,
            envelope: Some(Envelope { attack: 0.05, decay: 0.2, sustain: 0.2, release: 0.4 }),
        },
    },
    InstrumentDefinition {
        id: "drum",
        name: "Drum Hit",
        default_note: "C3",
        voice: VoiceKind::MembraneSynth,
    },
    InstrumentDefinition {
        id: "beat_loop",
        name: "Beat Loop",
        default_note: "C4",
        voice: VoiceKind::SamplePlayer {
            url: "https://tonejs.github.io/audio/drum-samples/loops/blueyellow.mp3",
        },
    },
    InstrumentDefinition {
        id: "organ_loop",
        name: "Organ Loop",
        default_note: "C4",
        voice: VoiceKind::SamplePlayer {
            url: "https://tonejs.github.io/audio/drum-samples/loops/organ-echo-chords.mp3",
        },
    },
    InstrumentDefinition {
        id: "test",
        name: "Combo Synth",
        default_note: "C4",
        voice: VoiceKind::ComboLoop {
            first_note: "D2",
            second_note: "A2",
            interval: "4n",
        },
    },
];

/// Plain synth used when a sound id is not in the catalog.
pub const FALLBACK_INSTRUMENT: InstrumentDefinition = InstrumentDefinition {
    id: "synth",
    name: "Synth",
    default_note: FALLBACK_NOTE,
    voice: VoiceKind::Synth {
        waveform: Waveform::Sine,
        envelope: None,
    },
};

pub fn instrument_definition(id: &str) -> Option<&'static InstrumentDefinition> {
    INSTRUMENT_DEFINITIONS.iter().find(|def| def.id == id)
}

/// Catalog lookup that falls back to a plain synth.
pub fn resolve_instrument(id: &str) -> &'static InstrumentDefinition {
    instrument_definition(id).unwrap_or(&FALLBACK_INSTRUMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_instrument() {
        let bass = instrument_definition("bass").unwrap();
        assert_eq!(bass.name, "Bass");
        assert_eq!(bass.default_note, "C2");
        assert!(!bass.voice.is_looping());
    }

    #[test]
    fn test_loops_are_flagged() {
        for id in ["beat_loop", "organ_loop", "test"] {
            assert!(resolve_instrument(id).voice.is_looping(), "{} should loop", id);
        }
    }

    #[test]
    fn test_unknown_falls_back_to_plain_synth() {
        assert!(instrument_definition("kazoo").is_none());
        assert_eq!(resolve_instrument("kazoo").id, "synth");
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = INSTRUMENT_DEFINITIONS.iter().map(|d| d.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), INSTRUMENT_DEFINITIONS.len());
    }
}
