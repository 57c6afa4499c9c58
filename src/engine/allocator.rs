use crate::engine::params::DerivedParams;
use crate::io::midi::{CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF, CC_SUSTAIN_PEDAL};
use crate::synth::Voice;

/// Owns the fixed voice pool and maps note events onto it.
///
/// Stealing policy, in order:
///   1. a voice already bound to the incoming note (retrigger, so a note
///      never sounds twice),
///   2. any idle voice,
///   3. the quietest voice in its release phase,
///   4. the oldest-triggered voice (FIFO fallback).
/// Every branch yields a voice, so allocation cannot fail.
///
/// The pool is allocated once in `new`; nothing on the event or render
/// path allocates afterwards.
#[derive(Debug)]
pub struct VoiceAllocator {
    voices: Vec<Voice>,
    /// Monotonic trigger counter; stamps each note-on for FIFO stealing.
    trigger_counter: u64,
    sustain_pedal: bool,
}

impl VoiceAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            voices: (0..capacity).map(|_| Voice::new()).collect(),
            trigger_counter: 0,
            sustain_pedal: false,
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: u8, params: &DerivedParams) {
        self.trigger_counter += 1;
        let age = self.trigger_counter;
        let index = self.select_voice(note);
        self.voices[index].start(note, velocity, age, params);
    }

    /// Release the voice bound to `note`. Stray note-offs are ignored;
    /// while the sustain pedal is down the release is deferred instead.
    pub fn note_off(&mut self, note: u8) {
        let sustain = self.sustain_pedal;
        if let Some(voice) = self
            .voices
            .iter_mut()
            .find(|v| v.is_active() && !v.is_releasing() && v.note() == note)
        {
            if sustain {
                voice.hold_for_pedal();
            } else {
                voice.release();
            }
        }
    }

    pub fn control_change(&mut self, controller: u8, value: u8) {
        match controller {
            CC_SUSTAIN_PEDAL => {
                let down = value >= 64;
                if self.sustain_pedal && !down {
                    // Pedal lifted: deferred note-offs take effect now.
                    for voice in self.voices.iter_mut().filter(|v| v.is_pedal_held()) {
                        voice.release();
                    }
                }
                self.sustain_pedal = down;
            }
            CC_ALL_NOTES_OFF => {
                self.sustain_pedal = false;
                for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                    voice.release();
                }
            }
            CC_ALL_SOUND_OFF => {
                self.sustain_pedal = false;
                for voice in self.voices.iter_mut() {
                    voice.reset();
                }
            }
            _ => {}
        }
    }

    fn select_voice(&self, note: u8) -> usize {
        // Retrigger: the note is already sounding (including releasing).
        if let Some(index) = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == note)
        {
            return index;
        }

        if let Some(index) = self.voices.iter().position(|v| v.is_free()) {
            return index;
        }

        // Quietest releasing voice loses the least audible material.
        if let Some(index) = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_releasing())
            .min_by(|(_, a), (_, b)| {
                a.envelope_level().total_cmp(&b.envelope_level())
            })
            .map(|(index, _)| index)
        {
            return index;
        }

        // All voices held: steal the oldest.
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(index, _)| index)
            .unwrap_or(0)
    }

    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn reset(&mut self) {
        self.sustain_pedal = false;
        for voice in self.voices.iter_mut() {
            voice.reset();
        }
    }
}
