use crate::dsp::envelope::{Envelope, EnvelopeStage};
use crate::dsp::filter::Filter;
use crate::dsp::oscillator::{note_to_freq, Oscillator};
use crate::engine::params::DerivedParams;

/// One playable note: oscillator, amplitude envelope, and filter.
///
/// A voice is either idle (unowned, available to the allocator) or bound
/// to exactly one sounding note. The envelope stage is the ground truth
/// for that distinction: a voice is idle exactly when its envelope is.
///
/// Voices never touch the host buffer directly; `render` adds into the
/// engine's mono accumulator so mixing stays in one place.
#[derive(Debug)]
pub struct Voice {
    note: u8,
    velocity: u8,
    /// Trigger order, for the oldest-voice stealing fallback.
    age: u64,
    /// Note-off arrived while the sustain pedal was down; the release is
    /// deferred until the pedal lifts.
    pedal_held: bool,
    gain: f32,
    osc: Oscillator,
    env: Envelope,
    filter: Filter,
}

impl Voice {
    pub fn new() -> Self {
        Self {
            note: 0,
            velocity: 0,
            age: 0,
            pedal_held: false,
            gain: 0.0,
            osc: Oscillator::new(),
            env: Envelope::new(),
            filter: Filter::new(),
        }
    }

    /// Bind this voice to a note and start (or retrigger) its attack.
    pub fn start(&mut self, note: u8, velocity: u8, age: u64, params: &DerivedParams) {
        self.note = note;
        self.velocity = velocity;
        self.age = age;
        self.pedal_held = false;
        self.gain = velocity as f32 / 127.0;
        self.osc.set_frequency(note_to_freq(note), params.sample_rate);
        self.env.note_on();
    }

    /// Begin the release phase. The voice frees itself once the envelope
    /// falls below the silence threshold.
    pub fn release(&mut self) {
        self.pedal_held = false;
        self.env.note_off();
    }

    /// Hard stop: back to idle immediately, all state cleared.
    pub fn reset(&mut self) {
        self.note = 0;
        self.velocity = 0;
        self.age = 0;
        self.pedal_held = false;
        self.gain = 0.0;
        self.osc.reset();
        self.env.reset();
        self.filter.reset();
    }

    /// Render and ADD this voice's samples into `out`.
    pub fn render(&mut self, out: &mut [f32], params: &DerivedParams) {
        for slot in out.iter_mut() {
            let level = self.env.next_sample(&params.env);
            if !self.env.is_active() {
                break;
            }
            let raw = self.osc.next_sample(params.waveform);
            *slot += self.filter.tick(raw * level * self.gain, &params.filter);
        }
    }

    pub fn is_free(&self) -> bool {
        !self.env.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    pub fn is_releasing(&self) -> bool {
        self.env.stage() == EnvelopeStage::Release
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.env.stage()
    }

    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn hold_for_pedal(&mut self) {
        self.pedal_held = true;
    }

    pub fn is_pedal_held(&self) -> bool {
        self.pedal_held
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}
