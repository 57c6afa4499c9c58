use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform character, for the curious:

  Sine      fundamental only; smooth and hollow
  Saw       every harmonic at 1/n; the classic subtractive starting point
  Triangle  odd harmonics at 1/n²; soft, almost sine-like
  Pulse     odd harmonics for width 0.5 (square); narrower widths sound
            thinner and more nasal

These are naive (non-bandlimited) shapes. Aliasing above ~1/4 of the
sample rate is audible on saw/pulse, which is acceptable for this engine's
scope and keeps the per-sample cost to a couple of arithmetic ops.
*/

/// Waveform selection, resolved by `match` in the render loop.
///
/// Pulse carries its width so the whole timbre choice travels as one
/// copyable value through parameter snapshots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Saw,
    Triangle,
    /// Rectangular pulse; `width` is the duty cycle in (0, 1).
    Pulse { width: f32 },
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Saw
    }
}

/// Phase accumulator in `[0, 1)` with a per-sample increment of
/// `frequency / sample_rate`.
#[derive(Debug, Default)]
pub struct Oscillator {
    phase: f32,
    increment: f32,
}

/// MIDI note number to frequency in Hz. A4 = 440 Hz = MIDI note 69.
#[inline]
pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

impl Oscillator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retune without resetting phase (phase continuity avoids clicks on
    /// retrigger).
    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        self.increment = frequency / sample_rate;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.increment = 0.0;
    }

    /// Evaluate the waveform at the current phase, then advance one sample.
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform) -> f32 {
        let phase = self.phase;
        let value = match waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
            Waveform::Pulse { width } => {
                if phase < width {
                    1.0
                } else {
                    -1.0
                }
            }
        };

        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value
    }

    /// Current phase in `[0, 1)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }
}
