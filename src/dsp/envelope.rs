use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR envelope
=============

    Level
      1.0 ┐     ╱╲
          │    ╱  ╲___________
      S   │   ╱               ╲
          │  ╱                 ╲
      0.0 └─╱───────────────────╲──→ Time
          Attack Decay  Sustain  Release

State machine:

    Idle →(note_on)→ Attack →(level ≥ 1.0)→ Decay →(level ≤ sustain)→
    Sustain →(note_off)→ Release →(level ≤ SILENCE)→ Idle

note_off enters Release from ANY active stage, starting from the current
level so a note released mid-attack does not jump.

Attack is a linear ramp: the increment is 1.0 / (attack_time * sample_rate),
so the peak lands after exactly attack_time seconds at any sample rate.

Decay and Release are exponential approaches: each sample the distance to
the target shrinks by a precomputed multiplier, chosen so the level falls
by a factor of SILENCE over the configured time. Exponential segments
never reach their target, so Release ends at the SILENCE epsilon rather
than exact zero. That epsilon matters: letting the level creep into the
denormal range stalls the floating-point unit on some CPUs, which is an
audible dropout on the audio thread.

All rates live in `EnvelopeRates`, derived once from the settings and the
sample rate. The per-sample step is then branch-plus-multiply with no
divisions, and a rate change from the control thread takes effect without
touching voice state.
*/

/// Envelope timing in seconds plus the sustain level in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

/// Per-sample envelope constants for one sample rate.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeRates {
    attack_increment: f32,
    decay_multiplier: f32,
    sustain_level: f32,
    release_multiplier: f32,
}

/// Level below which a releasing envelope counts as finished.
pub const SILENCE: f32 = 1e-4;

/// Multiplier that scales a level by SILENCE over `time` seconds.
fn decay_multiplier(time: f32, sample_rate: f32) -> f32 {
    SILENCE.powf(1.0 / (time.max(MIN_TIME) * sample_rate))
}

impl EnvelopeRates {
    pub fn derive(settings: &EnvelopeSettings, sample_rate: f32) -> Self {
        Self {
            attack_increment: 1.0 / (settings.attack.max(MIN_TIME) * sample_rate),
            decay_multiplier: decay_multiplier(settings.decay, sample_rate),
            sustain_level: settings.sustain.clamp(0.0, 1.0),
            release_multiplier: decay_multiplier(settings.release, sample_rate),
        }
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug)]
pub struct Envelope {
    stage: EnvelopeStage,
    level: f32,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            stage: EnvelopeStage::Idle,
            level: 0.0,
        }
    }

    /// Gate high: start the attack ramp from the current level.
    ///
    /// Starting from the current level rather than zero keeps retriggers
    /// and stolen voices click-free.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: start the release approach from the current level.
    pub fn note_off(&mut self) {
        if self.stage != EnvelopeStage::Idle {
            self.stage = EnvelopeStage::Release;
        }
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self, rates: &EnvelopeRates) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }
            EnvelopeStage::Attack => {
                self.level += rates.attack_increment;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                let target = rates.sustain_level;
                self.level = target + (self.level - target) * rates.decay_multiplier;
                if self.level - target <= SILENCE {
                    self.level = target;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = rates.sustain_level;
            }
            EnvelopeStage::Release => {
                self.level *= rates.release_multiplier;
                if self.level <= SILENCE {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn rates(attack: f32, decay: f32, sustain: f32, release: f32) -> EnvelopeRates {
        EnvelopeRates::derive(
            &EnvelopeSettings {
                attack,
                decay,
                sustain,
                release,
            },
            SAMPLE_RATE,
        )
    }

    fn advance(env: &mut Envelope, rates: &EnvelopeRates, samples: usize) {
        for _ in 0..samples {
            env.next_sample(rates);
        }
    }

    #[test]
    fn attack_reaches_peak_and_is_monotonic() {
        let rates = rates(0.01, 0.1, 0.7, 0.2);
        let mut env = Envelope::new();
        env.note_on();

        let mut previous = 0.0;
        for _ in 0..(0.01 * SAMPLE_RATE) as usize {
            let level = env.next_sample(&rates);
            assert!(level >= previous, "attack must be non-decreasing");
            previous = level;
        }
        assert!(env.level() > 0.99);
        assert_ne!(env.stage(), EnvelopeStage::Attack);
    }

    #[test]
    fn decay_is_monotonic_and_settles_at_sustain() {
        let sustain = 0.6;
        let rates = rates(0.005, 0.05, sustain, 0.2);
        let mut env = Envelope::new();
        env.note_on();
        advance(&mut env, &rates, (0.005 * SAMPLE_RATE) as usize + 1);
        assert_eq!(env.stage(), EnvelopeStage::Decay);

        let mut previous = env.level();
        for _ in 0..(0.1 * SAMPLE_RATE) as usize {
            let level = env.next_sample(&rates);
            assert!(level <= previous, "decay must be non-increasing");
            previous = level;
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - sustain).abs() < 0.01);
    }

    #[test]
    fn release_falls_to_idle_within_configured_time() {
        let release = 0.05;
        let rates = rates(0.005, 0.02, 0.5, release);
        let mut env = Envelope::new();
        env.note_on();
        advance(&mut env, &rates, 40);

        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Release);
        advance(&mut env, &rates, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn note_off_during_attack_releases_from_current_level() {
        let rates = rates(0.1, 0.1, 0.7, 0.05);
        let mut env = Envelope::new();
        env.note_on();
        advance(&mut env, &rates, 20); // part-way up the ramp

        let level_at_release = env.level();
        assert!(level_at_release < 0.5);

        env.note_off();
        let next = env.next_sample(&rates);
        assert!(next <= level_at_release, "release must not jump upward");
    }

    #[test]
    fn idle_envelope_ignores_note_off() {
        let rates = rates(0.01, 0.1, 0.7, 0.2);
        let mut env = Envelope::new();
        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert_eq!(env.next_sample(&rates), 0.0);
    }
}
