use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cutoff in Hz and resonance in `[0, 1)` (0 = no emphasis, approaching 1
/// = self-oscillation).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub cutoff_hz: f32,
    pub resonance: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            cutoff_hz: 8_000.0,
            resonance: 0.1,
        }
    }
}

/// Precomputed state-variable filter coefficients.
///
/// `g` is the warped integrator gain, `k` the damping (2 - 2·resonance).
/// Deriving these once per configuration change keeps the `tan` call out
/// of the per-sample path.
#[derive(Debug, Clone, Copy)]
pub struct FilterCoeffs {
    g: f32,
    k: f32,
}

impl FilterCoeffs {
    pub fn derive(settings: &FilterSettings, sample_rate: f32) -> Self {
        // Clamp below Nyquist; the bilinear-transform prewarp blows up at
        // cutoff = sample_rate / 2.
        let cutoff = settings.cutoff_hz.clamp(10.0, 0.49 * sample_rate);
        let g = (TAU * cutoff / (2.0 * sample_rate)).tan();
        let k = 2.0 - 2.0 * settings.resonance.clamp(0.0, 0.99);
        Self { g, k }
    }
}

/// Two-integrator state-variable filter, low-pass output.
#[derive(Debug, Default)]
pub struct Filter {
    ic1eq: f32, // first integrator's memory
    ic2eq: f32, // second integrator's memory
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tick(&mut self, sample: f32, coeffs: &FilterCoeffs) -> f32 {
        let FilterCoeffs { g, k } = *coeffs;
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
