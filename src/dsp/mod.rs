//! Low-level DSP primitives embedded inside voices.
//!
//! Everything in this module is allocation-free and realtime-safe: plain
//! structs of floats, advanced one sample at a time. Sample-rate-dependent
//! constants are folded into rate/coefficient structs up front so the
//! per-sample work is a handful of multiplies.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Resonant state-variable filter.
pub mod filter;
/// Phase-accumulator oscillator and waveform shapes.
pub mod oscillator;

pub use envelope::EnvelopeStage;
pub use oscillator::Waveform;
