pub mod config;
pub mod dsp; // Allocation-free signal-processing primitives
pub mod engine; // Block rendering, event scheduling, voice allocation
pub mod error;
pub mod io; // Host-facing MIDI boundary
pub mod synth; // One-note voice: oscillator + envelope + filter

pub use config::EngineConfig;
pub use engine::SynthEngine;
pub use error::ConfigError;

/// Largest block the engine renders in one pass. Longer host blocks are
/// processed in chunks of at most this many samples.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Shortest envelope segment we distinguish (one sample at 48kHz).
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
