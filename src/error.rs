use thiserror::Error;

use crate::MAX_BLOCK_SIZE;

/// Configuration problems reported from `SynthEngine::new` and `prepare`,
/// before any realtime rendering happens. The render path itself never
/// returns errors.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be between 1 and {MAX_BLOCK_SIZE}, got {0}")]
    InvalidBlockSize(usize),

    #[error("voice capacity must be at least 1")]
    NoVoices,

    #[error("output channel count must be at least 1")]
    NoOutputChannels,
}
