#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeSettings;
use crate::dsp::filter::FilterSettings;
use crate::dsp::oscillator::Waveform;
use crate::error::ConfigError;

/// Static engine configuration, fixed for the engine's lifetime.
///
/// The sound-shaping subset (waveform, envelope, filter, gain) can also be
/// changed while running through the lock-free parameter channel; see
/// `engine::params`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Maximum simultaneous voices (polyphony). The pool is allocated once
    /// at this size and never grows.
    pub max_voices: usize,
    /// Channels the engine fills with audio. Host channels beyond this
    /// count are zeroed, never left as garbage.
    pub output_channels: usize,
    pub waveform: Waveform,
    pub amp_envelope: EnvelopeSettings,
    pub filter: FilterSettings,
    /// Linear output gain applied to the voice mix.
    pub master_gain: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_voices: 8,
            output_channels: 2,
            waveform: Waveform::default(),
            amp_envelope: EnvelopeSettings::default(),
            filter: FilterSettings::default(),
            master_gain: 0.5,
        }
    }
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.output_channels == 0 {
            return Err(ConfigError::NoOutputChannels);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_voices_rejected() {
        let config = EngineConfig {
            max_voices: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoVoices));
    }

    #[test]
    fn zero_channels_rejected() {
        let config = EngineConfig {
            output_channels: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoOutputChannels));
    }
}
