//! Lock-free parameter updates from the control thread.
//!
//! A GUI or host automation thread must never share mutable state with the
//! audio thread. Instead the control side publishes complete
//! [`ParamSnapshot`]s through a single-producer/single-consumer ring; the
//! engine drains the ring at each block start and keeps only the newest
//! snapshot. Neither side ever blocks, and the audio thread always sees a
//! coherent set of parameters.

#[cfg(feature = "rtrb")]
use rtrb::{Producer, PushError};

use crate::config::EngineConfig;
use crate::dsp::envelope::{EnvelopeRates, EnvelopeSettings};
use crate::dsp::filter::{FilterCoeffs, FilterSettings};
use crate::dsp::oscillator::Waveform;

/// Snapshots queued between control and audio thread. The ring is drained
/// every block, so a handful of slots is plenty.
pub(crate) const PARAM_QUEUE_SIZE: usize = 16;

/// The runtime-adjustable subset of the engine configuration, published
/// atomically as one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub waveform: Waveform,
    pub amp_envelope: EnvelopeSettings,
    pub filter: FilterSettings,
    pub master_gain: f32,
}

impl From<&EngineConfig> for ParamSnapshot {
    fn from(config: &EngineConfig) -> Self {
        Self {
            waveform: config.waveform,
            amp_envelope: config.amp_envelope,
            filter: config.filter,
            master_gain: config.master_gain,
        }
    }
}

/// Snapshot folded into per-sample constants for one sample rate.
///
/// Derived once at `prepare` and once per snapshot change, never inside
/// the per-sample loop.
#[derive(Debug, Clone, Copy)]
pub struct DerivedParams {
    pub sample_rate: f32,
    pub waveform: Waveform,
    pub env: EnvelopeRates,
    pub filter: FilterCoeffs,
    pub master_gain: f32,
}

impl DerivedParams {
    pub fn derive(snapshot: &ParamSnapshot, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            waveform: snapshot.waveform,
            env: EnvelopeRates::derive(&snapshot.amp_envelope, sample_rate),
            filter: FilterCoeffs::derive(&snapshot.filter, sample_rate),
            master_gain: snapshot.master_gain,
        }
    }
}

/// Control-thread handle for publishing parameter changes.
#[cfg(feature = "rtrb")]
pub struct ParamPublisher {
    tx: Producer<ParamSnapshot>,
}

#[cfg(feature = "rtrb")]
impl ParamPublisher {
    pub(crate) fn new(tx: Producer<ParamSnapshot>) -> Self {
        Self { tx }
    }

    /// Publish a snapshot. Returns `false` if the ring was full, which
    /// only happens when the audio thread has stopped draining; the
    /// snapshot is dropped rather than waited on.
    pub fn publish(&mut self, snapshot: ParamSnapshot) -> bool {
        match self.tx.push(snapshot) {
            Ok(()) => true,
            Err(PushError::Full(_)) => {
                tracing::warn!("parameter ring full, snapshot dropped");
                false
            }
        }
    }
}
