//! Block rendering: event scheduling, voice allocation, and the segment
//! walk that makes MIDI sample-accurate.

/// Voice pool ownership and note-to-voice mapping.
pub mod allocator;
/// Per-block, time-ordered event queue.
pub mod events;
/// Lock-free parameter snapshots from the control thread.
pub mod params;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, RingBuffer};

use crate::config::EngineConfig;
use crate::engine::allocator::VoiceAllocator;
use crate::engine::events::EventQueue;
use crate::engine::params::{DerivedParams, ParamSnapshot};
use crate::error::ConfigError;
use crate::io::midi::{MidiMessage, RawMidi};
use crate::MAX_BLOCK_SIZE;

#[cfg(feature = "rtrb")]
use crate::engine::params::{ParamPublisher, PARAM_QUEUE_SIZE};

/// The synthesizer core a host drives with three calls:
/// `prepare(sample_rate, max_block)`, then `render_block` once per audio
/// callback, and `reset` on transport stops.
///
/// `render_block` is realtime-safe: after construction it performs no
/// allocation, locking, or I/O. All buffers are sized up front and every
/// event-path "failure" (malformed MIDI, queue overflow, allocation with a
/// full pool) degrades silently instead of erroring.
pub struct SynthEngine {
    config: EngineConfig,
    allocator: VoiceAllocator,
    queue: EventQueue,
    snapshot: ParamSnapshot,
    derived: DerivedParams,
    sample_rate: f32,
    prepared: bool,
    /// Mono voice accumulator; segments longer than this render in chunks.
    mix: Vec<f32>,
    #[cfg(feature = "rtrb")]
    param_rx: Option<Consumer<ParamSnapshot>>,
}

impl SynthEngine {
    /// Build the engine and allocate its voice pool. This is the last
    /// allocation the audio path will ever see.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let snapshot = ParamSnapshot::from(&config);
        // Placeholder rate until `prepare`; rendering is gated on
        // `prepared`, so these constants are never used as-is.
        let derived = DerivedParams::derive(&snapshot, 44_100.0);

        tracing::debug!(
            voices = config.max_voices,
            channels = config.output_channels,
            "engine created"
        );

        Ok(Self {
            allocator: VoiceAllocator::new(config.max_voices),
            queue: EventQueue::new(),
            snapshot,
            derived,
            sample_rate: 0.0,
            prepared: false,
            mix: vec![0.0; MAX_BLOCK_SIZE],
            #[cfg(feature = "rtrb")]
            param_rx: None,
            config,
        })
    }

    /// Derive all sample-rate-dependent constants. Must succeed before
    /// any `render_block` call produces sound.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) -> Result<(), ConfigError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        if max_block == 0 || max_block > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(max_block));
        }

        self.sample_rate = sample_rate;
        self.derived = DerivedParams::derive(&self.snapshot, sample_rate);
        self.allocator.reset();
        self.queue.clear();
        self.prepared = true;

        tracing::debug!(sample_rate = sample_rate as f64, max_block, "engine prepared");
        Ok(())
    }

    /// Render one block. Writes exactly `channels[n].len()` samples to
    /// every channel regardless of the event set: the engine's output
    /// channels get the voice mix, the rest are zeroed.
    ///
    /// `events` may arrive in any order; they are decoded, time-sorted,
    /// and applied at their sample positions between render segments.
    /// Timestamps past the end of the block are clamped to it.
    pub fn render_block(&mut self, channels: &mut [&mut [f32]], events: &[RawMidi]) {
        let Some(first) = channels.first() else {
            return;
        };
        let block_len = first.len();

        if !self.prepared {
            for channel in channels.iter_mut() {
                channel.fill(0.0);
            }
            return;
        }

        self.drain_params();

        for raw in events {
            if let Some(message) = raw.message() {
                self.queue.push(raw.timestamp.min(block_len as u32), message);
            }
        }

        // Walk the block in segments bounded by event timestamps, exactly
        // as the events fall: render up to each event, apply it, continue.
        // With no events the whole block is one segment.
        let mut cursor = 0usize;
        for index in 0..self.queue.len() {
            let Some(event) = self.queue.get(index).copied() else {
                break;
            };
            let boundary = (event.timestamp as usize).min(block_len);
            if boundary > cursor {
                self.render_segment(channels, cursor, boundary - cursor);
                cursor = boundary;
            }
            self.apply(event.message);
        }
        if cursor < block_len {
            self.render_segment(channels, cursor, block_len - cursor);
        }

        // Host buffers can carry garbage in channels we don't fill.
        let filled = self.config.output_channels.min(channels.len());
        for channel in channels[filled..].iter_mut() {
            channel.fill(0.0);
        }

        self.queue.clear();
    }

    /// Force every voice idle and drop pending events. For transport
    /// stop/reposition; the engine stays prepared.
    pub fn reset(&mut self) {
        self.allocator.reset();
        self.queue.clear();
        tracing::debug!("engine reset");
    }

    /// Create the control-thread handle for runtime parameter changes.
    /// The engine picks up the newest published snapshot at the start of
    /// each block. Calling this again invalidates the previous publisher.
    #[cfg(feature = "rtrb")]
    pub fn param_channel(&mut self) -> ParamPublisher {
        let (tx, rx) = RingBuffer::new(PARAM_QUEUE_SIZE);
        self.param_rx = Some(rx);
        ParamPublisher::new(tx)
    }

    pub fn active_voices(&self) -> usize {
        self.allocator.active_voices()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(feature = "rtrb")]
    fn drain_params(&mut self) {
        let mut latest = None;
        if let Some(rx) = self.param_rx.as_mut() {
            while let Ok(snapshot) = rx.pop() {
                latest = Some(snapshot);
            }
        }
        if let Some(snapshot) = latest {
            if snapshot != self.snapshot {
                self.snapshot = snapshot;
                self.derived = DerivedParams::derive(&snapshot, self.sample_rate);
            }
        }
    }

    #[cfg(not(feature = "rtrb"))]
    fn drain_params(&mut self) {}

    /// Render `remaining` samples starting at `offset`, in chunks bounded
    /// by the mix buffer, summing voices and copying to the output
    /// channels.
    fn render_segment(&mut self, channels: &mut [&mut [f32]], mut offset: usize, mut remaining: usize) {
        let filled = self.config.output_channels.min(channels.len());

        while remaining > 0 {
            let chunk = remaining.min(self.mix.len());
            let mix = &mut self.mix[..chunk];
            mix.fill(0.0);

            for voice in self
                .allocator
                .voices_mut()
                .iter_mut()
                .filter(|v| v.is_active())
            {
                voice.render(mix, &self.derived);
            }

            let gain = self.derived.master_gain;
            for sample in mix.iter_mut() {
                *sample *= gain;
            }

            for channel in channels[..filled].iter_mut() {
                if let Some(slice) = channel.get_mut(offset..offset + chunk) {
                    slice.copy_from_slice(mix);
                }
            }

            offset += chunk;
            remaining -= chunk;
        }
    }

    fn apply(&mut self, message: MidiMessage) {
        match message {
            MidiMessage::NoteOn { key, velocity, .. } => {
                self.allocator.note_on(key, velocity, &self.derived);
            }
            MidiMessage::NoteOff { key, .. } => {
                self.allocator.note_off(key);
            }
            MidiMessage::ControlChange {
                controller, value, ..
            } => {
                self.allocator.control_change(controller, value);
            }
        }
    }
}
