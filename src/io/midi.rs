//! Decoding of raw host MIDI into engine messages.
//!
//! Hosts hand us 1-3 byte channel messages with a sample offset into the
//! current block. Anything longer (sysex) or with an unrecognized status
//! byte is dropped without comment: the render path has no way to report
//! errors, and stray MIDI must never interrupt audio.

/// Sustain pedal controller (CC 64).
pub const CC_SUSTAIN_PEDAL: u8 = 64;
/// All sound off (CC 120): immediate silence, envelopes skipped.
pub const CC_ALL_SOUND_OFF: u8 = 120;
/// All notes off (CC 123): release every active voice.
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// A raw MIDI message as supplied by the host, stamped with its sample
/// position inside the block.
#[derive(Debug, Clone, Copy)]
pub struct RawMidi {
    pub timestamp: u32,
    data: [u8; 3],
    len: u8,
}

impl RawMidi {
    /// Capture up to 3 bytes of a host message. Longer messages are kept
    /// only by length so `message()` can reject them.
    pub fn new(timestamp: u32, bytes: &[u8]) -> Self {
        let mut data = [0u8; 3];
        for (slot, byte) in data.iter_mut().zip(bytes) {
            *slot = *byte;
        }
        Self {
            timestamp,
            data,
            len: bytes.len().min(u8::MAX as usize) as u8,
        }
    }

    /// Decode into an engine message, or `None` for anything we ignore.
    pub fn message(&self) -> Option<MidiMessage> {
        if self.len == 0 || self.len > 3 {
            return None;
        }
        MidiMessage::parse(&self.data[..self.len as usize])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiMessage {
    /// Parse a 1-3 byte channel message.
    ///
    /// Note-on with velocity 0 is folded into note-off here, so the rest
    /// of the engine never has to remember that MIDI quirk.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 || data.len() > 2 {
            return None;
        }

        let channel = status & 0x0F;
        let data1 = *data.first()? & 0x7F;
        let data2 = data.get(1).copied().unwrap_or(0) & 0x7F;

        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                key: data1,
                velocity: data2,
            }),
            0x90 if data2 == 0 => Some(MidiMessage::NoteOff {
                channel,
                key: data1,
                velocity: 0,
            }),
            0x90 => Some(MidiMessage::NoteOn {
                channel,
                key: data1,
                velocity: data2,
            }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            Some(MidiMessage::NoteOn {
                channel: 0,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn parses_note_off_and_channel() {
        assert_eq!(
            MidiMessage::parse(&[0x83, 64, 0]),
            Some(MidiMessage::NoteOff {
                channel: 3,
                key: 64,
                velocity: 0
            })
        );
    }

    #[test]
    fn note_on_with_zero_velocity_is_note_off() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 0]),
            Some(MidiMessage::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn parses_control_change() {
        assert_eq!(
            MidiMessage::parse(&[0xB0, CC_SUSTAIN_PEDAL, 127]),
            Some(MidiMessage::ControlChange {
                channel: 0,
                controller: 64,
                value: 127
            })
        );
    }

    #[test]
    fn ignores_unknown_status_and_runt_messages() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[60, 100]), None); // no status bit
        assert_eq!(MidiMessage::parse(&[0xE0, 0, 64]), None); // pitch bend unsupported
        assert_eq!(MidiMessage::parse(&[0xF0, 1, 2]), None); // sysex start
    }

    #[test]
    fn raw_midi_rejects_long_messages() {
        let sysex = [0xF0u8, 1, 2, 3, 4, 0xF7];
        assert!(RawMidi::new(0, &sysex).message().is_none());

        let ok = RawMidi::new(7, &[0x90, 60, 100]);
        assert_eq!(ok.timestamp, 7);
        assert!(ok.message().is_some());
    }
}
