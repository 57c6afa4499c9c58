use crate::io::midi::MidiMessage;

/// Most events the queue holds for one block. Pushes past this are
/// dropped; 256 is far beyond anything a host delivers per block.
pub const MAX_BLOCK_EVENTS: usize = 256;

/// A decoded event positioned inside the current block.
#[derive(Debug, Clone, Copy)]
pub struct BlockEvent {
    pub timestamp: u32,
    pub message: MidiMessage,
}

/// Time-ordered event queue for one processing block.
///
/// Storage is reserved once up front; pushing never allocates. Events are
/// kept sorted by timestamp as they arrive, with ties preserving arrival
/// order (a note-off/note-on pair at the same sample must apply in the
/// order the host sent it). Event counts per block are tiny, so a linear
/// insertion scan beats anything clever.
#[derive(Debug)]
pub struct EventQueue {
    events: Vec<BlockEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(MAX_BLOCK_EVENTS),
        }
    }

    /// Insert an event, keeping the queue sorted and stable. Silently
    /// drops the event if the queue is full.
    pub fn push(&mut self, timestamp: u32, message: MidiMessage) {
        if self.events.len() == self.events.capacity() {
            return;
        }

        // Scan from the back: equal timestamps stay in arrival order.
        let mut index = self.events.len();
        while index > 0 && self.events[index - 1].timestamp > timestamp {
            index -= 1;
        }
        self.events.insert(index, BlockEvent { timestamp, message });
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockEvent> {
        self.events.iter()
    }

    pub fn get(&self, index: usize) -> Option<&BlockEvent> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
