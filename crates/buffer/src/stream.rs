//! Stream identifiers and pointer encoding
//!
//! A zone is split into up to seven streams by usage class so the loader can
//! read headers eagerly and bulk data lazily. Streams are stored in the fixed
//! order of [`StreamId::ALL`].
//!
//! # Pointer encoding
//!
//! ```text
//! 0                            null
//! ((stream + 1) << 28) | off   stream index in the top 4 bits, offset below
//! ```

use std::fmt;

/// Largest offset (exclusive) a pointer can address within one stream
pub const MAX_STREAM_OFFSET: u32 = 1 << 28;

/// Stream index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId(pub u8);

impl StreamId {
    /// Scratch data, discarded after load
    pub const TEMP: StreamId = StreamId(0);
    /// Headers needed while loading
    pub const RUNTIME_VIRTUAL: StreamId = StreamId(1);
    /// GPU data needed while loading
    pub const RUNTIME_PHYSICAL: StreamId = StreamId(2);
    /// Streamed-in data
    pub const DELAY_VIRTUAL: StreamId = StreamId(3);
    /// Streamed-in GPU data
    pub const DELAY_PHYSICAL: StreamId = StreamId(4);
    /// Resident data
    pub const VIRTUAL: StreamId = StreamId(5);
    /// Resident GPU data
    pub const PHYSICAL: StreamId = StreamId(6);

    /// All streams in container order
    pub const ALL: [StreamId; 7] = [
        StreamId::TEMP,
        StreamId::RUNTIME_VIRTUAL,
        StreamId::RUNTIME_PHYSICAL,
        StreamId::DELAY_VIRTUAL,
        StreamId::DELAY_PHYSICAL,
        StreamId::VIRTUAL,
        StreamId::PHYSICAL,
    ];

    /// Stream name
    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "temp",
            1 => "runtime_virtual",
            2 => "runtime_physical",
            3 => "delay_virtual",
            4 => "delay_physical",
            5 => "virtual",
            6 => "physical",
            _ => "invalid",
        }
    }

    /// Base alignment of the stream
    pub fn alignment(&self) -> u32 {
        match self.0 {
            0 => 4,
            2 | 4 | 6 => 128,
            _ => 16,
        }
    }

    /// Index as usize
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode a `(stream, offset)` location as a pointer field value
pub fn encode_pointer(stream: StreamId, offset: u32) -> u32 {
    debug_assert!(offset < MAX_STREAM_OFFSET);
    ((stream.0 as u32 + 1) << 28) | offset
}

/// Decode a pointer field value; `None` for null
pub fn decode_pointer(value: u32) -> Option<(StreamId, u32)> {
    if value == 0 {
        return None;
    }
    let stream = (value >> 28) as u8;
    Some((StreamId(stream.wrapping_sub(1)), value & (MAX_STREAM_OFFSET - 1)))
}
