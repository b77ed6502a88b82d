//! Buffer and container errors

use crate::stream::StreamId;
use thiserror::Error;
use zonekit_core::Error as CoreError;

/// Errors raised while packing a zone
///
/// Every variant is fatal for the pass: a buffer that raised one of these
/// must not be finalized into a container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Allocation requested in a stream the buffer was not configured with
    #[error("stream {stream} does not exist (buffer has {count} streams)")]
    InvalidStream {
        /// Requested stream index
        stream: u8,
        /// Configured stream count
        count: usize,
    },

    /// Stream capacity exhausted
    #[error("stream {stream} exhausted: {requested} bytes requested, capacity {capacity}")]
    Exhausted {
        /// Stream that overflowed
        stream: StreamId,
        /// End offset the allocation would reach
        requested: u64,
        /// Configured capacity
        capacity: u32,
    },

    /// A pointer targets a handle that was reserved but never bound
    #[error("unresolved pointer at {stream}+{offset:#x} to handle {handle}")]
    UnresolvedPointer {
        /// Stream holding the pointer field
        stream: StreamId,
        /// Offset of the pointer field
        offset: u32,
        /// Target handle
        handle: u32,
    },

    /// Handle does not belong to this buffer, or was bound twice
    #[error("invalid handle {0}")]
    InvalidHandle(u32),

    /// Write past the end of an allocation
    #[error("write of {len} bytes at offset {offset} overruns allocation of {size} bytes")]
    OutOfBounds {
        /// Field offset within the allocation
        offset: u32,
        /// Bytes written
        len: u32,
        /// Allocation size
        size: u32,
    },

    /// The finished buffer could not be serialized
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Errors raised while parsing a container
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// Input shorter than the fixed header and footer
    #[error("container too small: {size} bytes")]
    TooSmall {
        /// Input length
        size: usize,
    },

    /// Magic bytes mismatch
    #[error("invalid magic bytes: {0:?}")]
    InvalidMagic([u8; 4]),

    /// Unknown format version
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u32),

    /// Stream count outside 1..=7
    #[error("invalid stream count {0}")]
    InvalidStreamCount(u32),

    /// Checksum mismatch
    #[error("crc mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        /// Footer value
        stored: u32,
        /// Value computed over the body
        computed: u32,
    },

    /// A table or stream runs past the end of the input
    #[error("container truncated while reading {0}")]
    Truncated(&'static str),

    /// Pointer does not decode to a location inside a stream
    #[error("bad pointer {0:#010x}")]
    BadPointer(u32),

    /// Relocation entry disagrees with the field it patches
    #[error("relocation mismatch at stream {stream} offset {offset:#x}")]
    RelocationMismatch {
        /// Stream holding the field
        stream: u8,
        /// Field offset
        offset: u32,
    },

    /// Interned value index out of range
    #[error("interned value {0} out of range")]
    BadIntern(u32),

    /// String is not UTF-8
    #[error("invalid utf-8 in {0}")]
    InvalidUtf8(&'static str),

    /// Zone name longer than its u16 length prefix allows
    #[error("zone name is {len} bytes, limit is {}", u16::MAX)]
    NameTooLong {
        /// Name length in bytes
        len: usize,
    },
}

impl From<BufferError> for CoreError {
    fn from(e: BufferError) -> Self {
        CoreError::Fatal(e.to_string())
    }
}

impl From<ContainerError> for CoreError {
    fn from(e: ContainerError) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_errors_are_fatal() {
        let err: CoreError = BufferError::InvalidStream { stream: 7, count: 7 }.into();
        assert!(err.is_fatal());
        let err: CoreError = BufferError::InvalidHandle(3).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_container_errors_are_not_fatal() {
        let err: CoreError = ContainerError::InvalidMagic(*b"NOPE").into();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("magic"));
    }
}
