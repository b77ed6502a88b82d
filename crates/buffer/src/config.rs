//! Buffer configuration

use crate::stream::{StreamId, MAX_STREAM_OFFSET};
use thiserror::Error;

/// Zone buffer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Number of streams (1..=7)
    pub stream_count: usize,
    /// Per-stream capacity in bytes
    pub max_stream_size: u32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig {
            stream_count: StreamId::ALL.len(),
            max_stream_size: MAX_STREAM_OFFSET,
        }
    }
}

impl BufferConfig {
    /// Set stream count
    pub fn with_stream_count(mut self, count: usize) -> Self {
        self.stream_count = count;
        self
    }

    /// Set per-stream capacity
    pub fn with_max_stream_size(mut self, size: u32) -> Self {
        self.max_stream_size = size;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), BufferConfigError> {
        if self.stream_count == 0 || self.stream_count > StreamId::ALL.len() {
            return Err(BufferConfigError::InvalidStreamCount(self.stream_count));
        }
        if self.max_stream_size == 0 || self.max_stream_size > MAX_STREAM_OFFSET {
            return Err(BufferConfigError::InvalidStreamSize(self.max_stream_size));
        }
        Ok(())
    }
}

/// Buffer configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferConfigError {
    /// Stream count out of range
    #[error("stream count must be between 1 and 7, got {0}")]
    InvalidStreamCount(usize),
    /// Stream size out of range
    #[error("max stream size must be between 1 and 2^28, got {0}")]
    InvalidStreamSize(u32),
}
