//! Error types for zonekit
//!
//! The taxonomy is shared by the build driver, the converter layer and the
//! capture driver. Per-asset errors are turned into [`crate::Diagnostic`]s at
//! the asset boundary; only fatal errors unwind to the caller of a pass.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for zonekit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for zone builds, dumps and conversions
#[derive(Debug, Error)]
pub enum Error {
    /// A manifest, zone file, dependency or asset could not be located
    #[error("{what} not found: {name}")]
    NotFound {
        /// What was looked up ("manifest", "zone", "asset", ...)
        what: &'static str,
        /// Name that was looked up
        name: String,
    },

    /// Unknown asset kind, malformed manifest line or missing transform
    #[error("Validation error: {0}")]
    Validation(String),

    /// The target schema cannot hold the source value
    #[error("Capacity exceeded for {asset}: {field} is {actual}, limit is {limit}")]
    Capacity {
        /// Asset being converted
        asset: String,
        /// Field that overflowed
        field: &'static str,
        /// Largest value the target schema accepts
        limit: u64,
        /// Value held by the source
        actual: u64,
    },

    /// Allocator exhaustion or a corrupt pointer graph; aborts the whole pass
    #[error("Fatal build error: {0}")]
    Fatal(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dump (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`]
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Shorthand for a [`Error::Validation`]
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Shorthand for a [`Error::Fatal`]
    pub fn fatal(message: impl Into<String>) -> Self {
        Error::Fatal(message.into())
    }

    /// Whether this error must abort the entire pass
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::not_found("manifest", "mp_test");
        let msg = err.to_string();
        assert!(msg.contains("manifest not found"));
        assert!(msg.contains("mp_test"));
    }

    #[test]
    fn test_error_display_capacity() {
        let err = Error::Capacity {
            asset: "viewmodel".to_string(),
            field: "num_lods",
            limit: 6,
            actual: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("viewmodel"));
        assert!(msg.contains("num_lods"));
        assert!(msg.contains('6'));
        assert!(msg.contains('8'));
    }

    #[test]
    fn test_only_fatal_is_fatal() {
        assert!(Error::fatal("out of memory").is_fatal());
        assert!(!Error::validation("bad line").is_fatal());
        assert!(!Error::not_found("zone", "common").is_fatal());
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        assert!(!Error::from(io_err).is_fatal());
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
