//! Zone tool configuration
//!
//! Controls where manifests, asset sources, built zones and dumps live, and
//! the limits applied while resolving and converting.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use zonekit_buffer::{BufferConfig, BufferConfigError};
use zonekit_convert::DEFAULT_MEMORY_LIMIT;

/// Zone tool configuration
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    /// Directory holding `<zone>.csv` manifests (default: "zone_source")
    pub source_dir: PathBuf,
    /// Directory holding `<zone>/` asset source trees (default: "zonetool")
    pub asset_dir: PathBuf,
    /// Directory receiving built `<zone>.ff` containers (default: "zones")
    pub output_dir: PathBuf,
    /// Directory receiving dumps (default: "dump")
    pub dump_dir: PathBuf,
    /// Zone buffer configuration
    pub buffer: BufferConfig,
    /// Backoff between `require` load checks (default: 5ms)
    pub require_poll_interval: Duration,
    /// Longest `require` may wait for a dependency (default: 30s)
    pub require_timeout: Duration,
    /// Deepest allowed `include` nesting (default: 16)
    pub max_include_depth: usize,
    /// Byte budget of one conversion pass (default: 256MB)
    pub convert_memory_limit: usize,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            source_dir: PathBuf::from("zone_source"),
            asset_dir: PathBuf::from("zonetool"),
            output_dir: PathBuf::from("zones"),
            dump_dir: PathBuf::from("dump"),
            buffer: BufferConfig::default(),
            require_poll_interval: Duration::from_millis(5),
            require_timeout: Duration::from_secs(30),
            max_include_depth: 16,
            convert_memory_limit: DEFAULT_MEMORY_LIMIT,
        }
    }
}

impl ZoneConfig {
    /// Create config for testing
    ///
    /// Uses short waits and a small conversion budget.
    pub fn for_testing() -> Self {
        ZoneConfig {
            require_poll_interval: Duration::from_millis(1),
            require_timeout: Duration::from_millis(200),
            convert_memory_limit: 16 * 1024 * 1024,
            ..Default::default()
        }
    }

    /// Place every directory under `root`, keeping their default names
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.source_dir = root.join("zone_source");
        self.asset_dir = root.join("zonetool");
        self.output_dir = root.join("zones");
        self.dump_dir = root.join("dump");
        self
    }

    /// Set manifest directory
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    /// Set asset source directory
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    /// Set container output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set dump directory
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    /// Set buffer configuration
    pub fn with_buffer(mut self, buffer: BufferConfig) -> Self {
        self.buffer = buffer;
        self
    }

    /// Set `require` backoff and timeout
    pub fn with_require_wait(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.require_poll_interval = poll_interval;
        self.require_timeout = timeout;
        self
    }

    /// Set include depth limit
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set conversion budget
    pub fn with_convert_memory_limit(mut self, bytes: usize) -> Self {
        self.convert_memory_limit = bytes;
        self
    }

    /// Manifest file of `name`
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.source_dir.join(format!("{}.csv", name))
    }

    /// Asset source tree of `zone`
    pub fn zone_asset_dir(&self, zone: &str) -> PathBuf {
        self.asset_dir.join(zone)
    }

    /// Built container of `zone`
    pub fn zone_path(&self, zone: &str) -> PathBuf {
        self.output_dir.join(format!("{}.ff", zone))
    }

    /// Dump tree of `zone`
    pub fn zone_dump_dir(&self, zone: &str) -> PathBuf {
        self.dump_dir.join(zone)
    }

    /// Capture log of `zone`
    pub fn capture_log_path(&self, zone: &str) -> PathBuf {
        self.dump_dir.join(format!("{}.csv", zone))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.buffer.validate()?;
        if self.max_include_depth == 0 {
            return Err(ConfigError::InvalidIncludeDepth);
        }
        if self.require_poll_interval.is_zero() || self.require_poll_interval > self.require_timeout {
            return Err(ConfigError::InvalidRequireWait {
                poll_interval: self.require_poll_interval,
                timeout: self.require_timeout,
            });
        }
        if self.convert_memory_limit == 0 {
            return Err(ConfigError::InvalidMemoryLimit);
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid buffer configuration
    #[error("Invalid buffer config: {0}")]
    InvalidBuffer(#[from] BufferConfigError),

    /// Include depth of zero
    #[error("max include depth must be at least 1")]
    InvalidIncludeDepth,

    /// Poll interval of zero or longer than the timeout
    #[error("invalid require wait: poll every {poll_interval:?} with timeout {timeout:?}")]
    InvalidRequireWait {
        /// Configured backoff
        poll_interval: Duration,
        /// Configured timeout
        timeout: Duration,
    },

    /// Conversion budget of zero
    #[error("conversion memory limit must be non-zero")]
    InvalidMemoryLimit,
}

impl From<ConfigError> for zonekit_core::Error {
    fn from(e: ConfigError) -> Self {
        zonekit_core::Error::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ZoneConfig::default();
        assert_eq!(config.source_dir, PathBuf::from("zone_source"));
        assert_eq!(config.buffer.stream_count, 7);
        assert_eq!(config.require_poll_interval, Duration::from_millis(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ZoneConfig::for_testing()
            .with_root("/tmp/zk")
            .with_max_include_depth(4)
            .with_convert_memory_limit(1024);

        assert_eq!(config.manifest_path("mp_test"), Path::new("/tmp/zk/zone_source/mp_test.csv"));
        assert_eq!(config.zone_path("mp_test"), Path::new("/tmp/zk/zones/mp_test.ff"));
        assert_eq!(config.capture_log_path("mp_test"), Path::new("/tmp/zk/dump/mp_test.csv"));
        assert_eq!(config.max_include_depth, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            ZoneConfig::default().with_max_include_depth(0).validate(),
            Err(ConfigError::InvalidIncludeDepth)
        ));
        assert!(matches!(
            ZoneConfig::default()
                .with_buffer(BufferConfig::default().with_stream_count(8))
                .validate(),
            Err(ConfigError::InvalidBuffer(_))
        ));
        assert!(matches!(
            ZoneConfig::default()
                .with_require_wait(Duration::from_secs(1), Duration::from_millis(1))
                .validate(),
            Err(ConfigError::InvalidRequireWait { .. })
        ));
        assert!(matches!(
            ZoneConfig::default().with_convert_memory_limit(0).validate(),
            Err(ConfigError::InvalidMemoryLimit)
        ));
    }
}
