//! Per-pass session context
//!
//! A [`BuildSession`] is created when a build or dump pass starts and is
//! dropped when it ends. It carries everything the pass used to keep in
//! process-wide state: the zone name, configuration, diagnostics and the
//! cancellation flag.

use crate::config::ZoneConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use zonekit_core::{Diagnostics, Error, Result};

/// Cooperative cancellation flag shared with the caller of a pass
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Fail with a fatal error if cancellation was requested
    pub fn check(&self, pass: &str) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::fatal(format!("{} cancelled", pass)))
        } else {
            Ok(())
        }
    }
}

/// State of one build or dump pass
#[derive(Debug)]
pub struct BuildSession {
    /// Zone being built or dumped
    pub zone: String,
    /// Configuration of the pass
    pub config: ZoneConfig,
    /// Per-asset problems recorded so far
    pub diagnostics: Diagnostics,
    /// Cancellation flag
    pub cancel: CancelToken,
}

impl BuildSession {
    /// Start a pass for `zone`
    pub fn new(zone: impl Into<String>, config: ZoneConfig) -> Self {
        Self::with_cancel(zone, config, CancelToken::new())
    }

    /// Start a pass that observes an existing cancellation token
    pub fn with_cancel(zone: impl Into<String>, config: ZoneConfig, cancel: CancelToken) -> Self {
        BuildSession {
            zone: zone.into(),
            config,
            diagnostics: Diagnostics::new(),
            cancel,
        }
    }
}
