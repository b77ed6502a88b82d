//! Per-asset diagnostics
//!
//! Errors raised while processing one asset never unwind past the build or
//! capture driver. They are recorded here, keyed by (manifest, kind, asset),
//! and logged through `tracing` at the moment they are recorded.

use crate::error::Error;
use crate::kind::AssetKind;
use std::fmt;
use tracing::{error, warn};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Something was skipped but the result is still usable
    Warning,
    /// An entry was rejected
    Error,
    /// The pass was aborted
    Fatal,
}

/// One recorded problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity
    pub severity: Severity,
    /// Manifest (or zone) the entry came from
    pub manifest: String,
    /// Asset kind, when the problem is tied to one
    pub kind: Option<AssetKind>,
    /// Asset name, when the problem is tied to one
    pub asset: Option<String>,
    /// Rendered message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.manifest)?;
        if let Some(kind) = self.kind {
            write!(f, " {}", kind)?;
        }
        if let Some(asset) = &self.asset {
            write!(f, " \"{}\"", asset)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered collection of diagnostics for one pass
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => warn!(target: "zonekit", "{}", diagnostic),
            Severity::Error | Severity::Fatal => error!(target: "zonekit", "{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Record an error for an asset entry
    pub fn asset_error(
        &mut self,
        manifest: &str,
        kind: Option<AssetKind>,
        asset: Option<&str>,
        err: &Error,
    ) {
        let severity = if err.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        };
        self.push(Diagnostic {
            severity,
            manifest: manifest.to_string(),
            kind,
            asset: asset.map(str::to_string),
            message: err.to_string(),
        });
    }

    /// Record a warning
    pub fn warning(
        &mut self,
        manifest: &str,
        kind: Option<AssetKind>,
        asset: Option<&str>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            manifest: manifest.to_string(),
            kind,
            asset: asset.map(str::to_string),
            message: message.into(),
        });
    }

    /// All recorded diagnostics, in order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of diagnostics at `Error` severity or worse
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append another collection
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_includes_key() {
        let d = Diagnostic {
            severity: Severity::Error,
            manifest: "mp_base".to_string(),
            kind: Some(AssetKind::XModel),
            asset: Some("body_a".to_string()),
            message: "boom".to_string(),
        };
        let text = d.to_string();
        assert!(text.contains("mp_base"));
        assert!(text.contains("xmodel"));
        assert!(text.contains("body_a"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_error_count_ignores_warnings() {
        let mut diags = Diagnostics::new();
        diags.warning("z", None, None, "skipped image");
        diags.asset_error(
            "z",
            Some(AssetKind::Sound),
            Some("boom"),
            &Error::not_found("asset", "boom"),
        );
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_fatal_error_recorded_as_fatal() {
        let mut diags = Diagnostics::new();
        diags.asset_error("z", None, None, &Error::fatal("oom"));
        assert_eq!(diags.entries()[0].severity, Severity::Fatal);
    }
}
