//! Live capture driver
//!
//! Dumping a zone is split in two halves. The [`CaptureSink`] is handed to
//! the host and called from its asset-loading path; it only appends to a
//! pending list and flips a flag. The [`CaptureSession`] owns everything
//! else: once the load has finished it converts, dumps and logs the captured
//! assets, resolves references against the live asset set and then drops all
//! pass state.

use crate::config::ZoneConfig;
use crate::host::AssetLookup;
use crate::session::CancelToken;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use zonekit_assets::{dump_record, TypeRegistry};
use zonekit_convert::{TransformTable, ZoneMemory};
use zonekit_core::{AssetKind, AssetRecord, Diagnostics, Error, Result, Schema};

/// What a capture pass does with the assets it sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Convert and write every asset to the dump tree
    Dump,
    /// Only log every asset
    Verify,
}

#[derive(Debug, Default)]
struct CaptureState {
    pending: Mutex<Vec<AssetRecord>>,
    finished: AtomicBool,
}

/// Host-facing half of a capture pass
///
/// Cheap to clone; every clone feeds the same session.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    state: Arc<CaptureState>,
}

impl CaptureSink {
    /// Record one asset resolved by the host
    pub fn on_asset(&self, record: AssetRecord) {
        self.state.pending.lock().push(record);
    }

    /// Signal that the host finished loading the zone
    pub fn finish_load(&self) {
        self.state.finished.store(true, Ordering::Release);
    }
}

/// Result of a finished capture pass
#[derive(Debug)]
pub struct CaptureReport {
    /// Zone captured
    pub zone: String,
    /// Mode of the pass
    pub mode: CaptureMode,
    /// Number of assets delivered by the host, reference stubs included
    pub captured: usize,
    /// Files written to the dump tree, in write order
    pub dumped: Vec<PathBuf>,
    /// Referenced assets found in the live set and dumped
    pub resolved_references: usize,
    /// Capture log, when one was written
    pub log: Option<PathBuf>,
    /// Per-asset problems
    pub diagnostics: Diagnostics,
}

/// Starts capture passes
pub struct CaptureDriver<'a> {
    registry: &'a TypeRegistry,
    table: &'a TransformTable,
    config: ZoneConfig,
}

impl<'a> CaptureDriver<'a> {
    /// Driver using the standard transform table
    pub fn new(registry: &'a TypeRegistry, config: ZoneConfig) -> Self {
        Self::with_table(registry, TransformTable::shared(), config)
    }

    /// Driver using a custom transform table
    pub fn with_table(registry: &'a TypeRegistry, table: &'a TransformTable, config: ZoneConfig) -> Self {
        CaptureDriver {
            registry,
            table,
            config,
        }
    }

    /// Start capturing `zone`, converting from `from` to `to`
    pub fn begin(
        &self,
        zone: impl Into<String>,
        mode: CaptureMode,
        from: Schema,
        to: Schema,
    ) -> (CaptureSink, CaptureSession<'a>) {
        let state = Arc::new(CaptureState::default());
        let zone = zone.into();
        info!(target: "zonekit::capture", zone = %zone, mode = ?mode, from = %from, to = %to, "Capture started");
        let session = CaptureSession {
            zone,
            mode,
            from,
            to,
            registry: self.registry,
            table: self.table,
            config: self.config.clone(),
            cancel: CancelToken::new(),
            state: Arc::clone(&state),
        };
        (CaptureSink { state }, session)
    }
}

/// Deferred half of a capture pass
pub struct CaptureSession<'a> {
    zone: String,
    mode: CaptureMode,
    from: Schema,
    to: Schema,
    registry: &'a TypeRegistry,
    table: &'a TransformTable,
    config: ZoneConfig,
    cancel: CancelToken,
    state: Arc<CaptureState>,
}

/// Mutable state of [`CaptureSession::finish`]
struct DumpPass {
    memory: ZoneMemory,
    dumped: HashSet<(AssetKind, String)>,
    missing_transforms: HashSet<AssetKind>,
    files: Vec<PathBuf>,
    diagnostics: Diagnostics,
}

impl<'a> CaptureSession<'a> {
    /// Zone being captured
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Token that aborts [`CaptureSession::finish`] between assets
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Number of assets captured so far
    pub fn captured(&self) -> usize {
        self.state.pending.lock().len()
    }

    /// Whether the host signalled the end of the load
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Wait up to `timeout` for the end of the load
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(self.config.require_poll_interval);
        }
        true
    }

    /// Run the deferred work of the pass
    pub fn finish(self, lookup: &dyn AssetLookup) -> Result<CaptureReport> {
        let records = std::mem::take(&mut *self.state.pending.lock());
        let mut report = CaptureReport {
            zone: self.zone.clone(),
            mode: self.mode,
            captured: records.len(),
            dumped: Vec::new(),
            resolved_references: 0,
            log: None,
            diagnostics: Diagnostics::new(),
        };

        if self.mode == CaptureMode::Verify {
            for record in &records {
                self.cancel.check("verify")?;
                info!(
                    target: "zonekit::capture",
                    zone = %self.zone,
                    kind = %record.kind,
                    asset = %record.name,
                    "Verified asset"
                );
            }
            info!(target: "zonekit::capture", zone = %self.zone, assets = records.len(), "Verify finished");
            return Ok(report);
        }

        report.log = Some(self.write_log(&records)?);

        let mut pass = DumpPass {
            memory: ZoneMemory::new(self.config.convert_memory_limit),
            dumped: HashSet::new(),
            missing_transforms: HashSet::new(),
            files: Vec::new(),
            diagnostics: Diagnostics::new(),
        };

        let mut references: Vec<(AssetKind, String)> = Vec::new();
        for record in &records {
            self.cancel.check("dump")?;
            if record.is_reference() {
                references.push((record.kind, record.base_name().to_string()));
                continue;
            }
            self.dump_one(&mut pass, record)?;
        }

        references.sort();
        references.dedup();
        for (kind, name) in references {
            self.cancel.check("dump")?;
            if name.is_empty() || pass.dumped.contains(&(kind, name.clone())) {
                continue;
            }
            if kind == AssetKind::Image {
                pass.diagnostics.warning(&self.zone, Some(kind), Some(&name), "referenced image not dumped");
                continue;
            }
            match lookup.find_asset(kind, &name) {
                Some(record) => {
                    if self.dump_one(&mut pass, &record)? {
                        report.resolved_references += 1;
                    }
                }
                None => {
                    let err = Error::not_found("live asset", name.clone());
                    pass.diagnostics.asset_error(&self.zone, Some(kind), Some(&name), &err);
                }
            }
        }

        info!(
            target: "zonekit::capture",
            zone = %self.zone,
            captured = report.captured,
            dumped = pass.files.len(),
            references = report.resolved_references,
            errors = pass.diagnostics.error_count(),
            memory = pass.memory.used(),
            "Dump finished"
        );
        report.dumped = pass.files;
        report.diagnostics = pass.diagnostics;
        Ok(report)
    }

    /// Convert and dump one first-class record; `Ok(false)` when it was
    /// skipped with a diagnostic
    fn dump_one(&self, pass: &mut DumpPass, record: &AssetRecord) -> Result<bool> {
        let key = (record.kind, record.base_name().to_string());
        if pass.dumped.contains(&key) {
            return Ok(false);
        }

        if !self.table.contains(record.kind, self.from, self.to) {
            if pass.missing_transforms.insert(record.kind) {
                let err = Error::validation(format!(
                    "missing conversion transform for {} from {} to {}",
                    record.kind, self.from, self.to
                ));
                pass.diagnostics.asset_error(&self.zone, Some(record.kind), Some(&record.name), &err);
            } else {
                debug!(target: "zonekit::capture", kind = %record.kind, asset = %record.name, "Skipped unconvertible asset");
            }
            return Ok(false);
        }

        let written = self
            .table
            .convert(record, self.from, self.to, &mut pass.memory)
            .and_then(|converted| dump_record(self.registry, &self.config.zone_dump_dir(&self.zone), &converted));
        match written {
            Ok(path) => {
                pass.dumped.insert(key);
                pass.files.push(path);
                Ok(true)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                pass.diagnostics.asset_error(&self.zone, Some(record.kind), Some(&record.name), &e);
                Ok(false)
            }
        }
    }

    /// Write `<dump_dir>/<zone>.csv` listing every captured asset
    fn write_log(&self, records: &[AssetRecord]) -> Result<PathBuf> {
        let mut text = String::new();
        for record in records {
            let _ = writeln!(text, "{},{}", record.kind, record.name);
        }
        let path = self.config.capture_log_path(&self.zone);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        debug!(target: "zonekit::capture", zone = %self.zone, path = %path.display(), "Wrote capture log");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use zonekit_core::{AssetPayload, LocalizeEntry, RawFile};

    #[derive(Default)]
    struct LiveSet(HashMap<(AssetKind, String), AssetRecord>);

    impl LiveSet {
        fn with(mut self, record: AssetRecord) -> Self {
            self.0.insert((record.kind, record.name.clone()), record);
            self
        }
    }

    impl AssetLookup for LiveSet {
        fn find_asset(&self, kind: AssetKind, name: &str) -> Option<AssetRecord> {
            self.0.get(&(kind, name.to_string())).cloned()
        }
    }

    fn rawfile(name: &str) -> AssetRecord {
        AssetRecord::new(AssetKind::RawFile, name, AssetPayload::RawFile(RawFile::from_text(name)))
    }

    #[test]
    fn test_sink_feeds_session() {
        let registry = TypeRegistry::native();
        let driver = CaptureDriver::new(&registry, ZoneConfig::for_testing());
        let (sink, session) = driver.begin("mp_test", CaptureMode::Verify, Schema::H1, Schema::H1);
        let other = sink.clone();
        assert!(!session.wait(Duration::from_millis(5)));

        sink.on_asset(rawfile("a.gsc"));
        other.on_asset(rawfile("b.gsc"));
        other.finish_load();

        assert!(session.wait(Duration::from_millis(5)));
        assert_eq!(session.captured(), 2);
        let report = session.finish(&LiveSet::default()).unwrap();
        assert_eq!(report.captured, 2);
        assert!(report.dumped.is_empty());
        assert!(report.log.is_none());
    }

    #[test]
    fn test_dump_writes_assets_and_log() {
        let dir = TempDir::new().unwrap();
        let config = ZoneConfig::for_testing().with_root(dir.path());
        let registry = TypeRegistry::native();
        let driver = CaptureDriver::new(&registry, config.clone());
        let (sink, session) = driver.begin("mp_test", CaptureMode::Dump, Schema::H1, Schema::Iw6);

        sink.on_asset(rawfile("maps/mp/a.gsc"));
        sink.on_asset(AssetRecord::reference(AssetKind::Localize, "MENU_OK"));
        sink.on_asset(AssetRecord::reference(AssetKind::Localize, "MENU_OK"));
        sink.on_asset(AssetRecord::reference(AssetKind::Image, "white"));
        sink.on_asset(AssetRecord::reference(AssetKind::RawFile, "gone.gsc"));
        sink.finish_load();

        let live = LiveSet::default().with(AssetRecord::new(
            AssetKind::Localize,
            "MENU_OK",
            AssetPayload::Localize(LocalizeEntry { value: "OK".into() }),
        ));
        let report = session.finish(&live).unwrap();

        assert_eq!(report.captured, 5);
        assert_eq!(report.resolved_references, 1);
        assert_eq!(report.dumped.len(), 2);
        assert!(config.zone_dump_dir("mp_test").join("maps/mp/a.gsc").is_file());
        assert!(config.zone_dump_dir("mp_test").join("localize/MENU_OK.json").is_file());

        // one warning for the image, one NotFound for the missing rawfile
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.diagnostics.error_count(), 1);

        let log = std::fs::read_to_string(config.capture_log_path("mp_test")).unwrap();
        assert_eq!(
            log,
            "rawfile,maps/mp/a.gsc\nlocalize,,MENU_OK\nlocalize,,MENU_OK\nimage,,white\nrawfile,,gone.gsc\n"
        );
    }

    #[test]
    fn test_missing_transform_reported_once() {
        let dir = TempDir::new().unwrap();
        let config = ZoneConfig::for_testing().with_root(dir.path());
        let registry = TypeRegistry::native();
        let driver = CaptureDriver::new(&registry, config);
        let (sink, session) = driver.begin("mp_test", CaptureMode::Dump, Schema::H1, Schema::T7);
        for name in ["a", "b", "c"] {
            sink.on_asset(AssetRecord::new(AssetKind::Sound, name, AssetPayload::Opaque(vec![1])));
        }
        sink.finish_load();

        let report = session.finish(&LiveSet::default()).unwrap();
        assert!(report.dumped.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics.entries()[0].message.contains("missing conversion transform"));
    }

    #[test]
    fn test_cancelled_dump_is_fatal() {
        let dir = TempDir::new().unwrap();
        let registry = TypeRegistry::native();
        let driver = CaptureDriver::new(&registry, ZoneConfig::for_testing().with_root(dir.path()));
        let (sink, session) = driver.begin("mp_test", CaptureMode::Dump, Schema::H1, Schema::H1);
        sink.on_asset(rawfile("a.gsc"));
        sink.finish_load();
        session.cancel_token().cancel();
        assert!(session.finish(&LiveSet::default()).unwrap_err().is_fatal());
    }
}
