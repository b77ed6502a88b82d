//! Build driver
//!
//! Resolves a zone's manifest, packs every worklist entry into a fresh
//! [`ZoneBuffer`], appends the branding rawfile and writes the finalized
//! container.
//!
//! # Failure handling
//!
//! A failing entry is rewound out of the buffer and recorded as a diagnostic;
//! the rest of the worklist still builds. A missing manifest, a fatal error
//! or cancellation aborts the build, and no container file is written.
//!
//! # Crash Safety
//!
//! The container is written to a hidden temporary file, fsynced, renamed
//! over `<output_dir>/<zone>.ff` and the directory is fsynced, so a reader
//! sees either the previous container or the complete new one.

use crate::config::ZoneConfig;
use crate::host::Host;
use crate::manifest;
use crate::resolver::{Resolver, WorkItem, WorkSource};
use crate::session::{BuildSession, CancelToken};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zonekit_assets::TypeRegistry;
use zonekit_buffer::ZoneBuffer;
use zonekit_core::{AssetKind, AssetPayload, AssetRecord, Diagnostics, Error, RawFile, Result};

/// Outcome of a successful build
#[derive(Debug)]
pub struct BuildReport {
    /// Zone built
    pub zone: String,
    /// Container written
    pub path: PathBuf,
    /// Assets packed, branding included
    pub assets: usize,
    /// Container size in bytes
    pub bytes: usize,
    /// Entries that failed and were skipped
    pub diagnostics: Diagnostics,
}

/// Build driver
pub struct ZoneBuilder<'a> {
    registry: &'a TypeRegistry,
    host: &'a dyn Host,
    config: ZoneConfig,
}

impl<'a> ZoneBuilder<'a> {
    /// Create a builder packing with `registry` and resolving `require`
    /// through `host`
    pub fn new(registry: &'a TypeRegistry, host: &'a dyn Host, config: ZoneConfig) -> Self {
        ZoneBuilder {
            registry,
            host,
            config,
        }
    }

    /// Configuration
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Build `zone` and write its container
    pub fn build(&self, zone: &str) -> Result<BuildReport> {
        self.build_with_cancel(zone, CancelToken::new())
    }

    /// Build `zone`, aborting between entries once `cancel` is triggered
    pub fn build_with_cancel(&self, zone: &str, cancel: CancelToken) -> Result<BuildReport> {
        let mut session = BuildSession::with_cancel(zone, self.config.clone(), cancel);
        let (bytes, assets) = self.assemble(&mut session)?;

        let path = self.config.zone_path(zone);
        write_atomic(&path, &bytes)?;

        info!(
            target: "zonekit::build",
            zone = %zone,
            assets,
            bytes = bytes.len(),
            errors = session.diagnostics.error_count(),
            path = %path.display(),
            "Built zone"
        );
        Ok(BuildReport {
            zone: zone.to_string(),
            path,
            assets,
            bytes: bytes.len(),
            diagnostics: session.diagnostics,
        })
    }

    /// Build every zone in `zones`, one after another
    ///
    /// A failed zone does not stop the others.
    pub fn build_many<S: AsRef<str>>(&self, zones: &[S]) -> Vec<(String, Result<BuildReport>)> {
        zones
            .iter()
            .map(|zone| {
                let zone = zone.as_ref();
                (zone.to_string(), self.build(zone))
            })
            .collect()
    }

    /// Build every zone listed in the file at `path`, one per line
    pub fn build_list(&self, path: &Path) -> Result<Vec<(String, Result<BuildReport>)>> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.build_many(&manifest::parse_zone_list(&text)))
    }

    /// Resolve and pack the session's zone, returning the container bytes
    /// and the number of assets packed
    pub fn assemble(&self, session: &mut BuildSession) -> Result<(Vec<u8>, usize)> {
        session.config.validate()?;
        let worklist = Resolver::new(self.registry, self.host).resolve(session)?;
        let zone_dir = session.config.zone_asset_dir(&session.zone);
        let mut buf = ZoneBuffer::new(session.config.buffer.clone())
            .map_err(|e| Error::validation(e.to_string()))?;

        let mut branded = false;
        for item in worklist {
            session.cancel.check("build")?;

            let mark = buf.mark();
            let packed = self
                .load(&zone_dir, &item)
                .and_then(|record| self.registry.write_asset(&mut buf, &record));
            match packed {
                Ok(_) => branded |= item.kind == AssetKind::RawFile && item.name == session.zone,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    buf.rewind(mark);
                    session
                        .diagnostics
                        .asset_error(&item.manifest, Some(item.kind), Some(&item.name), &e);
                }
            }
        }

        if branded {
            debug!(target: "zonekit::build", zone = %session.zone, "Manifest already carries the branding rawfile");
        } else {
            let branding = AssetRecord::new(
                AssetKind::RawFile,
                session.zone.clone(),
                AssetPayload::RawFile(RawFile::from_text(&session.zone)),
            );
            self.registry.write_asset(&mut buf, &branding)?;
        }

        let assets = buf.asset_count();
        let bytes = buf.finalize(&session.zone)?;
        Ok((bytes, assets))
    }

    fn load(&self, zone_dir: &Path, item: &WorkItem) -> Result<AssetRecord> {
        if item.is_reference() {
            return Ok(AssetRecord::reference(item.kind, &item.name));
        }
        match &item.source {
            WorkSource::Inline(payload) => Ok(AssetRecord::in_schema(
                item.kind,
                item.name.clone(),
                self.registry.schema(),
                payload.clone(),
            )),
            WorkSource::Tree => self.registry.load_source(zone_dir, item.kind, &item.name),
        }
    }
}

/// Write `bytes` to `path` through a temporary file and rename
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::validation(format!("invalid output path {}", path.display())))?;
    let temp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    if temp_path.exists() {
        std::fs::remove_file(&temp_path)?;
    }

    // Step 1: write the temporary file
    let mut file = OpenOptions::new().create_new(true).write(true).open(&temp_path)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    drop(file);

    // Step 2: atomic rename
    std::fs::rename(&temp_path, path)?;

    // Step 3: fsync the directory
    File::open(&dir)?.sync_all()?;
    Ok(())
}
