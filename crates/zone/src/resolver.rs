//! Manifest resolver
//!
//! Walks a zone's manifest top to bottom, following `include` lines, and
//! produces the ordered worklist consumed by the build driver.
//!
//! - `require` blocks until a dependency zone is loaded by the [`Host`]
//! - `include` resolves another manifest into the same worklist; the current
//!   reference mode is inherited but never flows back
//! - `reference` toggles reference mode for subsequent asset lines
//! - `iterate` synthesizes one entry per file in a kind's source folder
//! - `localize` lines backed by a string resource expand into one entry per
//!   string
//!
//! Problems with a single line are recorded in the session's diagnostics
//! and resolution continues. Only a missing top-level manifest, a `require`
//! timeout or cancellation abort the pass.

use crate::host::Host;
use crate::localize;
use crate::manifest::{self, ManifestLine};
use crate::session::BuildSession;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace};
use walkdir::WalkDir;
use zonekit_assets::{AssetOps, TypeRegistry};
use zonekit_core::{
    is_reference_name, reference_name, AssetKind, AssetPayload, Error, Result, REFERENCE_MARKER,
};

/// Where a work item's data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum WorkSource {
    /// Loaded from the zone's asset tree at build time
    Tree,
    /// Already parsed while resolving
    Inline(AssetPayload),
}

/// One entry of the worklist
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// Asset kind
    pub kind: AssetKind,
    /// Asset name, carrying the reference marker for reference-only entries
    pub name: String,
    /// Manifest the entry came from
    pub manifest: String,
    /// Data source
    pub source: WorkSource,
}

impl WorkItem {
    /// Whether the entry is reference-only
    pub fn is_reference(&self) -> bool {
        is_reference_name(&self.name)
    }
}

/// Ordered, deduplicated worklist
///
/// Entries are unique on `(kind, name)`; the first occurrence wins.
#[derive(Debug, Default, Clone)]
pub struct Worklist {
    items: Vec<WorkItem>,
    seen: HashSet<(AssetKind, String)>,
}

impl Worklist {
    /// Create an empty worklist
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless its `(kind, name)` is already present
    pub fn push(&mut self, item: WorkItem) -> bool {
        if !self.seen.insert((item.kind, item.name.clone())) {
            trace!(target: "zonekit::build", kind = %item.kind, asset = %item.name, "Skipped duplicate entry");
            return false;
        }
        self.items.push(item);
        true
    }

    /// Whether `(kind, name)` is present
    pub fn contains(&self, kind: AssetKind, name: &str) -> bool {
        self.seen.contains(&(kind, name.to_string()))
    }

    /// Entries in resolution order
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the worklist is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Worklist {
    type Item = WorkItem;
    type IntoIter = std::vec::IntoIter<WorkItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Manifest resolver
pub struct Resolver<'a> {
    registry: &'a TypeRegistry,
    host: &'a dyn Host,
}

struct Pass<'s> {
    session: &'s mut BuildSession,
    worklist: Worklist,
    /// Manifests currently being resolved, outermost first
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver validating kinds against `registry`
    pub fn new(registry: &'a TypeRegistry, host: &'a dyn Host) -> Self {
        Resolver { registry, host }
    }

    /// Resolve the manifest of `session.zone`
    pub fn resolve(&self, session: &mut BuildSession) -> Result<Worklist> {
        let zone = session.zone.clone();
        let path = session.config.manifest_path(&zone);
        if !path.is_file() {
            return Err(Error::not_found("manifest", path.display().to_string()));
        }

        let mut pass = Pass {
            session,
            worklist: Worklist::new(),
            stack: Vec::new(),
        };
        self.resolve_manifest(&mut pass, &zone, &path, false)?;

        info!(
            target: "zonekit::build",
            zone = %zone,
            entries = pass.worklist.len(),
            errors = pass.session.diagnostics.error_count(),
            "Resolved manifest"
        );
        Ok(pass.worklist)
    }

    fn resolve_manifest(&self, pass: &mut Pass<'_>, name: &str, path: &Path, mut reference: bool) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        pass.stack.push(name.to_string());
        debug!(target: "zonekit::build", manifest = %name, depth = pass.stack.len(), "Resolving manifest");

        for (line_no, parsed) in manifest::parse(&text) {
            let line = match parsed {
                Ok(line) => line,
                Err(e) => {
                    let e = Error::validation(format!("line {}: {}", line_no, e));
                    pass.session.diagnostics.asset_error(name, None, None, &e);
                    continue;
                }
            };
            match line {
                ManifestLine::Require(zone) => {
                    let result = self.require(pass, &zone);
                    Self::report(pass, name, None, Some(&zone), result)?;
                }
                ManifestLine::Include(child) => {
                    let result = self.include(pass, &child, reference);
                    Self::report(pass, name, None, Some(&child), result)?;
                }
                ManifestLine::Reference(flag) => reference = flag,
                ManifestLine::Iterate(kind) => {
                    let result = self.iterate(pass, name, kind.as_deref());
                    Self::report(pass, name, None, kind.as_deref(), result)?;
                }
                ManifestLine::Asset { kind, name: asset, fallback } => {
                    let result = self.asset(pass, name, &kind, &asset, &fallback, reference);
                    let label = if asset.is_empty() { &fallback } else { &asset };
                    Self::report(pass, name, AssetKind::from_name(&kind), Some(label), result)?;
                }
            }
        }

        pass.stack.pop();
        Ok(())
    }

    /// Record a non-fatal error as a diagnostic; fatal errors unwind
    fn report(
        pass: &mut Pass<'_>,
        manifest: &str,
        kind: Option<AssetKind>,
        asset: Option<&str>,
        result: Result<()>,
    ) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                pass.session.diagnostics.asset_error(manifest, kind, asset, &e);
                Ok(())
            }
        }
    }

    fn require(&self, pass: &mut Pass<'_>, zone: &str) -> Result<()> {
        if !self.host.zone_exists(zone) {
            return Err(Error::not_found("zone", zone));
        }
        if self.host.is_loaded(zone) {
            debug!(target: "zonekit::build", zone = %zone, "Dependency already loaded");
            return Ok(());
        }

        info!(target: "zonekit::build", zone = %zone, "Loading dependency");
        self.host.load_zone(zone)?;

        let config = &pass.session.config;
        let deadline = Instant::now() + config.require_timeout;
        while !self.host.is_loaded(zone) {
            pass.session.cancel.check("build")?;
            if Instant::now() >= deadline {
                return Err(Error::fatal(format!(
                    "timed out after {:?} waiting for zone {} to load",
                    config.require_timeout, zone
                )));
            }
            std::thread::sleep(config.require_poll_interval);
        }
        Ok(())
    }

    fn include(&self, pass: &mut Pass<'_>, child: &str, reference: bool) -> Result<()> {
        if pass.stack.iter().any(|open| open == child) {
            return Err(Error::validation(format!(
                "include cycle: {} -> {}",
                pass.stack.join(" -> "),
                child
            )));
        }
        let limit = pass.session.config.max_include_depth;
        if pass.stack.len() > limit {
            return Err(Error::validation(format!(
                "include of {} exceeds the depth limit of {}",
                child, limit
            )));
        }
        let path = pass.session.config.manifest_path(child);
        if !path.is_file() {
            return Err(Error::not_found("manifest", path.display().to_string()));
        }
        self.resolve_manifest(pass, child, &path, reference)
    }

    fn iterate(&self, pass: &mut Pass<'_>, manifest: &str, kind: Option<&str>) -> Result<()> {
        let targets: Vec<&AssetOps> = match kind {
            None => self.registry.iterable().collect(),
            Some(name) => {
                let kind = self
                    .registry
                    .kind_of(name)
                    .ok_or_else(|| Error::validation(format!("unknown asset kind `{}`", name)))?;
                match self.registry.get(kind) {
                    Some(ops) if ops.layout.iterable => vec![ops],
                    _ => return Err(Error::validation(format!("{} cannot be iterated", kind))),
                }
            }
        };

        let zone_dir = pass.session.config.zone_asset_dir(&pass.session.zone);
        for ops in targets {
            let folder = zone_dir.join(ops.layout.folder);
            if !folder.is_dir() {
                trace!(target: "zonekit::build", kind = %ops.kind, folder = %folder.display(), "No folder to iterate");
                continue;
            }

            let mut found = 0usize;
            for entry in WalkDir::new(&folder).sort_by_file_name() {
                let entry = entry.map_err(|e| Error::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if entry.file_name().to_string_lossy().starts_with(REFERENCE_MARKER) {
                    trace!(target: "zonekit::build", path = %entry.path().display(), "Skipped reference file");
                    continue;
                }
                let relative = match entry.path().strip_prefix(&folder) {
                    Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
                    Err(_) => continue,
                };
                if let Some(name) = ops.layout.asset_name(&relative) {
                    found += usize::from(pass.worklist.push(WorkItem {
                        kind: ops.kind,
                        name,
                        manifest: manifest.to_string(),
                        source: WorkSource::Tree,
                    }));
                }
            }
            debug!(target: "zonekit::build", kind = %ops.kind, entries = found, "Iterated folder");
        }
        Ok(())
    }

    fn asset(
        &self,
        pass: &mut Pass<'_>,
        manifest: &str,
        kind: &str,
        name: &str,
        fallback: &str,
        reference: bool,
    ) -> Result<()> {
        if kind == AssetKind::Localize.name() && !name.is_empty() {
            let zone_dir = pass.session.config.zone_asset_dir(&pass.session.zone);
            if let Some((path, format)) = localize::find_resource(&zone_dir, name) {
                let entries = localize::load_resource(&path, format, name)?;
                debug!(target: "zonekit::build", resource = %path.display(), entries = entries.len(), "Expanded localized strings");
                for (key, entry) in entries {
                    pass.worklist.push(WorkItem {
                        kind: AssetKind::Localize,
                        name: key,
                        manifest: manifest.to_string(),
                        source: WorkSource::Inline(AssetPayload::Localize(entry)),
                    });
                }
                return Ok(());
            }
        }

        let kind = self
            .registry
            .kind_of(kind)
            .ok_or_else(|| Error::validation(format!("unknown asset kind `{}`", kind)))?;
        let name = if name.is_empty() {
            if fallback.is_empty() {
                return Err(Error::validation(format!(
                    "{} entry has neither a name nor a fallback name",
                    kind
                )));
            }
            reference_name(fallback)
        } else if reference {
            reference_name(name)
        } else {
            name.to_string()
        };

        pass.worklist.push(WorkItem {
            kind,
            name,
            manifest: manifest.to_string(),
            source: WorkSource::Tree,
        });
        Ok(())
    }
}
