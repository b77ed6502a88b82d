//! In-process zone database
//!
//! [`ZoneDatabase`] plays the host: it loads built containers from the
//! output directory, keeps an index of every live first-class asset and
//! feeds an attached capture sink while loading. The CLI and the tests use
//! it where a game process would otherwise sit.

use crate::capture::{CaptureDriver, CaptureMode, CaptureReport, CaptureSink};
use crate::config::ZoneConfig;
use crate::host::{AssetLookup, Host};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};
use zonekit_assets::TypeRegistry;
use zonekit_buffer::Container;
use zonekit_core::{AssetKind, AssetRecord, Error, Result, Schema};

#[derive(Debug, Default)]
struct LiveState {
    /// Loaded zones and their asset count
    zones: BTreeMap<String, usize>,
    /// First-class assets by kind and name; later loads win
    assets: HashMap<(AssetKind, String), AssetRecord>,
}

/// Host backed by containers on disk
pub struct ZoneDatabase {
    config: ZoneConfig,
    registry: Arc<TypeRegistry>,
    live: RwLock<LiveState>,
    sink: Mutex<Option<CaptureSink>>,
}

impl ZoneDatabase {
    /// Database reading containers from `config.output_dir`
    pub fn new(config: ZoneConfig, registry: Arc<TypeRegistry>) -> Self {
        ZoneDatabase {
            config,
            registry,
            live: RwLock::new(LiveState::default()),
            sink: Mutex::new(None),
        }
    }

    /// Configuration
    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    /// Registry used to read containers
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Route every asset of subsequent loads to `sink`
    pub fn attach_sink(&self, sink: CaptureSink) {
        *self.sink.lock() = Some(sink);
    }

    /// Stop routing assets to the attached sink
    pub fn detach_sink(&self) -> Option<CaptureSink> {
        self.sink.lock().take()
    }

    /// Names of loaded zones, sorted
    pub fn loaded_zones(&self) -> Vec<String> {
        self.live.read().zones.keys().cloned().collect()
    }

    /// Number of live first-class assets
    pub fn asset_count(&self) -> usize {
        self.live.read().assets.len()
    }

    /// Read a zone's container and return its records without loading it
    pub fn read_zone(&self, zone: &str) -> Result<Vec<AssetRecord>> {
        let path = self.config.zone_path(zone);
        if !path.is_file() {
            return Err(Error::not_found("zone", zone));
        }
        let bytes = std::fs::read(&path)?;
        let container = Container::parse(&bytes)?;
        container.verify()?;
        if container.name != zone {
            warn!(target: "zonekit::capture", zone = %zone, branded = %container.name, "Container name differs from file name");
        }
        self.registry.read_zone(&container)
    }

    /// Load `zone` and capture it, then run the capture's deferred work
    pub fn capture_zone(&self, zone: &str, mode: CaptureMode, target: Schema) -> Result<CaptureReport> {
        let driver = CaptureDriver::new(&self.registry, self.config.clone());
        let (sink, session) = driver.begin(zone, mode, self.registry.schema(), target);

        self.attach_sink(sink);
        let loaded = self.load_zone(zone);
        self.detach_sink();
        loaded?;

        if !session.wait(self.config.require_timeout) {
            return Err(Error::fatal(format!("capture of {} never finished loading", zone)));
        }
        session.finish(self)
    }

    /// Dump `zone` converted to `target`
    pub fn dump_zone(&self, zone: &str, target: Schema) -> Result<CaptureReport> {
        self.capture_zone(zone, CaptureMode::Dump, target)
    }

    /// Load `zone` and log every asset
    pub fn verify_zone(&self, zone: &str) -> Result<CaptureReport> {
        self.capture_zone(zone, CaptureMode::Verify, self.registry.schema())
    }
}

impl Host for ZoneDatabase {
    fn zone_exists(&self, zone: &str) -> bool {
        self.config.zone_path(zone).is_file()
    }

    fn is_loaded(&self, zone: &str) -> bool {
        self.live.read().zones.contains_key(zone)
    }

    fn load_zone(&self, zone: &str) -> Result<()> {
        let records = self.read_zone(zone)?;
        let sink = self.sink.lock().clone();

        let count = records.len();
        {
            let mut live = self.live.write();
            for record in records {
                if let Some(sink) = &sink {
                    sink.on_asset(record.clone());
                }
                if !record.is_reference() {
                    live.assets.insert((record.kind, record.name.clone()), record);
                }
            }
            live.zones.insert(zone.to_string(), count);
        }
        if let Some(sink) = &sink {
            sink.finish_load();
        }

        info!(target: "zonekit::capture", zone = %zone, assets = count, "Loaded zone");
        Ok(())
    }

    fn unload_zones(&self) -> Result<()> {
        let mut live = self.live.write();
        let zones = live.zones.len();
        live.zones.clear();
        live.assets.clear();
        info!(target: "zonekit::capture", zones, "Unloaded zones");
        Ok(())
    }
}

impl AssetLookup for ZoneDatabase {
    fn find_asset(&self, kind: AssetKind, name: &str) -> Option<AssetRecord> {
        self.live.read().assets.get(&(kind, name.to_string())).cloned()
    }
}

impl std::fmt::Debug for ZoneDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self.live.read();
        f.debug_struct("ZoneDatabase")
            .field("output_dir", &self.config.output_dir)
            .field("zones", &live.zones)
            .field("assets", &live.assets.len())
            .finish()
    }
}
