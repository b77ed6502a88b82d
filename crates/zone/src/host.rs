//! Host collaborator interfaces
//!
//! The resolver and the capture driver never talk to a game process or a
//! filesystem layout directly. They see the host only through these traits.

use zonekit_core::{AssetKind, AssetRecord, Result};

/// Zone loading surface of the host
pub trait Host {
    /// Whether a zone named `zone` exists on disk
    fn zone_exists(&self, zone: &str) -> bool;

    /// Whether `zone` has finished loading
    fn is_loaded(&self, zone: &str) -> bool;

    /// Start loading `zone`; completion is observed through
    /// [`Host::is_loaded`]
    fn load_zone(&self, zone: &str) -> Result<()>;

    /// Unload every loaded zone
    fn unload_zones(&self) -> Result<()>;
}

/// Lookup of live assets by kind and name
pub trait AssetLookup {
    /// Live first-class asset named `name`, without the reference marker
    fn find_asset(&self, kind: AssetKind, name: &str) -> Option<AssetRecord>;
}
