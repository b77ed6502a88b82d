//! zonekit - zone container builder, dumper and cross-schema asset converter
//!
//! zonekit packs named, kind-tagged assets into relocatable multi-stream
//! zone containers, reads them back, and converts assets between engine
//! schemas.
//!
//! # Quick Start
//!
//! ```ignore
//! use zonekit::{TypeRegistry, ZoneBuilder, ZoneConfig, ZoneDatabase, Schema};
//! use std::sync::Arc;
//!
//! let config = ZoneConfig::default();
//! let registry = Arc::new(TypeRegistry::native());
//! let db = ZoneDatabase::new(config.clone(), Arc::clone(&registry));
//!
//! // Build zone_source/mp_test.csv into zones/mp_test.ff
//! let report = ZoneBuilder::new(&registry, &db, config).build("mp_test")?;
//!
//! // Dump it back out, converted to iw6
//! db.dump_zone("mp_test", Schema::Iw6)?;
//! ```
//!
//! # Architecture
//!
//! - asset kinds, schemas, records, errors and diagnostics are re-exported
//!   at the root, with the per-schema structs under [`schema`]
//! - [`buffer`]: the zone buffer, interned values and the container format
//! - [`assets`]: the type registry and per-kind codecs
//! - [`convert`]: the schema transform table
//! - [`zone`]: manifests, the build driver and the capture driver

pub use zonekit_assets as assets;
pub use zonekit_buffer as buffer;
pub use zonekit_convert as convert;
pub use zonekit_zone as zone;

pub use zonekit_assets::{dump_record, TypeRegistry};
pub use zonekit_buffer::{BufferConfig, Container, ZoneBuffer};
pub use zonekit_convert::{TransformTable, ZoneMemory};
pub use zonekit_core::schema;
pub use zonekit_core::{
    AssetKind, AssetPayload, AssetRecord, Diagnostic, Diagnostics, Error, Result, Schema, Severity,
};
pub use zonekit_zone::{
    BuildReport, CaptureDriver, CaptureMode, CaptureReport, Host, ZoneBuilder, ZoneConfig,
    ZoneDatabase,
};
