//! Zone building and capture for zonekit
//!
//! This crate drives whole passes over a zone:
//! - manifest: the line grammar of zone manifests
//! - resolver: manifest walking (`require`, `include`, `reference`,
//!   `iterate`, localized string resources) into a worklist
//! - builder: packing a worklist into a container on disk
//! - capture: the live capture driver behind `dumpzone` and `verifyzone`
//! - database: an in-process host that loads built containers
//! - session / config: per-pass context and tool configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod capture;
pub mod config;
pub mod database;
pub mod host;
pub mod localize;
pub mod manifest;
pub mod resolver;
pub mod session;

pub use builder::{BuildReport, ZoneBuilder};
pub use capture::{CaptureDriver, CaptureMode, CaptureReport, CaptureSession, CaptureSink};
pub use config::{ConfigError, ZoneConfig};
pub use database::ZoneDatabase;
pub use host::{AssetLookup, Host};
pub use manifest::ManifestLine;
pub use resolver::{Resolver, WorkItem, WorkSource, Worklist};
pub use session::{BuildSession, CancelToken};
