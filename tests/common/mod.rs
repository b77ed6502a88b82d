//! Shared test utilities for the end-to-end suites.
//!
//! Import via `mod common;` from any suite's main.rs.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use zonekit::{BuildReport, TypeRegistry, ZoneBuilder, ZoneConfig, ZoneDatabase};

/// Temporary zone workspace with its own source, asset, output and dump trees
pub struct TestWorkspace {
    pub dir: TempDir,
    pub config: ZoneConfig,
    pub registry: Arc<TypeRegistry>,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let config = ZoneConfig::for_testing().with_root(dir.path());
        fs::create_dir_all(&config.source_dir).expect("source dir");
        TestWorkspace {
            dir,
            config,
            registry: Arc::new(TypeRegistry::native()),
        }
    }

    /// Write `<source_dir>/<name>.csv`
    pub fn manifest(&self, name: &str, lines: &[&str]) -> &Self {
        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(self.config.manifest_path(name), text).expect("write manifest");
        self
    }

    /// Write a file under a zone's asset tree
    pub fn source(&self, zone: &str, relative: &str, contents: impl AsRef<[u8]>) -> &Self {
        let path = self.config.zone_asset_dir(zone).join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("asset dir");
        fs::write(path, contents).expect("write asset");
        self
    }

    /// Database over this workspace's output directory
    pub fn database(&self) -> ZoneDatabase {
        ZoneDatabase::new(self.config.clone(), Arc::clone(&self.registry))
    }

    /// Build `zone` with `db` as the host
    pub fn build(&self, db: &ZoneDatabase, zone: &str) -> BuildReport {
        ZoneBuilder::new(&self.registry, db, self.config.clone())
            .build(zone)
            .expect("build")
    }

    /// File under a zone's dump tree
    pub fn dumped(&self, zone: &str, relative: &str) -> PathBuf {
        self.config.zone_dump_dir(zone).join(relative)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
