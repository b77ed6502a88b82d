//! Per-kind dispatch records
//!
//! Each registered kind is described by one [`AssetOps`]: a closed record of
//! plain function pointers plus the on-disk layout shared by the source tree
//! and the dump tree.

use std::path::{Path, PathBuf};
use zonekit_buffer::{FieldReader, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::{AssetKind, AssetPayload, Result};

/// How an asset is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    /// Pretty-printed JSON of the payload
    Json,
    /// The payload's bytes, unframed
    Raw,
}

/// On-disk location convention of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpLayout {
    /// Folder under the zone's asset (or dump) directory; empty for the root
    pub folder: &'static str,
    /// Extension appended to the asset name, with its dot, or empty
    pub extension: &'static str,
    /// Whether `iterate` scans this folder
    pub iterable: bool,
    /// File contents
    pub format: DumpFormat,
}

impl DumpLayout {
    /// File of asset `name` under `root`
    pub fn path(&self, root: &Path, name: &str) -> PathBuf {
        let file = format!("{}{}", name, self.extension);
        if self.folder.is_empty() {
            root.join(file)
        } else {
            root.join(self.folder).join(file)
        }
    }

    /// Asset name for a file path relative to the layout folder, or `None`
    /// when the file does not follow the convention
    pub fn asset_name(&self, relative: &str) -> Option<String> {
        if self.extension.is_empty() {
            // extensionless kinds only match files without an extension
            let file = relative.rsplit('/').next().unwrap_or(relative);
            if file.contains('.') {
                return None;
            }
            return Some(relative.to_string());
        }
        relative
            .strip_suffix(self.extension)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Parse an on-disk file's contents into a native payload
pub type LoadFn = fn(kind: AssetKind, contents: Vec<u8>) -> Result<AssetPayload>;

/// Append a native payload's header fields after the name pointer,
/// allocating its sub-records in the buffer
pub type WriteFn =
    fn(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()>;

/// Read a native payload from its header, positioned after the name pointer
pub type ReadFn = fn(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload>;

/// Dispatch record of one asset kind
#[derive(Clone, Copy)]
pub struct AssetOps {
    /// Kind handled
    pub kind: AssetKind,
    /// Header size in bytes, name pointer included
    pub header_size: u32,
    /// On-disk layout
    pub layout: DumpLayout,
    /// Source tree parser
    pub load: LoadFn,
    /// Zone buffer writer
    pub write: WriteFn,
    /// Container reader
    pub read: ReadFn,
}

impl std::fmt::Debug for AssetOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetOps")
            .field("kind", &self.kind)
            .field("header_size", &self.header_size)
            .field("layout", &self.layout)
            .finish()
    }
}
