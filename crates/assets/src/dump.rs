//! Writing records into a dump tree
//!
//! The dump tree uses the same layout as the source tree, so a dumped zone
//! folder can be fed back to the build driver as its asset directory.

use crate::ops::DumpFormat;
use crate::registry::TypeRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use zonekit_core::{AssetPayload, AssetRecord, Error, Result};

/// Bytes of a raw-format payload
fn raw_bytes(payload: &AssetPayload) -> Option<&[u8]> {
    match payload {
        AssetPayload::Opaque(bytes) => Some(bytes),
        AssetPayload::RawFile(raw) => Some(&raw.buffer),
        AssetPayload::ComputeShader(s) => Some(&s.program),
        AssetPayload::VertexShader(s) => Some(&s.program),
        AssetPayload::PixelShader(s) => Some(&s.program),
        _ => None,
    }
}

/// Encode `record` the way its kind is stored on disk
pub fn encode_record(registry: &TypeRegistry, record: &AssetRecord) -> Result<Vec<u8>> {
    if record.is_reference() {
        return Err(Error::validation(format!(
            "{} {} is reference-only and has no dump",
            record.kind, record.name
        )));
    }
    let ops = registry
        .get(record.kind)
        .ok_or_else(|| Error::validation(format!("no codec registered for {}", record.kind)))?;
    match ops.layout.format {
        DumpFormat::Json => Ok(record.payload.to_json()?.into_bytes()),
        DumpFormat::Raw => raw_bytes(&record.payload).map(<[u8]>::to_vec).ok_or_else(|| {
            Error::validation(format!(
                "{} payload cannot be dumped as raw {}",
                record.payload.variant_name(),
                record.kind
            ))
        }),
    }
}

/// Write `record` under `root`, returning the file written
pub fn dump_record(registry: &TypeRegistry, root: &Path, record: &AssetRecord) -> Result<PathBuf> {
    let contents = encode_record(registry, record)?;
    let path = registry
        .get(record.kind)
        .map(|ops| ops.layout.path(root, &record.name))
        .ok_or_else(|| Error::validation(format!("no codec registered for {}", record.kind)))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    debug!(target: "zonekit::capture", kind = %record.kind, asset = %record.name, path = %path.display(), "Dumped asset");
    Ok(path)
}
