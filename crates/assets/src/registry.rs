//! Type registry for per-kind dispatch
//!
//! The registry maps asset kinds to their [`AssetOps`] so the build driver,
//! the capture driver and the zone database can handle any kind without
//! hardcoding per-kind logic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = TypeRegistry::native();
//!
//! // Look up by canonical name
//! let kind = registry.kind_of("xmodel");  // Some(AssetKind::XModel)
//!
//! // Pack a record
//! let root = registry.write_asset(&mut buf, &record)?;
//! ```

use crate::codec::{self, HEADER_STREAM};
use crate::ops::AssetOps;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};
use zonekit_buffer::{AssetEntry, Container, Handle, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::{
    is_reference_name, AssetKind, AssetPayload, AssetRecord, Error, Result, Schema,
};

/// Registry of asset kinds for one engine schema
pub struct TypeRegistry {
    /// Schema the registered codecs read and write
    schema: Schema,
    /// Dispatch records by kind
    ops: BTreeMap<AssetKind, AssetOps>,
}

impl TypeRegistry {
    /// Create an empty registry for `schema`
    pub fn new(schema: Schema) -> Self {
        TypeRegistry {
            schema,
            ops: BTreeMap::new(),
        }
    }

    /// Registry holding every native kind
    pub fn native() -> Self {
        let mut registry = TypeRegistry::new(Schema::NATIVE);
        for ops in codec::native_ops() {
            registry.register(ops);
        }
        registry
    }

    /// Register a dispatch record, replacing any previous one for its kind
    pub fn register(&mut self, ops: AssetOps) {
        self.ops.insert(ops.kind, ops);
    }

    /// Schema of the registered codecs
    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Kind for a canonical name, if registered
    pub fn kind_of(&self, name: &str) -> Option<AssetKind> {
        AssetKind::from_name(name).filter(|kind| self.ops.contains_key(kind))
    }

    /// Canonical name of `kind`
    pub fn name_of(&self, kind: AssetKind) -> &'static str {
        kind.name()
    }

    /// Whether `name` is a registered kind name
    pub fn is_valid(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// Dispatch record of `kind`
    pub fn get(&self, kind: AssetKind) -> Option<&AssetOps> {
        self.ops.get(&kind)
    }

    fn require(&self, kind: AssetKind) -> Result<&AssetOps> {
        self.get(kind)
            .ok_or_else(|| Error::validation(format!("no codec registered for {}", kind)))
    }

    /// Kinds whose folders are scanned by `iterate`, in kind order
    pub fn iterable(&self) -> impl Iterator<Item = &AssetOps> {
        self.ops.values().filter(|ops| ops.layout.iterable)
    }

    /// All dispatch records, in kind order
    pub fn iter(&self) -> impl Iterator<Item = &AssetOps> {
        self.ops.values()
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Parse the source file of `name` from a zone's asset directory
    pub fn load_source(&self, root: &Path, kind: AssetKind, name: &str) -> Result<AssetRecord> {
        let ops = self.require(kind)?;
        let path = ops.layout.path(root, name);
        if !path.is_file() {
            return Err(Error::not_found("asset source", path.display().to_string()));
        }
        let contents = std::fs::read(&path)?;
        trace!(target: "zonekit::build", kind = %kind, path = %path.display(), "Loaded asset source");
        let payload = (ops.load)(kind, contents)?;
        Ok(AssetRecord::in_schema(kind, name, self.schema, payload))
    }

    /// Pack `record` into `buf` and add it to the asset table
    ///
    /// Reference records are packed as a header holding only the name.
    pub fn write_asset(&self, buf: &mut ZoneBuffer, record: &AssetRecord) -> Result<Handle> {
        let ops = self.require(record.kind)?;
        let reference = record.is_reference();
        if !reference && record.schema != self.schema {
            return Err(Error::validation(format!(
                "{} {} is in schema {}, registry writes {}",
                record.kind, record.name, record.schema, self.schema
            )));
        }

        let name = buf.push_str(HEADER_STREAM, &record.name)?;
        let mut header = RecordWriter::new();
        header.pointer(Some(name));
        if !reference {
            (ops.write)(buf, &mut header, &record.payload)?;
            if header.len() != ops.header_size as usize {
                return Err(Error::fatal(format!(
                    "{} header is {} bytes, expected {}",
                    record.kind,
                    header.len(),
                    ops.header_size
                )));
            }
        }
        let root = buf.commit(HEADER_STREAM, &header)?;
        buf.add_asset(record.kind, root);
        debug!(target: "zonekit::build", kind = %record.kind, asset = %record.name, reference, "Packed asset");
        Ok(root)
    }

    /// Read one asset table entry back into a record
    pub fn read_asset(&self, reader: &ZoneReader<'_>, entry: &AssetEntry) -> Result<AssetRecord> {
        let kind = AssetKind::from_id(entry.kind)
            .ok_or_else(|| Error::validation(format!("unknown asset kind id {}", entry.kind)))?;
        let mut header = reader.require(entry.root, "asset header")?;
        let name = codec::read_str(reader, header.pointer()?, "asset name")?;
        if is_reference_name(&name) {
            return Ok(AssetRecord::in_schema(
                kind,
                name,
                self.schema,
                AssetPayload::Reference,
            ));
        }
        let ops = self.require(kind)?;
        let payload = (ops.read)(reader, &mut header)?;
        Ok(AssetRecord::in_schema(kind, name, self.schema, payload))
    }

    /// Read every asset of `container`, in asset table order
    pub fn read_zone(&self, container: &Container) -> Result<Vec<AssetRecord>> {
        let reader = container.reader();
        container
            .assets
            .iter()
            .map(|entry| self.read_asset(&reader, entry))
            .collect()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::native()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("schema", &self.schema)
            .field("kinds", &self.ops.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_core::{LocalizeEntry, PhysPreset};

    #[test]
    fn test_native_registers_every_kind() {
        let registry = TypeRegistry::native();
        assert_eq!(registry.len(), AssetKind::ALL.len());
        for kind in AssetKind::ALL {
            assert!(registry.get(kind).is_some(), "{} missing", kind);
            assert_eq!(registry.kind_of(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_name_is_none() {
        let registry = TypeRegistry::native();
        assert_eq!(registry.kind_of("weapon_def"), None);
        assert!(!registry.is_valid(""));
        assert!(registry.is_valid("xmodel"));
    }

    #[test]
    fn test_empty_registry_rejects_lookup() {
        let registry = TypeRegistry::new(Schema::H1);
        assert!(registry.is_empty());
        assert_eq!(registry.kind_of("xmodel"), None);
    }

    #[test]
    fn test_iterable_kinds() {
        let registry = TypeRegistry::native();
        let kinds: Vec<_> = registry.iterable().map(|ops| ops.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AssetKind::XAnim,
                AssetKind::XModel,
                AssetKind::Material,
                AssetKind::Fx
            ]
        );
    }

    #[test]
    fn test_write_then_read_asset() {
        let registry = TypeRegistry::native();
        let mut buf = ZoneBuffer::default();
        let preset = AssetRecord::new(
            AssetKind::PhysPreset,
            "crate_wood",
            AssetPayload::PhysPreset(PhysPreset {
                mass: 2.5,
                bounce: 0.1,
                friction: 0.8,
                buoyancy: 1.0,
            }),
        );
        let stub = AssetRecord::reference(AssetKind::Sound, "explosion");
        registry.write_asset(&mut buf, &preset).unwrap();
        registry.write_asset(&mut buf, &stub).unwrap();

        let container = buf.into_container("test").unwrap();
        let records = registry.read_zone(&container).unwrap();
        assert_eq!(records, vec![preset, stub]);
    }

    #[test]
    fn test_foreign_schema_record_is_rejected() {
        let registry = TypeRegistry::native();
        let mut buf = ZoneBuffer::default();
        let record = AssetRecord::in_schema(
            AssetKind::Localize,
            "MENU_OK",
            Schema::S1,
            AssetPayload::Localize(LocalizeEntry { value: "OK".into() }),
        );
        let err = registry.write_asset(&mut buf, &record).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(buf.asset_count(), 0);
    }

    #[test]
    fn test_mismatched_payload_is_validation_error() {
        let registry = TypeRegistry::native();
        let mut buf = ZoneBuffer::default();
        let record = AssetRecord::new(AssetKind::XModel, "body", AssetPayload::Opaque(vec![1]));
        let err = registry.write_asset(&mut buf, &record).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_unknown_kind_id_is_validation_error() {
        let registry = TypeRegistry::native();
        let container = ZoneBuffer::default().into_container("empty").unwrap();
        let entry = AssetEntry {
            kind: 999,
            root: 0,
        };
        let err = registry
            .read_asset(&container.reader(), &entry)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
