//! Closed table of schema transforms
//!
//! Conversions are looked up by `(kind, from, to)`. A triple that is not in
//! the table is a validation error; nothing is converted implicitly except
//! a record that is already in the target schema.

use crate::memory::ZoneMemory;
use crate::{shader, vertexdecl, xmodel};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;
use zonekit_core::{AssetKind, AssetRecord, Error, Result, Schema};

/// Convert one record into a target schema's layout
pub type ConvertFn = fn(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord>;

/// How one `(kind, from, to)` triple is converted
#[derive(Clone, Copy)]
pub enum Transform {
    /// Layouts match; the record is copied as is
    Identity,
    /// Field-by-field conversion
    Convert(ConvertFn),
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::Identity => f.write_str("Identity"),
            Transform::Convert(_) => f.write_str("Convert"),
        }
    }
}

/// Kinds whose layout is the same in every supported schema
const SIMPLE_KINDS: [AssetKind; 7] = [
    AssetKind::RawFile,
    AssetKind::StringTable,
    AssetKind::Localize,
    AssetKind::Material,
    AssetKind::PhysPreset,
    AssetKind::VertexShader,
    AssetKind::PixelShader,
];

/// Schemas the simple kinds convert between, both ways, with the native one
const SIMPLE_PEERS: [Schema; 3] = [Schema::H2, Schema::Iw6, Schema::S1];

static STANDARD: Lazy<TransformTable> = Lazy::new(TransformTable::standard);

/// Transform table
#[derive(Debug, Default, Clone)]
pub struct TransformTable {
    entries: BTreeMap<(AssetKind, Schema, Schema), Transform>,
}

impl TransformTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with every installed transform
    pub fn standard() -> Self {
        let mut table = TransformTable::new();

        table.insert(AssetKind::XModel, Schema::Iw6, Schema::H1, Transform::Convert(xmodel::iw6_to_h1));
        table.insert(AssetKind::XModel, Schema::H1, Schema::Iw6, Transform::Convert(xmodel::h1_to_iw6));
        table.insert(AssetKind::XModel, Schema::T7, Schema::Iw7, Transform::Convert(xmodel::t7_to_iw7));
        table.insert_both(AssetKind::XModel, Schema::H1, Schema::H2, Transform::Identity);

        table.insert(AssetKind::ComputeShader, Schema::S1, Schema::H1, Transform::Convert(shader::s1_to_h1));
        table.insert(AssetKind::ComputeShader, Schema::H1, Schema::S1, Transform::Convert(shader::h1_to_s1));
        table.insert_both(AssetKind::ComputeShader, Schema::H1, Schema::H2, Transform::Identity);

        table.insert(AssetKind::VertexDecl, Schema::S1, Schema::H1, Transform::Convert(vertexdecl::s1_to_h1));
        table.insert(AssetKind::VertexDecl, Schema::H1, Schema::S1, Transform::Convert(vertexdecl::h1_to_s1));
        table.insert_both(AssetKind::VertexDecl, Schema::H1, Schema::H2, Transform::Identity);

        for kind in SIMPLE_KINDS {
            for peer in SIMPLE_PEERS {
                table.insert_both(kind, Schema::H1, peer, Transform::Identity);
            }
        }
        table
    }

    /// Shared instance of [`TransformTable::standard`]
    pub fn shared() -> &'static TransformTable {
        &STANDARD
    }

    /// Install a transform, replacing any previous one for the triple
    pub fn insert(&mut self, kind: AssetKind, from: Schema, to: Schema, transform: Transform) {
        self.entries.insert((kind, from, to), transform);
    }

    fn insert_both(&mut self, kind: AssetKind, a: Schema, b: Schema, transform: Transform) {
        self.insert(kind, a, b, transform);
        self.insert(kind, b, a, transform);
    }

    /// Transform for a triple; converting into the same schema is always
    /// the identity
    pub fn get(&self, kind: AssetKind, from: Schema, to: Schema) -> Option<Transform> {
        if from == to {
            return Some(Transform::Identity);
        }
        self.entries.get(&(kind, from, to)).copied()
    }

    /// Whether the triple can be converted
    pub fn contains(&self, kind: AssetKind, from: Schema, to: Schema) -> bool {
        self.get(kind, from, to).is_some()
    }

    /// Number of installed triples
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert `record` from schema `from` to schema `to`
    ///
    /// Reference stubs carry nothing but their name and convert to any
    /// schema.
    pub fn convert(
        &self,
        record: &AssetRecord,
        from: Schema,
        to: Schema,
        mem: &mut ZoneMemory,
    ) -> Result<AssetRecord> {
        if record.schema != from {
            return Err(Error::validation(format!(
                "{} {} is in schema {}, not {}",
                record.kind, record.name, record.schema, from
            )));
        }
        if record.is_reference() {
            let name = mem.string(&record.name)?;
            return Ok(AssetRecord::in_schema(record.kind, name, to, record.payload.clone()));
        }

        let transform = self.get(record.kind, from, to).ok_or_else(|| {
            Error::validation(format!(
                "missing conversion transform for {} from {} to {}",
                record.kind, from, to
            ))
        })?;
        let mut converted = match transform {
            Transform::Identity => {
                if !record.payload.matches(record.kind, to) {
                    return Err(Error::validation(format!(
                        "{} payload is not a {} layout in schema {}",
                        record.payload.variant_name(),
                        record.kind,
                        to
                    )));
                }
                let name = mem.string(&record.name)?;
                AssetRecord::in_schema(record.kind, name, to, record.payload.clone())
            }
            Transform::Convert(f) => f(record, mem)?,
        };
        converted.schema = to;

        debug!(
            target: "zonekit::convert",
            kind = %record.kind,
            asset = %record.name,
            from = %from,
            to = %to,
            transform = ?transform,
            "Converted asset"
        );
        Ok(converted)
    }
}

/// Convert `record` with the standard transform table
pub fn convert(
    record: &AssetRecord,
    from: Schema,
    to: Schema,
    mem: &mut ZoneMemory,
) -> Result<AssetRecord> {
    TransformTable::shared().convert(record, from, to, mem)
}
