//! Asset records and the reference marker
//!
//! An [`AssetRecord`] is one named, kind-tagged asset in a specific schema.
//! Names starting with [`REFERENCE_MARKER`] denote reference-only assets:
//! they are owned by another zone and are never rebuilt or dumped as
//! first-class entries. Callers classify names by the marker before any
//! kind-specific logic runs.

use crate::error::{Error, Result};
use crate::kind::AssetKind;
use crate::schema::{h1, iw6, iw7, s1, t7, Schema};
use crate::types::{
    ComputeShader, LocalizeEntry, Material, PhysPreset, PixelShader, RawFile, StringTable,
    VertexShader,
};

/// Leading character of reference-only asset names
pub const REFERENCE_MARKER: char = ',';

/// Whether `name` denotes a reference-only asset
pub fn is_reference_name(name: &str) -> bool {
    name.starts_with(REFERENCE_MARKER)
}

/// `name` with the reference marker prepended, unless it already has one
pub fn reference_name(name: &str) -> String {
    if is_reference_name(name) {
        name.to_string()
    } else {
        format!("{}{}", REFERENCE_MARKER, name)
    }
}

/// `name` without its reference marker
pub fn strip_reference(name: &str) -> &str {
    name.strip_prefix(REFERENCE_MARKER).unwrap_or(name)
}

/// Per-kind, per-schema asset data
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    /// Stub of a reference-only asset; only the name is meaningful
    Reference,
    /// Bytes of a kind whose inner structure is not modelled
    Opaque(Vec<u8>),
    /// Raw file
    RawFile(RawFile),
    /// String table
    StringTable(StringTable),
    /// Localized string
    Localize(LocalizeEntry),
    /// Material
    Material(Material),
    /// Physics preset
    PhysPreset(PhysPreset),
    /// Compute shader, any schema
    ComputeShader(ComputeShader),
    /// Vertex shader
    VertexShader(VertexShader),
    /// Pixel shader
    PixelShader(PixelShader),
    /// Native vertex declaration
    VertexDecl(h1::VertexDecl),
    /// Native model header
    XModel(h1::XModel),
    /// iw6 model header
    Iw6XModel(iw6::XModel),
    /// t7 model header
    T7XModel(t7::XModel),
    /// iw7 model header
    Iw7XModel(iw7::XModel),
    /// s1 vertex declaration
    S1VertexDecl(s1::VertexDecl),
}

/// Which payload variant holds `kind` in `schema`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Opaque,
    RawFile,
    StringTable,
    Localize,
    Material,
    PhysPreset,
    ComputeShader,
    VertexShader,
    PixelShader,
    VertexDecl,
    XModel,
    Iw6XModel,
    T7XModel,
    Iw7XModel,
    S1VertexDecl,
}

fn layout_of(kind: AssetKind, schema: Schema) -> Option<Layout> {
    use AssetKind as K;
    let layout = match (kind, schema) {
        (K::RawFile, _) => Layout::RawFile,
        (K::StringTable, _) => Layout::StringTable,
        (K::Localize, _) => Layout::Localize,
        (K::Material, _) => Layout::Material,
        (K::PhysPreset, _) => Layout::PhysPreset,
        (K::ComputeShader, _) => Layout::ComputeShader,
        (K::VertexShader, _) => Layout::VertexShader,
        (K::PixelShader, _) => Layout::PixelShader,
        (K::VertexDecl, Schema::H1 | Schema::H2) => Layout::VertexDecl,
        (K::VertexDecl, Schema::S1) => Layout::S1VertexDecl,
        (K::XModel, Schema::H1 | Schema::H2) => Layout::XModel,
        (K::XModel, Schema::Iw6) => Layout::Iw6XModel,
        (K::XModel, Schema::T7) => Layout::T7XModel,
        (K::XModel, Schema::Iw7) => Layout::Iw7XModel,
        (K::VertexDecl | K::XModel, _) => return None,
        _ => Layout::Opaque,
    };
    Some(layout)
}

impl AssetPayload {
    /// Whether this is a reference stub
    pub fn is_reference(&self) -> bool {
        matches!(self, AssetPayload::Reference)
    }

    /// Short variant name for diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            AssetPayload::Reference => "reference",
            AssetPayload::Opaque(_) => "opaque",
            AssetPayload::RawFile(_) => "rawfile",
            AssetPayload::StringTable(_) => "stringtable",
            AssetPayload::Localize(_) => "localize",
            AssetPayload::Material(_) => "material",
            AssetPayload::PhysPreset(_) => "physpreset",
            AssetPayload::ComputeShader(_) => "computeshader",
            AssetPayload::VertexShader(_) => "vertexshader",
            AssetPayload::PixelShader(_) => "pixelshader",
            AssetPayload::VertexDecl(_) => "h1 vertexdecl",
            AssetPayload::XModel(_) => "h1 xmodel",
            AssetPayload::Iw6XModel(_) => "iw6 xmodel",
            AssetPayload::T7XModel(_) => "t7 xmodel",
            AssetPayload::Iw7XModel(_) => "iw7 xmodel",
            AssetPayload::S1VertexDecl(_) => "s1 vertexdecl",
        }
    }

    /// Whether `kind` has a structured layout in `schema`
    pub fn has_layout(kind: AssetKind, schema: Schema) -> bool {
        layout_of(kind, schema).is_some()
    }

    /// Render the payload as a JSON document
    ///
    /// Opaque payloads and reference stubs have no JSON form.
    pub fn to_json(&self) -> Result<String> {
        let text = match self {
            AssetPayload::Reference | AssetPayload::Opaque(_) => {
                return Err(Error::Serialization(format!(
                    "{} payload has no json form",
                    self.variant_name()
                )))
            }
            AssetPayload::RawFile(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::StringTable(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::Localize(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::Material(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::PhysPreset(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::ComputeShader(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::VertexShader(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::PixelShader(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::VertexDecl(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::XModel(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::Iw6XModel(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::T7XModel(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::Iw7XModel(v) => serde_json::to_string_pretty(v)?,
            AssetPayload::S1VertexDecl(v) => serde_json::to_string_pretty(v)?,
        };
        Ok(text)
    }

    /// Parse a JSON document as the layout of `kind` in `schema`
    pub fn from_json(kind: AssetKind, schema: Schema, text: &str) -> Result<Self> {
        let layout = layout_of(kind, schema).ok_or_else(|| {
            Error::validation(format!("{} has no layout in schema {}", kind, schema))
        })?;
        let payload = match layout {
            Layout::Opaque => {
                return Err(Error::validation(format!(
                    "{} is stored as raw bytes, not json",
                    kind
                )))
            }
            Layout::RawFile => AssetPayload::RawFile(serde_json::from_str(text)?),
            Layout::StringTable => AssetPayload::StringTable(serde_json::from_str(text)?),
            Layout::Localize => AssetPayload::Localize(serde_json::from_str(text)?),
            Layout::Material => AssetPayload::Material(serde_json::from_str(text)?),
            Layout::PhysPreset => AssetPayload::PhysPreset(serde_json::from_str(text)?),
            Layout::ComputeShader => AssetPayload::ComputeShader(serde_json::from_str(text)?),
            Layout::VertexShader => AssetPayload::VertexShader(serde_json::from_str(text)?),
            Layout::PixelShader => AssetPayload::PixelShader(serde_json::from_str(text)?),
            Layout::VertexDecl => AssetPayload::VertexDecl(serde_json::from_str(text)?),
            Layout::XModel => AssetPayload::XModel(serde_json::from_str(text)?),
            Layout::Iw6XModel => AssetPayload::Iw6XModel(serde_json::from_str(text)?),
            Layout::T7XModel => AssetPayload::T7XModel(serde_json::from_str(text)?),
            Layout::Iw7XModel => AssetPayload::Iw7XModel(serde_json::from_str(text)?),
            Layout::S1VertexDecl => AssetPayload::S1VertexDecl(serde_json::from_str(text)?),
        };
        Ok(payload)
    }

    /// Whether this payload is the layout of `kind` in `schema`
    pub fn matches(&self, kind: AssetKind, schema: Schema) -> bool {
        let expected = match layout_of(kind, schema) {
            Some(layout) => layout,
            None => return false,
        };
        let actual = match self {
            AssetPayload::Reference => return true,
            AssetPayload::Opaque(_) => Layout::Opaque,
            AssetPayload::RawFile(_) => Layout::RawFile,
            AssetPayload::StringTable(_) => Layout::StringTable,
            AssetPayload::Localize(_) => Layout::Localize,
            AssetPayload::Material(_) => Layout::Material,
            AssetPayload::PhysPreset(_) => Layout::PhysPreset,
            AssetPayload::ComputeShader(_) => Layout::ComputeShader,
            AssetPayload::VertexShader(_) => Layout::VertexShader,
            AssetPayload::PixelShader(_) => Layout::PixelShader,
            AssetPayload::VertexDecl(_) => Layout::VertexDecl,
            AssetPayload::XModel(_) => Layout::XModel,
            AssetPayload::Iw6XModel(_) => Layout::Iw6XModel,
            AssetPayload::T7XModel(_) => Layout::T7XModel,
            AssetPayload::Iw7XModel(_) => Layout::Iw7XModel,
            AssetPayload::S1VertexDecl(_) => Layout::S1VertexDecl,
        };
        expected == actual
    }
}

/// One named asset in one schema
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    /// Asset kind
    pub kind: AssetKind,
    /// Asset name, possibly carrying the reference marker
    pub name: String,
    /// Schema the payload is laid out in
    pub schema: Schema,
    /// Asset data
    pub payload: AssetPayload,
}

impl AssetRecord {
    /// Native-schema record
    pub fn new(kind: AssetKind, name: impl Into<String>, payload: AssetPayload) -> Self {
        AssetRecord {
            kind,
            name: name.into(),
            schema: Schema::NATIVE,
            payload,
        }
    }

    /// Record laid out in `schema`
    pub fn in_schema(
        kind: AssetKind,
        name: impl Into<String>,
        schema: Schema,
        payload: AssetPayload,
    ) -> Self {
        AssetRecord {
            kind,
            name: name.into(),
            schema,
            payload,
        }
    }

    /// Reference stub for `name`; the marker is added if missing
    pub fn reference(kind: AssetKind, name: &str) -> Self {
        AssetRecord::new(kind, reference_name(name), AssetPayload::Reference)
    }

    /// Whether this record is reference-only
    pub fn is_reference(&self) -> bool {
        is_reference_name(&self.name) || self.payload.is_reference()
    }

    /// Name without the reference marker
    pub fn base_name(&self) -> &str {
        strip_reference(&self.name)
    }
}
