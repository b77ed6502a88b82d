//! Native-schema codecs
//!
//! Every asset header starts with a pointer to the asset name. Reference
//! stubs stop there; full assets continue with the kind-specific fields
//! written by the codec. Variable-length arrays are stored as a `u32` count
//! followed by a pointer to a record holding the elements back to back.

mod material;
mod simple;
mod vertexdecl;
mod xmodel;

use crate::ops::{AssetOps, DumpFormat, DumpLayout};
use zonekit_buffer::{FieldReader, Handle, RecordWriter, StreamId, ZoneBuffer, ZoneReader};
use zonekit_core::{AssetKind, AssetPayload, Error, Result};

/// Stream holding asset headers and names
pub(crate) const HEADER_STREAM: StreamId = StreamId::VIRTUAL;

/// Stream holding bulk arrays and blobs
pub(crate) const BULK_STREAM: StreamId = StreamId::DELAY_VIRTUAL;

pub(crate) fn mismatch(expected: &str, payload: &AssetPayload) -> Error {
    Error::validation(format!(
        "expected {} payload, got {}",
        expected,
        payload.variant_name()
    ))
}

pub(crate) fn opt_str(buf: &mut ZoneBuffer, s: Option<&str>) -> Result<Option<Handle>> {
    match s {
        Some(s) => Ok(Some(buf.push_str(HEADER_STREAM, s)?)),
        None => Ok(None),
    }
}

pub(crate) fn read_opt_str(reader: &ZoneReader<'_>, ptr: u32) -> Result<Option<String>> {
    Ok(reader.string(ptr)?)
}

pub(crate) fn read_str(reader: &ZoneReader<'_>, ptr: u32, what: &str) -> Result<String> {
    reader
        .string(ptr)?
        .ok_or_else(|| Error::Serialization(format!("null {} pointer", what)))
}

/// Write `count + pointer` for a blob
pub(crate) fn write_blob(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    bytes: &[u8],
) -> Result<()> {
    let handle = if bytes.is_empty() {
        None
    } else {
        Some(buf.push_bytes(BULK_STREAM, bytes, 16)?)
    };
    header.u32(bytes.len() as u32).pointer(handle);
    Ok(())
}

pub(crate) fn read_blob(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<Vec<u8>> {
    let len = header.u32()? as usize;
    let ptr = header.pointer()?;
    if len == 0 {
        return Ok(Vec::new());
    }
    let bytes = reader
        .bytes(ptr, len)?
        .ok_or_else(|| Error::Serialization("null blob pointer".to_string()))?;
    Ok(bytes.to_vec())
}

/// Write `count + pointer` for an array of records
pub(crate) fn write_array<T>(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    items: &[T],
    mut element: impl FnMut(&mut ZoneBuffer, &mut RecordWriter, &T) -> Result<()>,
) -> Result<()> {
    let handle = if items.is_empty() {
        None
    } else {
        let mut rec = RecordWriter::new();
        for item in items {
            element(buf, &mut rec, item)?;
        }
        Some(buf.commit(BULK_STREAM, &rec)?)
    };
    header.u32(items.len() as u32).pointer(handle);
    Ok(())
}

pub(crate) fn read_array<T>(
    reader: &ZoneReader<'_>,
    header: &mut FieldReader<'_>,
    mut element: impl FnMut(&ZoneReader<'_>, &mut FieldReader<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = header.u32()?;
    let ptr = header.pointer()?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let mut rec = reader.require(ptr, "array")?;
    (0..count).map(|_| element(reader, &mut rec)).collect()
}

/// Array of interned strings
pub(crate) fn write_interned(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    values: &[String],
) -> Result<()> {
    write_array(buf, header, values, |buf, rec, value| {
        let iref = buf.intern(value.as_bytes());
        rec.intern(iref);
        Ok(())
    })
}

pub(crate) fn read_interned(
    reader: &ZoneReader<'_>,
    header: &mut FieldReader<'_>,
) -> Result<Vec<String>> {
    read_array(reader, header, |reader, rec| {
        Ok(reader.interned_str(rec.intern()?)?)
    })
}

/// Array of name pointers
pub(crate) fn write_names(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    names: &[String],
) -> Result<()> {
    write_array(buf, header, names, |buf, rec, name| {
        let handle = buf.push_str(HEADER_STREAM, name)?;
        rec.pointer(Some(handle));
        Ok(())
    })
}

pub(crate) fn read_names(
    reader: &ZoneReader<'_>,
    header: &mut FieldReader<'_>,
) -> Result<Vec<String>> {
    read_array(reader, header, |reader, rec| {
        let ptr = rec.pointer()?;
        read_str(reader, ptr, "name")
    })
}

/// Opaque bytes of kinds whose structure is not modelled
pub(crate) fn load_opaque(_kind: AssetKind, contents: Vec<u8>) -> Result<AssetPayload> {
    Ok(AssetPayload::Opaque(contents))
}

pub(crate) fn load_json(kind: AssetKind, contents: Vec<u8>) -> Result<AssetPayload> {
    let text = String::from_utf8(contents)
        .map_err(|_| Error::Serialization(format!("{} source is not utf-8", kind)))?;
    AssetPayload::from_json(kind, zonekit_core::Schema::NATIVE, &text)
}

fn opaque_ops(kind: AssetKind, layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind,
        header_size: simple::OPAQUE_HEADER_SIZE,
        layout,
        load: load_opaque,
        write: simple::write_opaque,
        read: simple::read_opaque,
    }
}

const fn json_layout(folder: &'static str, extension: &'static str) -> DumpLayout {
    DumpLayout {
        folder,
        extension,
        iterable: false,
        format: DumpFormat::Json,
    }
}

const fn raw_layout(folder: &'static str, extension: &'static str) -> DumpLayout {
    DumpLayout {
        folder,
        extension,
        iterable: false,
        format: DumpFormat::Raw,
    }
}

/// Dispatch records for every kind of the native schema
pub fn native_ops() -> Vec<AssetOps> {
    let mut ops = vec![
        simple::rawfile_ops(raw_layout("", "")),
        simple::stringtable_ops(json_layout("", ".json")),
        simple::localize_ops(json_layout("localize", ".json")),
        simple::physpreset_ops(json_layout("physpreset", ".json")),
        simple::shader_ops(AssetKind::ComputeShader, raw_layout("techsets/computeshader", ".cso")),
        simple::shader_ops(AssetKind::VertexShader, raw_layout("techsets/vertexshader", ".cso")),
        simple::shader_ops(AssetKind::PixelShader, raw_layout("techsets/pixelshader", ".cso")),
        material::ops(DumpLayout {
            iterable: true,
            ..json_layout("materials", "")
        }),
        vertexdecl::ops(json_layout("techsets/vertexdecl", ".json")),
        xmodel::ops(DumpLayout {
            iterable: true,
            ..json_layout("xmodel", ".xmodel_export")
        }),
        opaque_ops(
            AssetKind::Fx,
            DumpLayout {
                iterable: true,
                ..raw_layout("effects", ".fxe")
            },
        ),
        opaque_ops(
            AssetKind::XAnim,
            DumpLayout {
                iterable: true,
                ..raw_layout("xanim", ".xanim_export")
            },
        ),
        opaque_ops(AssetKind::Image, raw_layout("images", ".h1Image")),
        opaque_ops(AssetKind::Ttf, raw_layout("", "")),
        opaque_ops(AssetKind::ScriptFile, raw_layout("scriptfile", ".gscbin")),
    ];
    for kind in AssetKind::ALL {
        if !ops.iter().any(|o| o.kind == kind) {
            ops.push(opaque_ops(kind, raw_layout(kind.name(), "")));
        }
    }
    ops
}
