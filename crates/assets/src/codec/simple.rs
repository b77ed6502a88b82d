//! Codecs for flat kinds

use super::{load_json, mismatch, read_blob, read_str, write_blob, HEADER_STREAM};
use crate::ops::{AssetOps, DumpLayout, ReadFn};
use zonekit_buffer::{FieldReader, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::{
    AssetKind, AssetPayload, ComputeShader, Error, LocalizeEntry, PhysPreset, PixelShader,
    RawFile, Result, StringTable, VertexShader,
};

pub(crate) const OPAQUE_HEADER_SIZE: u32 = 4 + 8;

pub(crate) fn write_opaque(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    payload: &AssetPayload,
) -> Result<()> {
    match payload {
        AssetPayload::Opaque(bytes) => write_blob(buf, header, bytes),
        other => Err(mismatch("opaque", other)),
    }
}

pub(crate) fn read_opaque(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    Ok(AssetPayload::Opaque(read_blob(reader, header)?))
}

// rawfile

fn load_rawfile(_kind: AssetKind, contents: Vec<u8>) -> Result<AssetPayload> {
    Ok(AssetPayload::RawFile(RawFile {
        compressed_len: 0,
        buffer: contents,
    }))
}

fn write_rawfile(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::RawFile(raw) = payload else {
        return Err(mismatch("rawfile", payload));
    };
    header.u32(raw.compressed_len);
    write_blob(buf, header, &raw.buffer)
}

fn read_rawfile(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let compressed_len = header.u32()?;
    let buffer = read_blob(reader, header)?;
    Ok(AssetPayload::RawFile(RawFile {
        compressed_len,
        buffer,
    }))
}

pub(crate) fn rawfile_ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::RawFile,
        header_size: 4 + 4 + 8,
        layout,
        load: load_rawfile,
        write: write_rawfile,
        read: read_rawfile,
    }
}

// stringtable

fn write_stringtable(
    buf: &mut ZoneBuffer,
    header: &mut RecordWriter,
    payload: &AssetPayload,
) -> Result<()> {
    let AssetPayload::StringTable(table) = payload else {
        return Err(mismatch("stringtable", payload));
    };
    let cells = table.columns as u64 * table.rows as u64;
    if cells != table.values.len() as u64 {
        return Err(Error::validation(format!(
            "string table has {} values for {}x{} cells",
            table.values.len(),
            table.columns,
            table.rows
        )));
    }
    header.u32(table.columns).u32(table.rows);
    super::write_interned(buf, header, &table.values)
}

fn read_stringtable(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let columns = header.u32()?;
    let rows = header.u32()?;
    let values = super::read_interned(reader, header)?;
    Ok(AssetPayload::StringTable(StringTable {
        columns,
        rows,
        values,
    }))
}

pub(crate) fn stringtable_ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::StringTable,
        header_size: 4 + 8 + 8,
        layout,
        load: load_json,
        write: write_stringtable,
        read: read_stringtable,
    }
}

// localize

fn write_localize(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::Localize(entry) = payload else {
        return Err(mismatch("localize", payload));
    };
    let value = buf.push_str(HEADER_STREAM, &entry.value)?;
    header.pointer(Some(value));
    Ok(())
}

fn read_localize(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let ptr = header.pointer()?;
    Ok(AssetPayload::Localize(LocalizeEntry {
        value: read_str(reader, ptr, "localize value")?,
    }))
}

pub(crate) fn localize_ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::Localize,
        header_size: 4 + 4,
        layout,
        load: load_json,
        write: write_localize,
        read: read_localize,
    }
}

// physpreset

fn write_physpreset(_buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::PhysPreset(preset) = payload else {
        return Err(mismatch("physpreset", payload));
    };
    header
        .f32(preset.mass)
        .f32(preset.bounce)
        .f32(preset.friction)
        .f32(preset.buoyancy);
    Ok(())
}

fn read_physpreset(_reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    Ok(AssetPayload::PhysPreset(PhysPreset {
        mass: header.f32()?,
        bounce: header.f32()?,
        friction: header.f32()?,
        buoyancy: header.f32()?,
    }))
}

pub(crate) fn physpreset_ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::PhysPreset,
        header_size: 4 + 16,
        layout,
        load: load_json,
        write: write_physpreset,
        read: read_physpreset,
    }
}

// shaders

fn load_shader(kind: AssetKind, program: Vec<u8>) -> Result<AssetPayload> {
    match kind {
        AssetKind::ComputeShader => Ok(AssetPayload::ComputeShader(ComputeShader { program })),
        AssetKind::VertexShader => Ok(AssetPayload::VertexShader(VertexShader { program })),
        AssetKind::PixelShader => Ok(AssetPayload::PixelShader(PixelShader { program })),
        other => Err(Error::validation(format!("{} is not a shader kind", other))),
    }
}

fn write_shader(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let program = match payload {
        AssetPayload::ComputeShader(s) => &s.program,
        AssetPayload::VertexShader(s) => &s.program,
        AssetPayload::PixelShader(s) => &s.program,
        other => return Err(mismatch("shader", other)),
    };
    write_blob(buf, header, program)
}

fn read_computeshader(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    load_shader(AssetKind::ComputeShader, read_blob(reader, header)?)
}

fn read_vertexshader(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    load_shader(AssetKind::VertexShader, read_blob(reader, header)?)
}

fn read_pixelshader(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    load_shader(AssetKind::PixelShader, read_blob(reader, header)?)
}

pub(crate) fn shader_ops(kind: AssetKind, layout: DumpLayout) -> AssetOps {
    let read: ReadFn = match kind {
        AssetKind::VertexShader => read_vertexshader,
        AssetKind::PixelShader => read_pixelshader,
        _ => read_computeshader,
    };
    AssetOps {
        kind,
        header_size: 4 + 8,
        layout,
        load: load_shader,
        write: write_shader,
        read,
    }
}
