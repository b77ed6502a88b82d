//! Vertex declaration codec

use super::{load_json, mismatch, read_array, write_array};
use crate::ops::{AssetOps, DumpLayout};
use zonekit_buffer::{FieldReader, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::schema::h1::VertexDecl;
use zonekit_core::{AssetKind, AssetPayload, Result, StreamRouting};

fn write(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::VertexDecl(decl) = payload else {
        return Err(mismatch("h1 vertexdecl", payload));
    };
    header
        .u8(decl.stream_count)
        .bool(decl.has_optional_source)
        .bool(decl.is_loaded);
    write_array(buf, header, &decl.routing, |_, rec, routing| {
        rec.u8(routing.source).u8(routing.dest);
        Ok(())
    })
}

fn read(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let stream_count = header.u8()?;
    let has_optional_source = header.bool()?;
    let is_loaded = header.bool()?;
    let routing = read_array(reader, header, |_, rec| {
        Ok(StreamRouting {
            source: rec.u8()?,
            dest: rec.u8()?,
        })
    })?;
    Ok(AssetPayload::VertexDecl(VertexDecl {
        stream_count,
        has_optional_source,
        is_loaded,
        routing,
    }))
}

pub(crate) fn ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::VertexDecl,
        header_size: 4 + 3 + 8,
        layout,
        load: load_json,
        write,
        read,
    }
}
