//! Vertex declaration conversions between s1 and the native schema

use crate::memory::ZoneMemory;
use zonekit_core::schema::{h1, s1};
use zonekit_core::{AssetPayload, AssetRecord, Error, Result, Schema};

pub(crate) fn s1_to_h1(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let AssetPayload::S1VertexDecl(decl) = &record.payload else {
        return Err(Error::validation(format!(
            "expected s1 vertexdecl payload, got {}",
            record.payload.variant_name()
        )));
    };
    let converted = h1::VertexDecl {
        stream_count: decl.stream_count,
        has_optional_source: decl.has_optional_source,
        // filled in by the loader at runtime
        is_loaded: false,
        routing: mem.array(&decl.routing)?,
    };
    Ok(AssetRecord::in_schema(
        record.kind,
        mem.string(&record.name)?,
        Schema::H1,
        AssetPayload::VertexDecl(converted),
    ))
}

pub(crate) fn h1_to_s1(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let AssetPayload::VertexDecl(decl) = &record.payload else {
        return Err(Error::validation(format!(
            "expected h1 vertexdecl payload, got {}",
            record.payload.variant_name()
        )));
    };
    let converted = s1::VertexDecl {
        stream_count: decl.stream_count,
        has_optional_source: decl.has_optional_source,
        routing: mem.array(&decl.routing)?,
    };
    Ok(AssetRecord::in_schema(
        record.kind,
        mem.string(&record.name)?,
        Schema::S1,
        AssetPayload::S1VertexDecl(converted),
    ))
}
