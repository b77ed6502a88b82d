//! Compute shader conversions between s1 and the native schema
//!
//! The program bytes are shared; native shaders converted from s1 carry a
//! name suffix so they do not collide with native shaders of the same name.

use crate::memory::ZoneMemory;
use zonekit_core::schema::s1::SHADER_NAME_SUFFIX;
use zonekit_core::{AssetPayload, AssetRecord, ComputeShader, Error, Result, Schema};

fn program(record: &AssetRecord) -> Result<&[u8]> {
    match &record.payload {
        AssetPayload::ComputeShader(shader) => Ok(&shader.program),
        other => Err(Error::validation(format!(
            "expected computeshader payload, got {}",
            other.variant_name()
        ))),
    }
}

fn rebuild(record: &AssetRecord, name: String, to: Schema, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let program = mem.array(program(record)?)?;
    let name = mem.string(&name)?;
    Ok(AssetRecord::in_schema(
        record.kind,
        name,
        to,
        AssetPayload::ComputeShader(ComputeShader { program }),
    ))
}

pub(crate) fn s1_to_h1(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let name = format!("{}{}", record.name, SHADER_NAME_SUFFIX);
    rebuild(record, name, Schema::H1, mem)
}

pub(crate) fn h1_to_s1(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let name = record
        .name
        .strip_suffix(SHADER_NAME_SUFFIX)
        .unwrap_or(&record.name)
        .to_string();
    rebuild(record, name, Schema::S1, mem)
}
