//! Material codec

use super::{load_json, mismatch, read_array, read_str, write_array, HEADER_STREAM};
use crate::ops::{AssetOps, DumpLayout};
use zonekit_buffer::{FieldReader, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::{AssetKind, AssetPayload, Material, MaterialTexture, Result};

fn write(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::Material(material) = payload else {
        return Err(mismatch("material", payload));
    };
    let techset = buf.push_str(HEADER_STREAM, &material.techset)?;
    header
        .pointer(Some(techset))
        .u8(material.sort_key)
        .u32(material.state_flags);
    write_array(buf, header, &material.textures, |buf, rec, texture| {
        let image = buf.push_str(HEADER_STREAM, &texture.image)?;
        rec.u8(texture.semantic).pointer(Some(image));
        Ok(())
    })
}

fn read(reader: &ZoneReader<'_>, header: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let techset = read_str(reader, header.pointer()?, "techset")?;
    let sort_key = header.u8()?;
    let state_flags = header.u32()?;
    let textures = read_array(reader, header, |reader, rec| {
        let semantic = rec.u8()?;
        let image = read_str(reader, rec.pointer()?, "image")?;
        Ok(MaterialTexture { semantic, image })
    })?;
    Ok(AssetPayload::Material(Material {
        techset,
        sort_key,
        state_flags,
        textures,
    }))
}

pub(crate) fn ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::Material,
        header_size: 4 + 4 + 1 + 4 + 8,
        layout,
        load: load_json,
        write,
        read,
    }
}
