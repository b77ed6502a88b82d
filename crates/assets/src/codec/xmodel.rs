//! Model header codec
//!
//! Bone names and weight names go through the interned-value table since the
//! same tags appear in most models of a zone. Per-bone arrays, collision
//! surfaces and bone info are written to the bulk stream.

use super::{
    load_json, mismatch, opt_str, read_array, read_interned, read_names, read_opt_str,
    write_array, write_interned, write_names,
};
use crate::ops::{AssetOps, DumpLayout};
use zonekit_buffer::{FieldReader, RecordWriter, ZoneBuffer, ZoneReader};
use zonekit_core::schema::h1::XModel;
use zonekit_core::{
    AssetKind, AssetPayload, Bounds, DObjAnimMat, Result, XBoneInfo, XModelCollSurf,
    XModelLodInfo, MAX_LODS,
};

const LOD_SIZE: u32 = 4 + 2 + 2 + 4 + 32;

const HEADER_SIZE: u32 = 4 // name
    + 8 // counts
    + 2 // flags
    + 4 // scale
    + 32 // no-scale part bits
    + 7 * 8 // bone and material arrays
    + MAX_LODS as u32 * LOD_SIZE
    + 8 // coll surfs
    + 4 // contents
    + 8 // bone info
    + 4 // radius
    + 24 // bounds
    + 8 // inv high-mip radius
    + 4 // mem usage
    + 8 // physics refs
    + 4 // quantization
    + 4 // blend shape counts
    + 8 // weight names
    + 4 // skeleton script
    + 2; // mdao volumes

fn write_bounds(rec: &mut RecordWriter, bounds: &Bounds) {
    for v in bounds.mid_point.iter().chain(bounds.half_size.iter()) {
        rec.f32(*v);
    }
}

fn read_bounds(rec: &mut FieldReader<'_>) -> Result<Bounds> {
    let mut bounds = Bounds::default();
    for v in bounds.mid_point.iter_mut().chain(bounds.half_size.iter_mut()) {
        *v = rec.f32()?;
    }
    Ok(bounds)
}

fn write(buf: &mut ZoneBuffer, header: &mut RecordWriter, payload: &AssetPayload) -> Result<()> {
    let AssetPayload::XModel(model) = payload else {
        return Err(mismatch("h1 xmodel", payload));
    };

    header
        .u8(model.num_bones)
        .u8(model.num_root_bones)
        .u8(model.num_reactive_motion_parts)
        .u8(model.lod_ramp_type)
        .u8(model.num_bone_physics)
        .u8(model.num_lods)
        .u8(model.coll_lod)
        .u8(model.num_composite_models)
        .u16(model.flags)
        .f32(model.scale);
    for bits in model.no_scale_part_bits {
        header.u32(bits);
    }

    write_interned(buf, header, &model.bone_names)?;
    write_array(buf, header, &model.parent_list, |_, rec, parent| {
        rec.u8(*parent);
        Ok(())
    })?;
    write_array(buf, header, &model.tag_angles, |_, rec, angles| {
        for a in angles {
            rec.i16(*a);
        }
        Ok(())
    })?;
    write_array(buf, header, &model.tag_positions, |_, rec, pos| {
        for p in pos {
            rec.f32(*p);
        }
        Ok(())
    })?;
    write_array(buf, header, &model.part_classification, |_, rec, class| {
        rec.u8(*class);
        Ok(())
    })?;
    write_array(buf, header, &model.base_mat, |_, rec, mat| {
        for v in mat.quat.iter().chain(mat.trans.iter()) {
            rec.f32(*v);
        }
        rec.f32(mat.trans_weight);
        Ok(())
    })?;
    write_names(buf, header, &model.material_handles)?;

    for lod in &model.lod_info {
        let surfs = opt_str(buf, lod.model_surfs.as_deref())?;
        header
            .f32(lod.dist)
            .u16(lod.num_surfs)
            .u16(lod.surf_index)
            .pointer(surfs);
        for bits in lod.part_bits {
            header.u32(bits);
        }
    }

    write_array(buf, header, &model.coll_surfs, |_, rec, surf| {
        write_bounds(rec, &surf.bounds);
        rec.i32(surf.bone_idx).i32(surf.contents).i32(surf.surf_flags);
        Ok(())
    })?;
    header.i32(model.contents);
    write_array(buf, header, &model.bone_info, |_, rec, info| {
        write_bounds(rec, &info.bounds);
        rec.f32(info.radius_squared);
        Ok(())
    })?;
    header.f32(model.radius);
    write_bounds(header, &model.bounds);
    write_array(buf, header, &model.inv_high_mip_radius, |_, rec, r| {
        rec.u16(*r);
        Ok(())
    })?;
    header.i32(model.mem_usage);

    let preset = opt_str(buf, model.phys_preset.as_deref())?;
    let collmap = opt_str(buf, model.phys_collmap.as_deref())?;
    header
        .pointer(preset)
        .pointer(collmap)
        .f32(model.quantization)
        .u16(model.target_count)
        .u16(model.number_of_weights);
    write_interned(buf, header, &model.weight_names)?;
    let script = opt_str(buf, model.skeleton_script.as_deref())?;
    header.pointer(script).u16(model.mdao_volume_count);
    Ok(())
}

fn read(reader: &ZoneReader<'_>, h: &mut FieldReader<'_>) -> Result<AssetPayload> {
    let mut model = XModel {
        num_bones: h.u8()?,
        num_root_bones: h.u8()?,
        num_reactive_motion_parts: h.u8()?,
        lod_ramp_type: h.u8()?,
        num_bone_physics: h.u8()?,
        num_lods: h.u8()?,
        coll_lod: h.u8()?,
        num_composite_models: h.u8()?,
        flags: h.u16()?,
        scale: h.f32()?,
        ..XModel::default()
    };
    for bits in model.no_scale_part_bits.iter_mut() {
        *bits = h.u32()?;
    }

    model.bone_names = read_interned(reader, h)?;
    model.parent_list = read_array(reader, h, |_, rec| Ok(rec.u8()?))?;
    model.tag_angles = read_array(reader, h, |_, rec| {
        Ok([rec.i16()?, rec.i16()?, rec.i16()?, rec.i16()?])
    })?;
    model.tag_positions = read_array(reader, h, |_, rec| Ok([rec.f32()?, rec.f32()?, rec.f32()?]))?;
    model.part_classification = read_array(reader, h, |_, rec| Ok(rec.u8()?))?;
    model.base_mat = read_array(reader, h, |_, rec| {
        Ok(DObjAnimMat {
            quat: [rec.f32()?, rec.f32()?, rec.f32()?, rec.f32()?],
            trans: [rec.f32()?, rec.f32()?, rec.f32()?],
            trans_weight: rec.f32()?,
        })
    })?;
    model.material_handles = read_names(reader, h)?;

    for lod in model.lod_info.iter_mut() {
        *lod = XModelLodInfo {
            dist: h.f32()?,
            num_surfs: h.u16()?,
            surf_index: h.u16()?,
            model_surfs: read_opt_str(reader, h.pointer()?)?,
            part_bits: [0; 8],
        };
        for bits in lod.part_bits.iter_mut() {
            *bits = h.u32()?;
        }
    }

    model.coll_surfs = read_array(reader, h, |_, rec| {
        Ok(XModelCollSurf {
            bounds: read_bounds(rec)?,
            bone_idx: rec.i32()?,
            contents: rec.i32()?,
            surf_flags: rec.i32()?,
        })
    })?;
    model.contents = h.i32()?;
    model.bone_info = read_array(reader, h, |_, rec| {
        Ok(XBoneInfo {
            bounds: read_bounds(rec)?,
            radius_squared: rec.f32()?,
        })
    })?;
    model.radius = h.f32()?;
    model.bounds = read_bounds(h)?;
    model.inv_high_mip_radius = read_array(reader, h, |_, rec| Ok(rec.u16()?))?;
    model.mem_usage = h.i32()?;
    model.phys_preset = read_opt_str(reader, h.pointer()?)?;
    model.phys_collmap = read_opt_str(reader, h.pointer()?)?;
    model.quantization = h.f32()?;
    model.target_count = h.u16()?;
    model.number_of_weights = h.u16()?;
    model.weight_names = read_interned(reader, h)?;
    model.skeleton_script = read_opt_str(reader, h.pointer()?)?;
    model.mdao_volume_count = h.u16()?;
    Ok(AssetPayload::XModel(model))
}

pub(crate) fn ops(layout: DumpLayout) -> AssetOps {
    AssetOps {
        kind: AssetKind::XModel,
        header_size: HEADER_SIZE,
        layout,
        load: load_json,
        write,
        read,
    }
}
