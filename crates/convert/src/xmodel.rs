//! Model header conversions
//!
//! iw6 and the native schema share almost every field; the differences are
//! the width of the no-scale part bits and of `flags`, and the native-only
//! bone physics, composite model and blend shape data. t7 models are
//! organised around meshes and are flattened into the iw7 LOD table.

use crate::memory::ZoneMemory;
use tracing::{debug, warn};
use zonekit_core::math::{bounds_from_min_max, f32_to_half};
use zonekit_core::schema::iw7::CHAR_COLL_BOUNDS_HUMAN;
use zonekit_core::schema::{h1, iw6, iw7, t7};
use zonekit_core::{
    AssetPayload, AssetRecord, Bounds, Error, Result, Schema, XBoneInfo, XModelCollSurf,
    XModelLodInfo, MAX_LODS,
};

/// Part bit words in an iw6 header
const IW6_PART_WORDS: usize = 6;

/// Bones a t7 model may carry, cosmetic bones included
const T7_MAX_TOTAL_BONES: u64 = 256;

/// Distance of LODs a t7 model does not use
const UNUSED_LOD_DIST: f32 = 1_000_000.0;

/// Scale from average triangle area to LOD switch distance
const LOD_DIST_PER_TRI_AREA: f32 = 100_000.0;

/// Sentinel for "no LOD" and unset indices
const NO_INDEX: u8 = 0xFF;

fn capacity(record: &AssetRecord, field: &'static str, limit: u64, actual: u64) -> Error {
    Error::Capacity {
        asset: record.name.clone(),
        field,
        limit,
        actual,
    }
}

fn short_array(record: &AssetRecord, field: &str, expected: usize, actual: usize) -> Error {
    Error::validation(format!(
        "{} has {} {} entries, expected at least {}",
        record.name, actual, field, expected
    ))
}

fn copy_lods(
    lods: &[XModelLodInfo; MAX_LODS],
    mem: &mut ZoneMemory,
) -> Result<[XModelLodInfo; MAX_LODS]> {
    let mut out: [XModelLodInfo; MAX_LODS] = Default::default();
    for (dst, src) in out.iter_mut().zip(lods.iter()) {
        *dst = XModelLodInfo {
            model_surfs: mem.opt_string(src.model_surfs.as_ref())?,
            ..src.clone()
        };
    }
    Ok(out)
}

fn check_coll_surfs(record: &AssetRecord, surfs: &[XModelCollSurf]) -> Result<()> {
    if surfs.len() > i16::MAX as usize {
        return Err(capacity(
            record,
            "num_coll_surfs",
            i16::MAX as u64,
            surfs.len() as u64,
        ));
    }
    Ok(())
}

pub(crate) fn iw6_to_h1(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let AssetPayload::Iw6XModel(src) = &record.payload else {
        return Err(Error::validation(format!(
            "expected iw6 xmodel payload, got {}",
            record.payload.variant_name()
        )));
    };
    let flags = u16::try_from(src.flags)
        .map_err(|_| capacity(record, "flags", u16::MAX as u64, src.flags as u64))?;
    check_coll_surfs(record, &src.coll_surfs)?;

    let mut no_scale_part_bits = [0u32; 8];
    no_scale_part_bits[..IW6_PART_WORDS].copy_from_slice(&src.no_scale_part_bits);

    let model = h1::XModel {
        num_bones: src.num_bones,
        num_root_bones: src.num_root_bones,
        num_reactive_motion_parts: src.num_reactive_motion_parts,
        lod_ramp_type: src.pad0,
        num_bone_physics: 0,
        scale: src.scale,
        no_scale_part_bits,
        bone_names: mem.strings(&src.bone_names)?,
        parent_list: mem.array(&src.parent_list)?,
        tag_angles: mem.array(&src.tag_angles)?,
        tag_positions: mem.array(&src.tag_positions)?,
        part_classification: mem.array(&src.part_classification)?,
        base_mat: mem.array(&src.base_mat)?,
        material_handles: mem.strings(&src.material_handles)?,
        lod_info: copy_lods(&src.lod_info, mem)?,
        num_lods: src.num_lods,
        coll_lod: src.coll_lod,
        num_composite_models: 0,
        flags,
        coll_surfs: mem.array(&src.coll_surfs)?,
        contents: src.contents,
        bone_info: mem.array(&src.bone_info)?,
        radius: src.radius,
        bounds: src.bounds,
        inv_high_mip_radius: mem.array(&src.inv_high_mip_radius)?,
        mem_usage: src.mem_usage,
        // only the names survive; the assets themselves are resolved by the target
        phys_preset: mem.opt_string(src.phys_preset.as_ref())?,
        phys_collmap: mem.opt_string(src.phys_collmap.as_ref())?,
        quantization: src.quantization,
        ..h1::XModel::default()
    };
    Ok(AssetRecord::in_schema(
        record.kind,
        mem.string(&record.name)?,
        Schema::H1,
        AssetPayload::XModel(model),
    ))
}

pub(crate) fn h1_to_iw6(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let AssetPayload::XModel(src) = &record.payload else {
        return Err(Error::validation(format!(
            "expected h1 xmodel payload, got {}",
            record.payload.variant_name()
        )));
    };
    if let Some((word, bits)) = src
        .no_scale_part_bits
        .iter()
        .enumerate()
        .skip(IW6_PART_WORDS)
        .rev()
        .find(|(_, bits)| **bits != 0)
    {
        let highest = word as u64 * 32 + (32 - bits.leading_zeros()) as u64;
        return Err(capacity(
            record,
            "no_scale_part_bits",
            IW6_PART_WORDS as u64 * 32,
            highest,
        ));
    }
    check_coll_surfs(record, &src.coll_surfs)?;
    if src.num_bone_physics != 0 || src.num_composite_models != 0 || !src.weight_names.is_empty() {
        debug!(
            target: "zonekit::convert",
            asset = %record.name,
            "Dropping bone physics, composite models and blend shapes"
        );
    }

    let mut no_scale_part_bits = [0u32; IW6_PART_WORDS];
    no_scale_part_bits.copy_from_slice(&src.no_scale_part_bits[..IW6_PART_WORDS]);

    let model = iw6::XModel {
        num_bones: src.num_bones,
        num_root_bones: src.num_root_bones,
        num_reactive_motion_parts: src.num_reactive_motion_parts,
        pad0: src.lod_ramp_type,
        scale: src.scale,
        no_scale_part_bits,
        bone_names: mem.strings(&src.bone_names)?,
        parent_list: mem.array(&src.parent_list)?,
        tag_angles: mem.array(&src.tag_angles)?,
        tag_positions: mem.array(&src.tag_positions)?,
        part_classification: mem.array(&src.part_classification)?,
        base_mat: mem.array(&src.base_mat)?,
        material_handles: mem.strings(&src.material_handles)?,
        lod_info: copy_lods(&src.lod_info, mem)?,
        num_lods: src.num_lods,
        coll_lod: src.coll_lod,
        flags: src.flags as u32,
        coll_surfs: mem.array(&src.coll_surfs)?,
        contents: src.contents,
        bone_info: mem.array(&src.bone_info)?,
        radius: src.radius,
        bounds: src.bounds,
        inv_high_mip_radius: mem.array(&src.inv_high_mip_radius)?,
        mem_usage: src.mem_usage,
        phys_preset: mem.opt_string(src.phys_preset.as_ref())?,
        phys_collmap: mem.opt_string(src.phys_collmap.as_ref())?,
        quantization: src.quantization,
    };
    Ok(AssetRecord::in_schema(
        record.kind,
        mem.string(&record.name)?,
        Schema::Iw6,
        AssetPayload::Iw6XModel(model),
    ))
}

/// Materials of every used LOD, flattened in LOD order
struct FlatMaterials {
    handles: Vec<String>,
    inv_sq_radii: Vec<f32>,
    surf_index: [u16; MAX_LODS],
}

fn flatten_materials(
    record: &AssetRecord,
    src: &t7::XModel,
    num_lods: usize,
    mem: &mut ZoneMemory,
) -> Result<FlatMaterials> {
    let mut flat = FlatMaterials {
        handles: Vec::new(),
        inv_sq_radii: Vec::new(),
        surf_index: [0; MAX_LODS],
    };
    for (lod, mesh) in src.mesh_materials.iter().take(num_lods).enumerate() {
        if mesh.himip_inv_sq_radii.len() != mesh.materials.len() {
            return Err(Error::validation(format!(
                "{} lod {} has {} materials but {} high-mip radii",
                record.name,
                lod,
                mesh.materials.len(),
                mesh.himip_inv_sq_radii.len()
            )));
        }
        flat.surf_index[lod] = u16::try_from(flat.handles.len()).map_err(|_| {
            capacity(record, "surf_index", u16::MAX as u64, flat.handles.len() as u64)
        })?;
        for material in &mesh.materials {
            flat.handles.push(mem.string(material)?);
        }
        flat.inv_sq_radii.extend_from_slice(&mesh.himip_inv_sq_radii);
    }
    if flat.handles.len() > u8::MAX as usize {
        return Err(capacity(
            record,
            "num_surfs",
            u8::MAX as u64,
            flat.handles.len() as u64,
        ));
    }
    mem.charge(std::mem::size_of_val(flat.inv_sq_radii.as_slice()))?;
    Ok(flat)
}

pub(crate) fn t7_to_iw7(record: &AssetRecord, mem: &mut ZoneMemory) -> Result<AssetRecord> {
    let AssetPayload::T7XModel(src) = &record.payload else {
        return Err(Error::validation(format!(
            "expected t7 xmodel payload, got {}",
            record.payload.variant_name()
        )));
    };

    let num_bones = u8::try_from(src.num_bones)
        .map_err(|_| capacity(record, "num_bones", u8::MAX as u64, src.num_bones as u64))?;
    let num_client_bones = u8::try_from(src.num_cosmetic_bones).map_err(|_| {
        capacity(
            record,
            "num_cosmetic_bones",
            u8::MAX as u64,
            src.num_cosmetic_bones as u64,
        )
    })?;
    let total_bones = src.num_bones as u64 + src.num_cosmetic_bones as u64;
    if total_bones > T7_MAX_TOTAL_BONES {
        return Err(capacity(record, "num_bones", T7_MAX_TOTAL_BONES, total_bones));
    }
    let num_root_bones = u8::try_from(src.num_root_bones).map_err(|_| {
        capacity(record, "num_root_bones", u8::MAX as u64, src.num_root_bones as u64)
    })?;
    if src.num_lods as usize > MAX_LODS {
        return Err(capacity(
            record,
            "num_lods",
            MAX_LODS as u64,
            src.num_lods as u64,
        ));
    }
    if src.num_cosmetic_bones > 0 {
        warn!(
            target: "zonekit::convert",
            asset = %record.name,
            cosmetic = src.num_cosmetic_bones,
            "Model has cosmetic bones; they become client bones"
        );
    }

    let num_lods = src.num_lods as usize;
    if src.meshes.len() < num_lods {
        return Err(short_array(record, "mesh", num_lods, src.meshes.len()));
    }
    if src.mesh_materials.len() < num_lods {
        return Err(short_array(record, "mesh material", num_lods, src.mesh_materials.len()));
    }
    if src.average_tri_area.len() < num_lods {
        return Err(short_array(record, "triangle area", num_lods, src.average_tri_area.len()));
    }

    let child_bones = (total_bones as usize).saturating_sub(src.num_root_bones as usize);
    let tag_positions = src
        .tag_positions
        .get(..child_bones)
        .ok_or_else(|| short_array(record, "tag position", child_bones, src.tag_positions.len()))?;
    let bone_info_count = (src.num_bones as usize).saturating_sub(src.num_root_bones as usize);
    let bone_info = src
        .bone_info
        .get(..bone_info_count)
        .ok_or_else(|| short_array(record, "bone info", bone_info_count, src.bone_info.len()))?;

    let flat = flatten_materials(record, src, num_lods, mem)?;

    let mut lod_info: [XModelLodInfo; MAX_LODS] = Default::default();
    for lod in lod_info.iter_mut() {
        lod.dist = UNUSED_LOD_DIST;
    }
    for (i, lod) in lod_info.iter_mut().enumerate().take(num_lods) {
        let mesh = &src.meshes[i];
        lod.dist = src.average_tri_area[i] * LOD_DIST_PER_TRI_AREA;
        lod.num_surfs = mesh.num_surfs;
        lod.surf_index = flat.surf_index[i];
        lod.model_surfs = Some(mem.string(&mesh.name)?);
        lod.part_bits = mesh.part_bits;
    }

    let coll_lod = src
        .coll_lod
        .as_ref()
        .and_then(|name| {
            src.meshes[..num_lods]
                .iter()
                .rposition(|mesh| &mesh.name == name)
        })
        .map_or(NO_INDEX, |i| i as u8);

    let coll_surfs = src
        .coll_surfs
        .iter()
        .map(|surf| XModelCollSurf {
            bounds: bounds_from_min_max(surf.mins, surf.maxs),
            bone_idx: surf.bone_idx,
            contents: surf.contents,
            surf_flags: surf.surf_flags,
        })
        .collect::<Vec<_>>();
    check_coll_surfs(record, &coll_surfs)?;
    mem.charge(std::mem::size_of_val(coll_surfs.as_slice()))?;

    let bone_info = bone_info
        .iter()
        .map(|info| XBoneInfo {
            bounds: Bounds {
                mid_point: info.bounds[0],
                half_size: info.bounds[1],
            },
            radius_squared: info.radius_squared,
        })
        .collect::<Vec<_>>();
    mem.charge(std::mem::size_of_val(bone_info.as_slice()))?;

    let inv_high_mip_radius = flat
        .inv_sq_radii
        .iter()
        .map(|r| f32_to_half(r.sqrt()))
        .collect::<Vec<_>>();

    if src.phys_preset.is_some() || src.phys_constraints.is_some() {
        debug!(
            target: "zonekit::convert",
            asset = %record.name,
            "Dropping physics references with no iw7 counterpart"
        );
    }

    let model = iw7::XModel {
        num_bones,
        num_root_bones,
        num_reactive_motion_parts: 0,
        num_client_bones,
        scale: src.area_scale,
        no_scale_part_bits: [0; 8],
        bone_names: mem.strings(&src.bone_names)?,
        parent_list: mem.array(&src.parent_list)?,
        tag_angles: mem.array(&src.tag_angles)?,
        tag_positions: mem.array(tag_positions)?,
        part_classification: mem.array(&src.part_classification)?,
        base_mat: mem.array(&src.base_mat)?,
        material_handles: flat.handles,
        lod_info,
        num_lods: src.num_lods,
        coll_lod,
        // unused by the game
        flags: 0,
        coll_surfs,
        contents: src.contents,
        bone_info,
        radius: src.radius,
        bounds: bounds_from_min_max(src.mins, src.maxs),
        inv_high_mip_radius,
        mem_usage: 0,
        has_lods: num_lods > 0,
        shadow_cutoff_lod: MAX_LODS as u8,
        character_coll_bounds_type: CHAR_COLL_BOUNDS_HUMAN,
        unknown_index: NO_INDEX,
        unknown_index2: NO_INDEX,
    };
    Ok(AssetRecord::in_schema(
        record.kind,
        mem.string(&record.name)?,
        Schema::Iw7,
        AssetPayload::Iw7XModel(model),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_core::math::half_to_f32;
    use zonekit_core::AssetKind;

    fn t7_model() -> t7::XModel {
        t7::XModel {
            num_bones: 3,
            num_root_bones: 1,
            num_lods: 2,
            area_scale: 1.5,
            bone_names: vec!["tag_origin".into(), "j_a".into(), "j_b".into()],
            parent_list: vec![0, 1],
            tag_angles: vec![[0; 4]; 2],
            tag_positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            part_classification: vec![0; 3],
            meshes: vec![
                t7::XModelMesh {
                    name: "body_lod0".into(),
                    num_surfs: 2,
                    part_bits: [1; 8],
                },
                t7::XModelMesh {
                    name: "body_lod1".into(),
                    num_surfs: 1,
                    part_bits: [2; 8],
                },
            ],
            average_tri_area: vec![0.001, 0.004],
            mesh_materials: vec![
                t7::MeshMaterials {
                    materials: vec!["mc/skin".into(), "mc/cloth".into()],
                    himip_inv_sq_radii: vec![4.0, 0.25],
                },
                t7::MeshMaterials {
                    materials: vec!["mc/skin".into()],
                    himip_inv_sq_radii: vec![1.0],
                },
            ],
            coll_lod: Some("body_lod1".into()),
            coll_surfs: vec![t7::XModelCollSurf {
                mins: [-2.0, -2.0, 0.0],
                maxs: [2.0, 2.0, 10.0],
                bone_idx: 0,
                contents: 1,
                surf_flags: 0,
            }],
            bone_info: vec![
                t7::XBoneInfo {
                    bounds: [[0.0, 1.0, 2.0], [0.5, 0.5, 0.5]],
                    radius_squared: 0.75,
                };
                2
            ],
            radius: 9.0,
            mins: [-4.0, -4.0, 0.0],
            maxs: [4.0, 4.0, 72.0],
            flags: 0x20,
            ..t7::XModel::default()
        }
    }

    fn t7_record(model: t7::XModel) -> AssetRecord {
        AssetRecord::in_schema(
            AssetKind::XModel,
            "body",
            Schema::T7,
            AssetPayload::T7XModel(model),
        )
    }

    fn converted_model(record: &AssetRecord) -> iw7::XModel {
        match &record.payload {
            AssetPayload::Iw7XModel(m) => m.clone(),
            other => panic!("unexpected payload {}", other.variant_name()),
        }
    }

    #[test]
    fn test_t7_lod_table_is_flattened() {
        let mut mem = ZoneMemory::default();
        let out = t7_to_iw7(&t7_record(t7_model()), &mut mem).unwrap();
        let model = converted_model(&out);

        assert_eq!(model.material_handles, vec!["mc/skin", "mc/cloth", "mc/skin"]);
        assert_eq!(model.lod_info[0].surf_index, 0);
        assert_eq!(model.lod_info[1].surf_index, 2);
        assert_eq!(model.lod_info[0].num_surfs, 2);
        assert_eq!(model.lod_info[1].model_surfs.as_deref(), Some("body_lod1"));
        assert_eq!(model.lod_info[1].part_bits, [2; 8]);
        assert!((model.lod_info[0].dist - 100.0).abs() < 1e-3);
        assert!((model.lod_info[1].dist - 400.0).abs() < 1e-3);
        assert_eq!(model.lod_info[2].dist, UNUSED_LOD_DIST);
        assert_eq!(model.coll_lod, 1);
        assert_eq!(model.flags, 0);
        assert!(model.has_lods);
    }

    #[test]
    fn test_t7_bounds_and_radii_recomputed() {
        let mut mem = ZoneMemory::default();
        let model = converted_model(&t7_to_iw7(&t7_record(t7_model()), &mut mem).unwrap());

        assert_eq!(model.bounds.mid_point, [0.0, 0.0, 36.0]);
        assert_eq!(model.bounds.half_size, [4.0, 4.0, 36.0]);
        assert_eq!(model.coll_surfs[0].bounds.mid_point, [0.0, 0.0, 5.0]);
        assert_eq!(model.bone_info[0].bounds.half_size, [0.5, 0.5, 0.5]);

        let radii: Vec<f32> = model.inv_high_mip_radius.iter().map(|h| half_to_f32(*h)).collect();
        assert_eq!(radii, vec![2.0, 0.5, 1.0]);
    }

    #[test]
    fn test_t7_tag_positions_keep_every_axis() {
        let mut mem = ZoneMemory::default();
        let model = converted_model(&t7_to_iw7(&t7_record(t7_model()), &mut mem).unwrap());
        assert_eq!(model.tag_positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_t7_fixed_fields() {
        let mut mem = ZoneMemory::default();
        let model = converted_model(&t7_to_iw7(&t7_record(t7_model()), &mut mem).unwrap());
        assert_eq!(model.scale, 1.5);
        assert_eq!(model.no_scale_part_bits, [0; 8]);
        assert_eq!(model.shadow_cutoff_lod, 6);
        assert_eq!(model.character_coll_bounds_type, CHAR_COLL_BOUNDS_HUMAN);
        assert_eq!(model.unknown_index, 0xFF);
        assert_eq!(model.unknown_index2, 0xFF);
        assert_eq!(model.mem_usage, 0);
    }

    #[test]
    fn test_t7_unknown_coll_lod() {
        let mut mem = ZoneMemory::default();
        let mut src = t7_model();
        src.coll_lod = Some("other".into());
        assert_eq!(converted_model(&t7_to_iw7(&t7_record(src), &mut mem).unwrap()).coll_lod, 0xFF);
    }

    #[test]
    fn test_t7_too_many_lods_is_capacity_error() {
        let mut mem = ZoneMemory::default();
        let mut src = t7_model();
        src.num_lods = 7;
        let err = t7_to_iw7(&t7_record(src), &mut mem).unwrap_err();
        assert!(matches!(err, Error::Capacity { field: "num_lods", limit: 6, actual: 7, .. }));
    }

    #[test]
    fn test_t7_too_many_bones_is_capacity_error() {
        let mut mem = ZoneMemory::default();
        let mut src = t7_model();
        src.num_bones = 200;
        src.num_cosmetic_bones = 57;
        let err = t7_to_iw7(&t7_record(src), &mut mem).unwrap_err();
        assert!(matches!(err, Error::Capacity { limit: 256, actual: 257, .. }));
    }

    #[test]
    fn test_h1_high_part_bits_is_capacity_error() {
        let mut mem = ZoneMemory::default();
        let mut model = h1::XModel::default();
        model.no_scale_part_bits[7] = 1;
        let record = AssetRecord::new(AssetKind::XModel, "m", AssetPayload::XModel(model));
        let err = h1_to_iw6(&record, &mut mem).unwrap_err();
        assert!(matches!(
            err,
            Error::Capacity { field: "no_scale_part_bits", limit: 192, actual: 225, .. }
        ));
    }

    #[test]
    fn test_iw6_wide_flags_is_capacity_error() {
        let mut mem = ZoneMemory::default();
        let model = iw6::XModel {
            flags: 0x1_0000,
            ..iw6::XModel::default()
        };
        let record =
            AssetRecord::in_schema(AssetKind::XModel, "m", Schema::Iw6, AssetPayload::Iw6XModel(model));
        let err = iw6_to_h1(&record, &mut mem).unwrap_err();
        assert!(matches!(err, Error::Capacity { field: "flags", .. }));
    }

    #[test]
    fn test_iw6_to_h1_zeroes_native_only_fields() {
        let mut mem = ZoneMemory::default();
        let model = iw6::XModel {
            num_bones: 2,
            pad0: 3,
            no_scale_part_bits: [1, 2, 3, 4, 5, 6],
            phys_preset: Some("default".into()),
            ..iw6::XModel::default()
        };
        let record =
            AssetRecord::in_schema(AssetKind::XModel, "m", Schema::Iw6, AssetPayload::Iw6XModel(model));
        let out = iw6_to_h1(&record, &mut mem).unwrap();
        let AssetPayload::XModel(native) = out.payload else {
            panic!("expected native model");
        };
        assert_eq!(native.lod_ramp_type, 3);
        assert_eq!(native.no_scale_part_bits, [1, 2, 3, 4, 5, 6, 0, 0]);
        assert_eq!(native.num_bone_physics, 0);
        assert_eq!(native.num_composite_models, 0);
        assert_eq!(native.target_count, 0);
        assert!(native.weight_names.is_empty());
        assert_eq!(native.skeleton_script, None);
        assert_eq!(native.phys_preset.as_deref(), Some("default"));
    }
}
