//! iw6 schema structs

#![allow(missing_docs)]

use crate::types::{Bounds, DObjAnimMat, XBoneInfo, XModelCollSurf, XModelLodInfo, MAX_LODS};
use serde::{Deserialize, Serialize};

/// Model header
///
/// Differs from the native header in the width of `no_scale_part_bits` (6
/// words instead of 8) and of `flags`, and it has no bone physics, composite
/// models, blend shapes or volumes. The byte the native header uses for
/// `lod_ramp_type` is padding here and is carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModel {
    pub num_bones: u8,
    pub num_root_bones: u8,
    pub num_reactive_motion_parts: u8,
    pub pad0: u8,
    pub scale: f32,
    pub no_scale_part_bits: [u32; 6],
    pub bone_names: Vec<String>,
    pub parent_list: Vec<u8>,
    pub tag_angles: Vec<[i16; 4]>,
    pub tag_positions: Vec<[f32; 3]>,
    pub part_classification: Vec<u8>,
    pub base_mat: Vec<DObjAnimMat>,
    pub material_handles: Vec<String>,
    pub lod_info: [XModelLodInfo; MAX_LODS],
    pub num_lods: u8,
    pub coll_lod: u8,
    pub flags: u32,
    pub coll_surfs: Vec<XModelCollSurf>,
    pub contents: i32,
    pub bone_info: Vec<XBoneInfo>,
    pub radius: f32,
    pub bounds: Bounds,
    pub inv_high_mip_radius: Vec<u16>,
    pub mem_usage: i32,
    pub phys_preset: Option<String>,
    pub phys_collmap: Option<String>,
    pub quantization: f32,
}
