//! iw7 schema structs

#![allow(missing_docs)]

use crate::types::{Bounds, DObjAnimMat, XBoneInfo, XModelCollSurf, XModelLodInfo, MAX_LODS};
use serde::{Deserialize, Serialize};

/// `character_coll_bounds_type` value for humanoid characters
pub const CHAR_COLL_BOUNDS_HUMAN: u8 = 1;

/// Model header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModel {
    pub num_bones: u8,
    pub num_root_bones: u8,
    pub num_reactive_motion_parts: u8,
    pub num_client_bones: u8,
    pub scale: f32,
    pub no_scale_part_bits: [u32; 8],
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
    pub flags: u16,
    pub coll_surfs: Vec<XModelCollSurf>,
    pub contents: i32,
    pub bone_info: Vec<XBoneInfo>,
    pub radius: f32,
    pub bounds: Bounds,
    pub inv_high_mip_radius: Vec<u16>,
    pub mem_usage: i32,
    pub has_lods: bool,
    pub shadow_cutoff_lod: u8,
    pub character_coll_bounds_type: u8,
    pub unknown_index: u8,
    pub unknown_index2: u8,
}
