//! Native schema structs

#![allow(missing_docs)]

use crate::types::{
    Bounds, DObjAnimMat, StreamRouting, XBoneInfo, XModelCollSurf, XModelLodInfo, MAX_LODS,
};
use serde::{Deserialize, Serialize};

/// Model header
///
/// Per-bone arrays (`parent_list`, `tag_angles`, `tag_positions`,
/// `bone_info`) cover the non-root bones only; `bone_names`,
/// `part_classification` and `base_mat` cover every bone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModel {
    pub num_bones: u8,
    pub num_root_bones: u8,
    pub num_reactive_motion_parts: u8,
    pub lod_ramp_type: u8,
    pub num_bone_physics: u8,
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
    pub num_composite_models: u8,
    pub flags: u16,
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
    pub target_count: u16,
    pub number_of_weights: u16,
    pub weight_names: Vec<String>,
    pub skeleton_script: Option<String>,
    pub mdao_volume_count: u16,
}

impl XModel {
    /// Number of non-root bones
    pub fn num_child_bones(&self) -> usize {
        self.num_bones.saturating_sub(self.num_root_bones) as usize
    }

    /// Surface count, one material handle per surface
    pub fn num_surfs(&self) -> usize {
        self.material_handles.len()
    }
}

/// Vertex declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexDecl {
    pub stream_count: u8,
    pub has_optional_source: bool,
    /// Set by the loader once the declaration has been created on the device
    pub is_loaded: bool,
    pub routing: Vec<StreamRouting>,
}
