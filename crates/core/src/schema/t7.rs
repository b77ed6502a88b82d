//! t7 schema structs
//!
//! The t7 model is organised around meshes: each LOD references a mesh asset
//! and a per-mesh material list instead of a flat material array. Bounds are
//! stored as min/max corners.

#![allow(missing_docs)]

use crate::types::DObjAnimMat;
use serde::{Deserialize, Serialize};

/// Mesh referenced by one LOD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModelMesh {
    pub name: String,
    pub num_surfs: u16,
    pub part_bits: [u32; 8],
}

/// Materials of one mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshMaterials {
    pub materials: Vec<String>,
    /// Inverse squared high-mip radius per material
    pub himip_inv_sq_radii: Vec<f32>,
}

/// Collision surface with corner bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModelCollSurf {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub bone_idx: i32,
    pub contents: i32,
    pub surf_flags: i32,
}

/// Per-bone bounding info; `bounds` holds centre then half extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XBoneInfo {
    pub bounds: [[f32; 3]; 2],
    pub radius_squared: f32,
}

/// Model header
///
/// Per-bone arrays past the root bones cover both regular and cosmetic
/// bones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XModel {
    pub num_bones: u16,
    pub num_root_bones: u16,
    pub num_cosmetic_bones: u16,
    pub num_lods: u8,
    pub area_scale: f32,
    pub bone_names: Vec<String>,
    pub parent_list: Vec<u8>,
    pub tag_angles: Vec<[i16; 4]>,
    pub tag_positions: Vec<[f32; 3]>,
    pub part_classification: Vec<u8>,
    pub base_mat: Vec<DObjAnimMat>,
    pub meshes: Vec<XModelMesh>,
    pub average_tri_area: Vec<f32>,
    pub mesh_materials: Vec<MeshMaterials>,
    /// Name of the mesh used for collision
    pub coll_lod: Option<String>,
    pub coll_surfs: Vec<XModelCollSurf>,
    pub contents: i32,
    pub bone_info: Vec<XBoneInfo>,
    pub radius: f32,
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub flags: u16,
    pub phys_preset: Option<String>,
    pub phys_constraints: Option<String>,
}
