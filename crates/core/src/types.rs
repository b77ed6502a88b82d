//! Asset structs shared across schemas
//!
//! These layouts are identical in every supported schema, so a conversion
//! between two schemas is a plain copy. Names are not stored here; the owning
//! [`crate::AssetRecord`] carries the name.

use serde::{Deserialize, Serialize};

/// Number of level-of-detail slots in a model header
pub const MAX_LODS: usize = 6;

/// Axis-aligned bound stored as centre and half extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Centre point
    pub mid_point: [f32; 3],
    /// Half extent on each axis
    pub half_size: [f32; 3],
}

/// Raw file contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    /// Compressed length, 0 when `buffer` is stored uncompressed
    #[serde(default)]
    pub compressed_len: u32,
    /// File bytes
    pub buffer: Vec<u8>,
}

impl RawFile {
    /// Uncompressed raw file holding `text`
    pub fn from_text(text: &str) -> Self {
        RawFile {
            compressed_len: 0,
            buffer: text.as_bytes().to_vec(),
        }
    }
}

/// String table, cells stored row-major
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTable {
    /// Column count
    pub columns: u32,
    /// Row count
    pub rows: u32,
    /// `columns * rows` cell values
    pub values: Vec<String>,
}

impl StringTable {
    /// Cell at `(row, column)`
    pub fn cell(&self, row: u32, column: u32) -> Option<&str> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.values
            .get((row * self.columns + column) as usize)
            .map(String::as_str)
    }
}

/// One localized string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizeEntry {
    /// Display text
    pub value: String,
}

/// Texture binding of a material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTexture {
    /// Sampler semantic
    pub semantic: u8,
    /// Image asset name
    pub image: String,
}

/// Material
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Technique set asset name
    pub techset: String,
    /// Draw sort key
    pub sort_key: u8,
    /// Render state flags
    pub state_flags: u32,
    /// Texture bindings
    #[serde(default)]
    pub textures: Vec<MaterialTexture>,
}

/// Physics preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysPreset {
    /// Mass
    pub mass: f32,
    /// Restitution
    pub bounce: f32,
    /// Friction coefficient
    pub friction: f32,
    /// Buoyancy factor
    pub buoyancy: f32,
}

/// Compiled compute shader program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeShader {
    /// Program bytecode
    pub program: Vec<u8>,
}

/// Compiled vertex shader program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexShader {
    /// Program bytecode
    pub program: Vec<u8>,
}

/// Compiled pixel shader program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelShader {
    /// Program bytecode
    pub program: Vec<u8>,
}

/// Base pose of one bone
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DObjAnimMat {
    /// Rotation quaternion
    pub quat: [f32; 4],
    /// Translation
    pub trans: [f32; 3],
    /// Translation weight
    pub trans_weight: f32,
}

/// One level-of-detail slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XModelLodInfo {
    /// Switch distance
    pub dist: f32,
    /// Surfaces in this LOD
    pub num_surfs: u16,
    /// First surface index into the model's material list
    pub surf_index: u16,
    /// Surfaces asset name
    #[serde(default)]
    pub model_surfs: Option<String>,
    /// Part bit mask
    #[serde(default)]
    pub part_bits: [u32; 8],
}

/// Collision surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct XModelCollSurf {
    /// Surface bound
    pub bounds: Bounds,
    /// Owning bone
    pub bone_idx: i32,
    /// Contents mask
    pub contents: i32,
    /// Surface flags
    pub surf_flags: i32,
}

/// Per-bone bounding info
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct XBoneInfo {
    /// Bone bound
    pub bounds: Bounds,
    /// Squared bounding radius
    pub radius_squared: f32,
}

/// Vertex stream routing entry of a vertex declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRouting {
    /// Source stream slot
    pub source: u8,
    /// Destination input register
    pub dest: u8,
}
