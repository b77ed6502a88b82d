//! s1 schema structs
//!
//! Compute shaders share the native layout ([`crate::ComputeShader`]); only
//! their naming convention differs.

use crate::types::StreamRouting;
use serde::{Deserialize, Serialize};

/// Name suffix native compute shaders carry when converted from s1
pub const SHADER_NAME_SUFFIX: &str = "_s1";

/// Vertex declaration, without the native loaded flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexDecl {
    /// Number of vertex streams
    pub stream_count: u8,
    /// Whether an optional stream source is present
    pub has_optional_source: bool,
    /// Stream routing table
    pub routing: Vec<StreamRouting>,
}
