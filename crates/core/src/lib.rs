//! Core types for zonekit
//!
//! This crate defines the foundational types shared by every other crate:
//! - AssetKind: the enumerated asset kinds and their canonical names
//! - Schema: engine schema identifiers (h1 is the native build schema)
//! - AssetRecord / AssetPayload: kind-tagged named asset data
//! - Per-schema asset structs (`schema::{h1, iw6, s1, t7, iw7}`)
//! - Error / Diagnostic: the error taxonomy and per-asset diagnostics
//! - Reference marker helpers for reference-only asset names

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagnostics;
pub mod error;
pub mod kind;
pub mod math;
pub mod record;
pub mod schema;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use kind::AssetKind;
pub use record::{
    is_reference_name, reference_name, strip_reference, AssetPayload, AssetRecord,
    REFERENCE_MARKER,
};
pub use schema::Schema;
pub use types::{
    Bounds, ComputeShader, DObjAnimMat, LocalizeEntry, Material, MaterialTexture, PhysPreset,
    PixelShader, RawFile, StreamRouting, StringTable, VertexShader, XBoneInfo, XModelCollSurf,
    XModelLodInfo, MAX_LODS,
};
