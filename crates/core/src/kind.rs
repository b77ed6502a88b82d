//! Asset kind enumeration
//!
//! Every asset stored in a zone is tagged with exactly one kind. The numeric
//! value is what the container's asset table stores; the canonical name is
//! what manifests, dumps and the registry use.
//!
//! ## Invariant
//!
//! Within one schema, `name()` and `from_name()` form a bijection.

use serde::{Deserialize, Serialize};

/// Asset kinds known to the native schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum AssetKind {
    /// Physics preset
    PhysPreset = 0,
    /// Physics collision map
    PhysCollmap = 1,
    /// Skeletal animation
    XAnim = 2,
    /// Model surfaces (vertex/index data)
    XModelSurfs = 3,
    /// Model header
    XModel = 4,
    /// Material
    Material = 5,
    /// Compute shader program
    ComputeShader = 6,
    /// Vertex shader program
    VertexShader = 7,
    /// Hull shader program
    HullShader = 8,
    /// Domain shader program
    DomainShader = 9,
    /// Pixel shader program
    PixelShader = 10,
    /// Vertex declaration
    VertexDecl = 11,
    /// Technique set
    TechniqueSet = 12,
    /// Image
    Image = 13,
    /// Sound alias list
    Sound = 14,
    /// Loaded sound data
    LoadedSound = 15,
    /// Localized string entry
    Localize = 16,
    /// Raw file
    RawFile = 17,
    /// String table
    StringTable = 18,
    /// Effect definition
    Fx = 19,
    /// Compiled script file
    ScriptFile = 20,
    /// TrueType font
    Ttf = 21,
}

impl AssetKind {
    /// All asset kinds, in numeric order
    pub const ALL: [AssetKind; 22] = [
        AssetKind::PhysPreset,
        AssetKind::PhysCollmap,
        AssetKind::XAnim,
        AssetKind::XModelSurfs,
        AssetKind::XModel,
        AssetKind::Material,
        AssetKind::ComputeShader,
        AssetKind::VertexShader,
        AssetKind::HullShader,
        AssetKind::DomainShader,
        AssetKind::PixelShader,
        AssetKind::VertexDecl,
        AssetKind::TechniqueSet,
        AssetKind::Image,
        AssetKind::Sound,
        AssetKind::LoadedSound,
        AssetKind::Localize,
        AssetKind::RawFile,
        AssetKind::StringTable,
        AssetKind::Fx,
        AssetKind::ScriptFile,
        AssetKind::Ttf,
    ];

    /// Canonical name, as written in manifests
    pub const fn name(&self) -> &'static str {
        match self {
            AssetKind::PhysPreset => "physpreset",
            AssetKind::PhysCollmap => "physcollmap",
            AssetKind::XAnim => "xanim",
            AssetKind::XModelSurfs => "xmodelsurfs",
            AssetKind::XModel => "xmodel",
            AssetKind::Material => "material",
            AssetKind::ComputeShader => "computeshader",
            AssetKind::VertexShader => "vertexshader",
            AssetKind::HullShader => "hullshader",
            AssetKind::DomainShader => "domainshader",
            AssetKind::PixelShader => "pixelshader",
            AssetKind::VertexDecl => "vertexdecl",
            AssetKind::TechniqueSet => "techset",
            AssetKind::Image => "image",
            AssetKind::Sound => "sound",
            AssetKind::LoadedSound => "loaded_sound",
            AssetKind::Localize => "localize",
            AssetKind::RawFile => "rawfile",
            AssetKind::StringTable => "stringtable",
            AssetKind::Fx => "fx",
            AssetKind::ScriptFile => "scriptfile",
            AssetKind::Ttf => "ttf",
        }
    }

    /// Parse from canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Numeric id stored in the container asset table
    pub const fn id(&self) -> u16 {
        *self as u16
    }

    /// Parse from numeric id
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_name_roundtrip_is_bijective() {
        let mut names = HashSet::new();
        for kind in AssetKind::ALL {
            assert!(names.insert(kind.name()), "duplicate name {}", kind.name());
            assert_eq!(AssetKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_id_matches_position() {
        for (index, kind) in AssetKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, index);
            assert_eq!(AssetKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(AssetKind::from_id(AssetKind::ALL.len() as u16), None);
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(AssetKind::from_name("weapon_variant"), None);
        assert_eq!(AssetKind::from_name(""), None);
        assert_eq!(AssetKind::from_name("XModel"), None);
    }

    #[test]
    fn test_ordering_follows_ids() {
        assert!(AssetKind::PhysPreset < AssetKind::XModel);
        assert!(AssetKind::XModel < AssetKind::RawFile);
    }

    proptest! {
        #[test]
        fn prop_id_lookup_agrees_with_names(id in any::<u16>()) {
            match AssetKind::from_id(id) {
                Some(kind) => {
                    prop_assert_eq!(kind.id(), id);
                    prop_assert_eq!(AssetKind::from_name(kind.name()), Some(kind));
                }
                None => prop_assert!(id as usize >= AssetKind::ALL.len()),
            }
        }

        #[test]
        fn prop_unknown_names_never_parse(name in "[a-z_]{0,16}") {
            let known = AssetKind::ALL.iter().any(|kind| kind.name() == name);
            prop_assert_eq!(AssetKind::from_name(&name).is_some(), known);
        }
    }
}
