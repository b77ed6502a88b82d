//! Engine schemas
//!
//! A schema is the field layout and semantics of one engine release. `h1` is
//! the native build schema: zones are always built and loaded in it, and the
//! converter layer maps foreign schemas to and from it.

pub mod h1;
pub mod iw6;
pub mod iw7;
pub mod s1;
pub mod t7;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine schema identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Native build schema
    H1,
    /// Shares the native layouts for every kind it is listed for
    H2,
    /// Older model header layout
    Iw6,
    /// Older shader and vertex declaration layouts
    S1,
    /// Mesh-based model layout
    T7,
    /// Newer model header layout
    Iw7,
}

impl Schema {
    /// All schemas
    pub const ALL: [Schema; 6] = [
        Schema::H1,
        Schema::H2,
        Schema::Iw6,
        Schema::S1,
        Schema::T7,
        Schema::Iw7,
    ];

    /// The schema zones are built in
    pub const NATIVE: Schema = Schema::H1;

    /// Lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            Schema::H1 => "h1",
            Schema::H2 => "h2",
            Schema::Iw6 => "iw6",
            Schema::S1 => "s1",
            Schema::T7 => "t7",
            Schema::Iw7 => "iw7",
        }
    }

    /// Parse from lowercase name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
