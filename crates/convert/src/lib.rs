//! Cross-schema asset conversion for zonekit
//!
//! This crate turns records laid out in one engine schema into another:
//! - TransformTable: the closed `(kind, from, to)` table of transforms
//! - ZoneMemory: budgeted target allocator with string deduplication
//! - convert: one-call conversion through the standard table

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
mod shader;
pub mod table;
mod vertexdecl;
mod xmodel;

pub use memory::{ZoneMemory, DEFAULT_MEMORY_LIMIT};
pub use table::{convert, ConvertFn, Transform, TransformTable};
